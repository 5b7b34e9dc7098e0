use anyhow::{Context, Result};
use tracing::info;

use modbus_client::RegisterClient;
use rover_registers::{read_status, DeviceSession};
use rover_thresholds::apply_thresholds;

use crate::config::RoverConfig;
use crate::report;

pub fn run_status<C>(client: &mut C, json: bool) -> Result<String>
where
    C: RegisterClient + ?Sized,
{
    let session = DeviceSession::connect(client).context("read device identity")?;
    let status = read_status(client, &session).context("read device status")?;

    if json {
        report::render_status_json(&session, &status)
    } else {
        Ok(report::render_status(&session, &status))
    }
}

/// Derives thresholds from the configured battery without touching the bus.
pub fn run_thresholds(config: &RoverConfig, json: bool) -> Result<String> {
    let profile = config.battery_profile()?;
    let thresholds = profile.thresholds().context("derive thresholds")?;

    if json {
        report::render_thresholds_json(&profile, config.battery.capacity_ah, &thresholds, None)
    } else {
        Ok(report::render_thresholds(
            &profile,
            config.battery.capacity_ah,
            &thresholds,
            None,
        ))
    }
}

/// Derives thresholds, then writes them to the controller. Nothing is
/// written if the thresholds are rejected.
pub fn run_apply_thresholds<C>(client: &mut C, config: &RoverConfig, json: bool) -> Result<String>
where
    C: RegisterClient + ?Sized,
{
    let profile = config.battery_profile()?;
    let thresholds = profile.thresholds().context("derive thresholds")?;
    let session = DeviceSession::connect(client).context("read device identity")?;

    apply_thresholds(&thresholds, session.rated_voltage, client).context("write thresholds")?;
    info!(model = %session.model, "thresholds applied");

    let rated = Some(session.rated_voltage);
    if json {
        report::render_thresholds_json(&profile, config.battery.capacity_ah, &thresholds, rated)
    } else {
        Ok(report::render_thresholds(
            &profile,
            config.battery.capacity_ah,
            &thresholds,
            rated,
        ))
    }
}
