use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Serialize;

use rover_registers::{DeviceSession, StatusReport, StatusSection};
use rover_thresholds::{BatteryProfile, ThresholdSet};
use types::RatedSystemVoltage;

/// Column where values start; labels are padded out to it with dots.
pub const VALUE_COLUMN: usize = 34;

/// `" Label......value"`; top-level labels pass `indent = false`.
pub fn leader_line(label: &str, value: impl std::fmt::Display, indent: bool) -> String {
    let prefix = if indent { " " } else { "" };
    let used = prefix.len() + label.chars().count();
    let dots = VALUE_COLUMN.saturating_sub(used).max(1);
    format!("{prefix}{label}{}{value}", ".".repeat(dots))
}

pub fn render_status(session: &DeviceSession, report: &StatusReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", leader_line("Model", &session.model, false));
    let identity = [
        ("Type", session.model_type_label().to_string()),
        ("Serial number", session.serial_number.to_string()),
        ("Software version", session.software_version.to_string()),
        ("Hardware version", session.hardware_version.to_string()),
        ("Rated voltage", session.rated_voltage.to_string()),
        ("Rated max. charge", format!("{}A", session.rated_charge_current)),
        ("Rated max. discharge", format!("{}A", session.rated_discharge_current)),
    ];
    for (label, value) in identity {
        let _ = writeln!(out, "{}", leader_line(label, value, true));
    }

    for section in &report.sections {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}:", section.title);
        for reading in &section.readings {
            let _ = writeln!(out, "{}", leader_line(&reading.name, reading, true));
        }
    }
    out
}

pub fn render_status_json(session: &DeviceSession, report: &StatusReport) -> Result<String> {
    #[derive(Serialize)]
    struct StatusOutput<'a> {
        device: &'a DeviceSession,
        sections: &'a [StatusSection],
    }

    serde_json::to_string_pretty(&StatusOutput {
        device: session,
        sections: &report.sections,
    })
    .context("serialize status report")
}

#[derive(Debug, Serialize)]
struct ThresholdRow {
    address: u16,
    name: &'static str,
    volts: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<u16>,
}

fn threshold_rows(thresholds: &ThresholdSet, rated: Option<RatedSystemVoltage>) -> Vec<ThresholdRow> {
    thresholds
        .entries()
        .iter()
        .map(|(register, volts)| ThresholdRow {
            address: register.address,
            name: register.name,
            volts: volts.as_volts(),
            raw: rated.and_then(|rated| rover_registers::encode_voltage(*volts, rated).ok()),
        })
        .collect()
}

/// Lists the profile and the derived thresholds. Raw register values are
/// shown when the controller's voltage class is known.
pub fn render_thresholds(
    profile: &BatteryProfile,
    capacity_ah: Option<u32>,
    thresholds: &ThresholdSet,
    rated: Option<RatedSystemVoltage>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Battery:");
    let _ = writeln!(out, "{}", leader_line("Cells", profile.cells(), true));
    let _ = writeln!(out, "{}", leader_line("Cell max", profile.cell_max(), true));
    let _ = writeln!(out, "{}", leader_line("Cell min", profile.cell_min(), true));
    let _ = writeln!(out, "{}", leader_line("Safety margin", profile.safety_margin(), true));
    if let Some(capacity) = capacity_ah {
        let _ = writeln!(out, "{}", leader_line("Capacity", format!("{capacity}Ah"), true));
    }

    let _ = writeln!(out);
    match rated {
        Some(rated) => {
            let _ = writeln!(out, "Thresholds ({rated} system):");
        }
        None => {
            let _ = writeln!(out, "Thresholds:");
        }
    }
    for ((_, volts), row) in thresholds.entries().iter().zip(threshold_rows(thresholds, rated)) {
        let label = format!("{} {:#06X}", row.name, row.address);
        let value = match row.raw {
            Some(raw) => format!("{volts} (raw {raw})"),
            None => volts.to_string(),
        };
        let _ = writeln!(out, "{}", leader_line(&label, value, true));
    }
    out
}

pub fn render_thresholds_json(
    profile: &BatteryProfile,
    capacity_ah: Option<u32>,
    thresholds: &ThresholdSet,
    rated: Option<RatedSystemVoltage>,
) -> Result<String> {
    #[derive(Serialize)]
    struct ThresholdOutput<'a> {
        cells: u8,
        cell_max_voltage: f64,
        cell_min_voltage: f64,
        safety_margin: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        capacity_ah: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        rated_voltage: Option<&'a RatedSystemVoltage>,
        thresholds: Vec<ThresholdRow>,
    }

    serde_json::to_string_pretty(&ThresholdOutput {
        cells: profile.cells(),
        cell_max_voltage: profile.cell_max().as_volts(),
        cell_min_voltage: profile.cell_min().as_volts(),
        safety_margin: profile.safety_margin().as_volts(),
        capacity_ah,
        rated_voltage: rated.as_ref(),
        thresholds: threshold_rows(thresholds, rated),
    })
    .context("serialize thresholds")
}
