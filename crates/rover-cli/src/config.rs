use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use modbus_client::ClientConfig;
use rover_thresholds::BatteryProfile;

/// Battery description used by the threshold modes.
///
/// Every field is optional so a file may set only part of it and the
/// environment can fill in the rest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatteryConfig {
    pub cells: Option<u8>,
    pub cell_max_voltage: Option<f64>,
    pub cell_min_voltage: Option<f64>,
    pub safety_margin: Option<f64>,
    pub capacity_ah: Option<u32>,
}

impl BatteryConfig {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoverConfig {
    pub serial: ClientConfig,
    pub battery: BatteryConfig,
}

impl RoverConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    pub fn load_with_path(config_path: Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(file_config) = load_file_config(config_path.as_deref())? {
            apply_file_config(&mut config, file_config);
        }

        apply_env_overrides(&mut config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.serial.path.trim().is_empty() {
            anyhow::bail!("serial.path must be non-empty");
        }
        if self.serial.baud_rate == 0 {
            anyhow::bail!("serial.baud_rate must be >= 1");
        }
        if self.serial.slave_id == 0 || self.serial.slave_id > 247 {
            anyhow::bail!("serial.slave_id must be between 1 and 247");
        }
        if self.serial.timeout_ms == 0 {
            anyhow::bail!("serial.timeout_ms must be >= 1");
        }
        if let Some(max_batch) = self.serial.max_batch_size {
            if max_batch == 0 || max_batch > 125 {
                anyhow::bail!("serial.max_batch_size must be between 1 and 125");
            }
        }
        if let Some(delay) = self.serial.inter_read_delay_ms {
            if delay == 0 {
                anyhow::bail!("serial.inter_read_delay_ms must be >= 1 when set");
            }
        }
        if let Some(capacity) = self.battery.capacity_ah {
            if capacity == 0 {
                anyhow::bail!("battery.capacity_ah must be >= 1 when set");
            }
        }
        if !self.battery.is_empty() {
            self.battery_profile()?;
        }

        Ok(())
    }

    /// Builds the profile for the threshold modes; fails if the battery
    /// section is missing any of the four required values.
    pub fn battery_profile(&self) -> Result<BatteryProfile> {
        let battery = &self.battery;
        let cells = battery
            .cells
            .ok_or_else(|| anyhow::anyhow!("battery.cells is required"))?;
        let cell_max = battery
            .cell_max_voltage
            .ok_or_else(|| anyhow::anyhow!("battery.cell_max_voltage is required"))?;
        let cell_min = battery
            .cell_min_voltage
            .ok_or_else(|| anyhow::anyhow!("battery.cell_min_voltage is required"))?;
        let margin = battery
            .safety_margin
            .ok_or_else(|| anyhow::anyhow!("battery.safety_margin is required"))?;

        BatteryProfile::new(cells, cell_max, cell_min, margin).context("invalid battery section")
    }
}

fn apply_env_overrides(config: &mut RoverConfig) {
    if let Ok(value) = env::var("ROVER_SERIAL_PATH") {
        config.serial.path = value;
    }
    if let Some(baud) = parse_env("ROVER_BAUD_RATE") {
        config.serial.baud_rate = baud;
    }
    if let Some(slave_id) = parse_env("ROVER_SLAVE_ID") {
        config.serial.slave_id = slave_id;
    }
    if let Some(timeout_ms) = parse_env("ROVER_TIMEOUT_MS") {
        config.serial.timeout_ms = timeout_ms;
    }
    if let Some(max_batch) = parse_env("ROVER_MAX_BATCH_SIZE") {
        config.serial.max_batch_size = Some(max_batch);
    }
    if let Some(delay) = parse_env("ROVER_INTER_READ_DELAY_MS") {
        config.serial.inter_read_delay_ms = Some(delay);
    }

    let battery = &mut config.battery;
    battery.cells = parse_env("ROVER_BATTERY_CELLS").or(battery.cells);
    battery.cell_max_voltage = parse_env("ROVER_CELL_MAX_VOLTAGE").or(battery.cell_max_voltage);
    battery.cell_min_voltage = parse_env("ROVER_CELL_MIN_VOLTAGE").or(battery.cell_min_voltage);
    battery.safety_margin = parse_env("ROVER_SAFETY_MARGIN").or(battery.safety_margin);
    battery.capacity_ah = parse_env("ROVER_CAPACITY_AH").or(battery.capacity_ah);
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    serial: Option<FileSerialConfig>,
    battery: Option<FileBatteryConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSerialConfig {
    path: Option<String>,
    baud_rate: Option<u32>,
    slave_id: Option<u8>,
    timeout_ms: Option<u64>,
    max_batch_size: Option<u16>,
    inter_read_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileBatteryConfig {
    cells: Option<u8>,
    cell_max_voltage: Option<f64>,
    cell_min_voltage: Option<f64>,
    safety_margin: Option<f64>,
    capacity_ah: Option<u32>,
}

fn load_file_config(config_path: Option<&str>) -> Result<Option<FileConfig>> {
    let path = match config_path {
        Some(path) => path.to_string(),
        None => match env::var("ROVER_CONFIG") {
            Ok(value) => value,
            Err(_) => return Ok(None),
        },
    };

    let content = fs::read_to_string(&path).with_context(|| format!("read config file {path}"))?;
    let ext = Path::new(&path).extension().and_then(|value| value.to_str());

    let config = match ext {
        Some("json") => serde_json::from_str(&content).context("parse json config")?,
        _ => toml::from_str(&content).context("parse toml config")?,
    };

    Ok(Some(config))
}

fn apply_file_config(config: &mut RoverConfig, file: FileConfig) {
    if let Some(serial) = file.serial {
        if let Some(path) = serial.path {
            config.serial.path = path;
        }
        if let Some(baud) = serial.baud_rate {
            config.serial.baud_rate = baud;
        }
        if let Some(slave_id) = serial.slave_id {
            config.serial.slave_id = slave_id;
        }
        if let Some(timeout_ms) = serial.timeout_ms {
            config.serial.timeout_ms = timeout_ms;
        }
        if let Some(max_batch) = serial.max_batch_size {
            config.serial.max_batch_size = Some(max_batch);
        }
        if let Some(delay) = serial.inter_read_delay_ms {
            config.serial.inter_read_delay_ms = Some(delay);
        }
    }

    if let Some(battery) = file.battery {
        config.battery = BatteryConfig {
            cells: battery.cells,
            cell_max_voltage: battery.cell_max_voltage,
            cell_min_voltage: battery.cell_min_voltage,
            safety_margin: battery.safety_margin,
            capacity_ah: battery.capacity_ah,
        };
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}
