use std::fmt;

use serde::{Deserialize, Serialize};

/// Engineering unit attached to a decoded register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Volt,
    Amp,
    Milliamp,
    Watt,
    WattHour,
    KilowattHour,
    AmpHour,
    Percent,
    Celsius,
    Second,
    Minute,
    Hour,
    Day,
    /// Occurrence counters (over-discharges, full charges).
    Times,
    /// Plain numbers: addresses, factors, enumerated codes.
    None,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Volt => "V",
            Unit::Amp => "A",
            Unit::Milliamp => "mA",
            Unit::Watt => "W",
            Unit::WattHour => "Wh",
            Unit::KilowattHour => "kWh",
            Unit::AmpHour => "Ah",
            Unit::Percent => "%",
            Unit::Celsius => "°C",
            Unit::Second => "s",
            Unit::Minute => "min",
            Unit::Hour => "h",
            Unit::Day => "d",
            Unit::Times => "x",
            Unit::None => "",
        }
    }
}

/// One decoded attribute of the controller, created per poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub name: String,
    pub value: f64,
    pub unit: Unit,
    /// Human-readable label when the value is an enumerated code.
    pub label: Option<String>,
}

impl DeviceReading {
    pub fn new(name: impl Into<String>, value: f64, unit: Unit) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
            label: None,
        }
    }

    pub fn labelled(name: impl Into<String>, code: f64, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: code,
            unit: Unit::None,
            label: Some(label.into()),
        }
    }
}

impl fmt::Display for DeviceReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => f.write_str(label),
            None => write!(f, "{}{}", self.value, self.unit.symbol()),
        }
    }
}

/// Nominal bus voltage class reported by the controller at register 0x000A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatedSystemVoltage {
    V12,
    V24,
    V36,
    V48,
    /// Any code the firmware reports outside the four known classes.
    Other(u8),
}

impl RatedSystemVoltage {
    pub fn from_code(code: u8) -> Self {
        match code {
            12 => Self::V12,
            24 => Self::V24,
            36 => Self::V36,
            48 => Self::V48,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::V12 => 12,
            Self::V24 => 24,
            Self::V36 => 36,
            Self::V48 => 48,
            Self::Other(code) => *code,
        }
    }

    /// Multiplier between the 12V-baseline register value and real volts.
    /// Only the 24V class stores thresholds at half scale.
    pub fn voltage_factor(&self) -> u32 {
        match self {
            Self::V24 => 2,
            _ => 1,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for RatedSystemVoltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}V", self.code())
    }
}

/// Fixed-point voltage used wherever truncation has to be exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Millivolts(pub i64);

impl Millivolts {
    /// Rounds to the nearest millivolt. Returns `None` for non-finite or out of range input.
    pub fn from_volts(volts: f64) -> Option<Self> {
        let scaled = (volts * 1000.0).round();
        if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        Some(Self(scaled as i64))
    }

    pub fn as_volts(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Truncates toward zero to a multiple of `step` millivolts.
    pub fn truncate_to(&self, step: i64) -> Self {
        Self(self.0 / step * step)
    }

    /// Rounds half away from zero to a multiple of `step` millivolts.
    pub fn round_to(&self, step: i64) -> Self {
        let half = step / 2;
        let biased = if self.0 >= 0 { self.0 + half } else { self.0 - half };
        Self(biased / step * step)
    }
}

impl std::ops::Add for Millivolts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Millivolts {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Millivolts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / 1000;
        let frac = abs % 1000;
        if frac % 10 == 0 {
            write!(f, "{sign}{whole}.{:02}V", frac / 10)
        } else {
            write!(f, "{sign}{whole}.{frac:03}V")
        }
    }
}
