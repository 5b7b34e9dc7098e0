//! Battery protection thresholds for the controller's configuration block.
//!
//! All arithmetic runs on integer millivolts: the firmware expects the exact
//! quantized values produced by truncating at hundredths and tenths of a volt.

use modbus_client::RegisterClient;
use rover_registers::map::{self, RegisterAddress};
use rover_registers::{write_voltage, EncodeError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use types::{Millivolts, RatedSystemVoltage};

pub const MIN_CELLS: u8 = 1;
pub const MAX_CELLS: u8 = 24;
/// Highest per-cell voltage accepted; keeps pack arithmetic within `i64`.
pub const MAX_CELL_VOLTAGE: Millivolts = Millivolts(10_000);

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("cell count {0} outside {min}..={max}", min = MIN_CELLS, max = MAX_CELLS)]
    CellCount(u8),
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("cell voltages must be positive with min ({min}) below max ({max})")]
    CellRange { min: Millivolts, max: Millivolts },
    #[error("safety margin must not be negative, got {0}")]
    NegativeMargin(Millivolts),
    #[error("cell voltage {0} above the {max} limit", max = MAX_CELL_VOLTAGE)]
    CellVoltageTooHigh(Millivolts),
    #[error("safety margin {margin} must be below cell min ({min})")]
    MarginTooLarge { margin: Millivolts, min: Millivolts },
}

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("{lower} ({lower_value}) must be below {upper} ({upper_value})")]
    Ordering {
        lower: &'static str,
        lower_value: Millivolts,
        upper: &'static str,
        upper_value: Millivolts,
    },
    #[error("refusing to write thresholds for unsupported system voltage {0}")]
    UnsupportedSystemVoltage(RatedSystemVoltage),
    #[error(transparent)]
    PartialWrite(#[from] PartialWriteError),
}

#[derive(Debug)]
pub struct WriteFailure {
    pub register: RegisterAddress,
    pub error: EncodeError,
}

/// One or more threshold registers could not be written; the rest were.
#[derive(Debug, Error)]
#[error("{} of {} threshold writes failed at {}", .failures.len(), THRESHOLD_COUNT, format_addresses(.failures))]
pub struct PartialWriteError {
    pub failures: Vec<WriteFailure>,
}

impl PartialWriteError {
    pub fn failed_addresses(&self) -> Vec<u16> {
        self.failures
            .iter()
            .map(|failure| failure.register.address)
            .collect()
    }
}

fn format_addresses(failures: &[WriteFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{:#06X}", failure.register.address))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pack description the thresholds are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatteryProfile {
    cells: u8,
    cell_max: Millivolts,
    cell_min: Millivolts,
    safety_margin: Millivolts,
}

impl BatteryProfile {
    /// `safety_margin` is in volts per cell.
    pub fn new(
        cells: u8,
        cell_max_voltage: f64,
        cell_min_voltage: f64,
        safety_margin: f64,
    ) -> Result<Self, ProfileError> {
        if !(MIN_CELLS..=MAX_CELLS).contains(&cells) {
            return Err(ProfileError::CellCount(cells));
        }
        let cell_max =
            Millivolts::from_volts(cell_max_voltage).ok_or(ProfileError::NotFinite("cell max voltage"))?;
        let cell_min =
            Millivolts::from_volts(cell_min_voltage).ok_or(ProfileError::NotFinite("cell min voltage"))?;
        let safety_margin =
            Millivolts::from_volts(safety_margin).ok_or(ProfileError::NotFinite("safety margin"))?;

        if cell_max > MAX_CELL_VOLTAGE {
            return Err(ProfileError::CellVoltageTooHigh(cell_max));
        }
        if cell_min.0 <= 0 || cell_min >= cell_max {
            return Err(ProfileError::CellRange {
                min: cell_min,
                max: cell_max,
            });
        }
        if safety_margin.0 < 0 {
            return Err(ProfileError::NegativeMargin(safety_margin));
        }
        if safety_margin >= cell_min {
            return Err(ProfileError::MarginTooLarge {
                margin: safety_margin,
                min: cell_min,
            });
        }

        Ok(Self {
            cells,
            cell_max,
            cell_min,
            safety_margin,
        })
    }

    pub fn cells(&self) -> u8 {
        self.cells
    }

    pub fn cell_max(&self) -> Millivolts {
        self.cell_max
    }

    pub fn cell_min(&self) -> Millivolts {
        self.cell_min
    }

    pub fn safety_margin(&self) -> Millivolts {
        self.safety_margin
    }

    pub fn thresholds(&self) -> Result<ThresholdSet, ThresholdError> {
        ThresholdSet::from_profile(self)
    }
}

pub const THRESHOLD_COUNT: usize = 10;

/// The ten protection voltages, recomputed wholesale from a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdSet {
    pub over_voltage_limit: Millivolts,
    pub charge_limit: Millivolts,
    pub equalization: Millivolts,
    pub float_recovery: Millivolts,
    pub boost: Millivolts,
    pub boost_recovery: Millivolts,
    pub discharge_recovery: Millivolts,
    pub under_voltage_warning: Millivolts,
    pub over_discharge: Millivolts,
    pub discharge_limit: Millivolts,
}

impl ThresholdSet {
    pub fn from_profile(profile: &BatteryProfile) -> Result<Self, ThresholdError> {
        let set = Self::compute(profile);
        set.check_ordering()?;
        debug!(
            cells = profile.cells,
            over_voltage_limit = %set.over_voltage_limit,
            discharge_limit = %set.discharge_limit,
            "thresholds derived"
        );
        Ok(set)
    }

    /// Applies the formulas without checking the result.
    pub fn compute(profile: &BatteryProfile) -> Self {
        let cells = i64::from(profile.cells);
        let margin = profile.safety_margin.0;
        let pack_max = profile.cell_max.0 * cells;
        let pack_floor = (profile.cell_min.0 + margin) * cells;

        let over_voltage_limit = Millivolts(pack_max - 2 * margin).truncate_to(10);
        let charge_limit = over_voltage_limit - Millivolts(200);
        let equalization = Millivolts(pack_max - cells * margin).truncate_to(10);
        let float_recovery = equalization - Millivolts(500);
        let boost = charge_limit;
        let boost_recovery = Millivolts(charge_limit.0 - 3 * cells * margin - 200).truncate_to(100);
        let discharge_recovery = Millivolts(pack_floor).truncate_to(100) + Millivolts(5_000);
        let under_voltage_warning = Millivolts((profile.cell_min.0 + 4 * margin) * cells).round_to(100);
        let over_discharge = Millivolts(pack_floor + 1_000);
        let discharge_limit = Millivolts(pack_floor);

        Self {
            over_voltage_limit,
            charge_limit,
            equalization,
            float_recovery,
            boost,
            boost_recovery,
            discharge_recovery,
            under_voltage_warning,
            over_discharge,
            discharge_limit,
        }
    }

    /// Register and value pairs in the order they are written to the device.
    pub fn entries(&self) -> [(RegisterAddress, Millivolts); THRESHOLD_COUNT] {
        [
            (map::OVER_VOLTAGE_LIMIT, self.over_voltage_limit),
            (map::CHARGE_LIMIT, self.charge_limit),
            (map::EQUALIZATION, self.equalization),
            (map::FLOAT_RECOVERY, self.float_recovery),
            (map::BOOST, self.boost),
            (map::BOOST_RECOVERY, self.boost_recovery),
            (map::DISCHARGE_RECOVERY, self.discharge_recovery),
            (map::UNDER_VOLTAGE_WARNING, self.under_voltage_warning),
            (map::OVER_DISCHARGE, self.over_discharge),
            (map::DISCHARGE_LIMIT, self.discharge_limit),
        ]
    }

    pub fn check_ordering(&self) -> Result<(), ThresholdError> {
        let strict = [
            (map::DISCHARGE_LIMIT, self.discharge_limit, map::OVER_DISCHARGE, self.over_discharge),
            (map::OVER_DISCHARGE, self.over_discharge, map::DISCHARGE_RECOVERY, self.discharge_recovery),
            (map::OVER_DISCHARGE, self.over_discharge, map::UNDER_VOLTAGE_WARNING, self.under_voltage_warning),
            (map::DISCHARGE_RECOVERY, self.discharge_recovery, map::BOOST_RECOVERY, self.boost_recovery),
            (map::UNDER_VOLTAGE_WARNING, self.under_voltage_warning, map::BOOST_RECOVERY, self.boost_recovery),
            (map::BOOST_RECOVERY, self.boost_recovery, map::BOOST, self.boost),
            (map::CHARGE_LIMIT, self.charge_limit, map::OVER_VOLTAGE_LIMIT, self.over_voltage_limit),
        ];
        for (lower, lower_value, upper, upper_value) in strict {
            if lower_value >= upper_value {
                return Err(ordering_error(lower, lower_value, upper, upper_value));
            }
        }
        if self.boost > self.charge_limit {
            return Err(ordering_error(map::BOOST, self.boost, map::CHARGE_LIMIT, self.charge_limit));
        }

        let charge_side = [
            (map::OVER_VOLTAGE_LIMIT, self.over_voltage_limit),
            (map::CHARGE_LIMIT, self.charge_limit),
            (map::EQUALIZATION, self.equalization),
            (map::FLOAT_RECOVERY, self.float_recovery),
            (map::BOOST, self.boost),
            (map::BOOST_RECOVERY, self.boost_recovery),
        ];
        let discharge_side = [
            (map::DISCHARGE_RECOVERY, self.discharge_recovery),
            (map::UNDER_VOLTAGE_WARNING, self.under_voltage_warning),
            (map::OVER_DISCHARGE, self.over_discharge),
            (map::DISCHARGE_LIMIT, self.discharge_limit),
        ];
        for (upper, upper_value) in charge_side {
            for (lower, lower_value) in discharge_side {
                if lower_value >= upper_value {
                    return Err(ordering_error(lower, lower_value, upper, upper_value));
                }
            }
        }

        Ok(())
    }
}

fn ordering_error(
    lower: RegisterAddress,
    lower_value: Millivolts,
    upper: RegisterAddress,
    upper_value: Millivolts,
) -> ThresholdError {
    ThresholdError::Ordering {
        lower: lower.name,
        lower_value,
        upper: upper.name,
        upper_value,
    }
}

/// Writes all ten thresholds, one request per register.
///
/// A failed write is logged and the remaining registers are still attempted;
/// the failures are returned together afterwards.
pub fn apply_thresholds<C>(
    thresholds: &ThresholdSet,
    rated: RatedSystemVoltage,
    client: &mut C,
) -> Result<(), ThresholdError>
where
    C: RegisterClient + ?Sized,
{
    if !rated.is_known() {
        return Err(ThresholdError::UnsupportedSystemVoltage(rated));
    }

    let mut failures = Vec::new();
    for (register, volts) in thresholds.entries() {
        match write_voltage(client, register, volts, rated) {
            Ok(raw) => {
                info!(address = register.address, name = register.name, %volts, raw, "threshold written");
            }
            Err(error) => {
                warn!(address = register.address, name = register.name, %volts, error = %error, "threshold write failed");
                failures.push(WriteFailure { register, error });
            }
        }
    }

    info!(
        attempted = THRESHOLD_COUNT,
        failed = failures.len(),
        rated_voltage = %rated,
        "threshold update complete"
    );

    if failures.is_empty() {
        Ok(())
    } else {
        Err(PartialWriteError { failures }.into())
    }
}
