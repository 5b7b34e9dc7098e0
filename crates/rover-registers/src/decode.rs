use std::fmt;

use serde::Serialize;
use thiserror::Error;
use types::RatedSystemVoltage;

use crate::tables::{CodeTable, UnknownCode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no registers to decode")]
    Empty,
    #[error("{registers} registers overflow a decimal integer")]
    Overflow { registers: usize },
    #[error("register {0:#06X} missing from read block")]
    MissingRegister(u16),
}

/// Whole-amp rated fields vs centiamp live fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentScale {
    WholeAmps,
    Centiamps,
}

/// Threshold register at the 12V baseline (volts x 10), scaled up for the 24V class.
pub fn decode_voltage(raw: u16, rated: RatedSystemVoltage) -> f64 {
    f64::from(u32::from(raw) * rated.voltage_factor()) / 10.0
}

/// Live measurement voltage, volts x 10 regardless of system class.
pub fn decode_decivolts(raw: u16) -> f64 {
    f64::from(raw) / 10.0
}

pub fn decode_current(raw: u16, scale: CurrentScale) -> f64 {
    match scale {
        CurrentScale::WholeAmps => f64::from(raw),
        CurrentScale::Centiamps => f64::from(raw) / 100.0,
    }
}

pub fn decode_scaled(raw: u128, divisor: u32) -> f64 {
    raw as f64 / f64::from(divisor.max(1))
}

/// Sign-magnitude byte: bit 7 is the sign, bits 0-6 the magnitude.
pub fn decode_signed_byte_temperature(byte: u8) -> i16 {
    let magnitude = i16::from(byte & 0x7F);
    if byte & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Splits a register into `(low, high)` bytes.
pub fn decode_packed_byte_fields(register: u16) -> (u8, u8) {
    let [high, low] = register.to_be_bytes();
    (low, high)
}

/// Controller temperature lives in the high byte, battery temperature in the low byte.
pub fn decode_temperatures(register: u16) -> (i16, i16) {
    let (low, high) = decode_packed_byte_fields(register);
    (
        decode_signed_byte_temperature(high),
        decode_signed_byte_temperature(low),
    )
}

/// Joins the decimal renderings of each register, in address order, into one integer.
///
/// `[1234, 5678]` is `12345678`, not `(1234 << 16) | 5678`. Serial numbers and
/// cumulative counters are stored this way.
pub fn decode_multi_register_integer(registers: &[u16]) -> Result<u128, DecodeError> {
    if registers.is_empty() {
        return Err(DecodeError::Empty);
    }

    registers.iter().try_fold(0u128, |acc, register| {
        let shift = 10u128.pow(decimal_digits(*register));
        acc.checked_mul(shift)
            .and_then(|value| value.checked_add(u128::from(*register)))
            .ok_or(DecodeError::Overflow {
                registers: registers.len(),
            })
    })
}

fn decimal_digits(value: u16) -> u32 {
    match value {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1_000..=9_999 => 4,
        _ => 5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Major from the low byte of the first register, minor/patch from the high/low bytes of the second.
pub fn decode_version(first: u16, second: u16) -> Version {
    let (major, _) = decode_packed_byte_fields(first);
    let (patch, minor) = decode_packed_byte_fields(second);
    Version {
        major,
        minor,
        patch,
    }
}

/// Bit `n` of the 32-bit fault word is error code `n`.
pub fn decode_fault_codes(high: u16, low: u16) -> Vec<u8> {
    let word = (u32::from(high) << 16) | u32::from(low);
    (0u8..32).filter(|bit| word & (1u32 << *bit) != 0).collect()
}

pub fn decode_enum(table: &CodeTable, code: u64) -> Result<&'static str, UnknownCode> {
    table.get(code).ok_or(UnknownCode {
        table: table.name,
        code,
    })
}
