use modbus_client::{CommunicationError, RegisterClient};
use thiserror::Error;
use tracing::{debug, warn};
use types::{Millivolts, RatedSystemVoltage};

use crate::map::RegisterAddress;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("register {address:#06X} ({name}) is read-only")]
    ReadOnlyRegister { address: u16, name: &'static str },
    #[error("{value} does not fit a voltage register")]
    OutOfRange { value: Millivolts },
    #[error(transparent)]
    Communication(#[from] CommunicationError),
}

/// Inverse of [`crate::decode::decode_voltage`]: volts x 10, halved for the
/// 24V class, truncated toward zero.
pub fn encode_voltage(volts: Millivolts, rated: RatedSystemVoltage) -> Result<u16, EncodeError> {
    let step = 100 * i64::from(rated.voltage_factor());
    if volts.0 < 0 {
        return Err(EncodeError::OutOfRange { value: volts });
    }
    u16::try_from(volts.0 / step).map_err(|_| EncodeError::OutOfRange { value: volts })
}

/// Encodes `volts` and writes it to a configuration register.
///
/// Status registers are refused before anything goes on the bus. Returns the
/// raw value that was written.
pub fn write_voltage<C>(
    client: &mut C,
    register: RegisterAddress,
    volts: Millivolts,
    rated: RatedSystemVoltage,
) -> Result<u16, EncodeError>
where
    C: RegisterClient + ?Sized,
{
    if !register.is_writable() {
        warn!(address = register.address, name = register.name, "refusing write to read-only register");
        return Err(EncodeError::ReadOnlyRegister {
            address: register.address,
            name: register.name,
        });
    }

    let raw = encode_voltage(volts, rated)?;
    client.write_registers(register.address, &[raw])?;
    debug!(address = register.address, name = register.name, %volts, raw, "voltage register written");
    Ok(raw)
}
