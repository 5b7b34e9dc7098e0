//! Register-level model of the Rover family of solar charge controllers.
//!
//! Raw 16-bit holding registers go in, typed readings come out; threshold
//! voltages go back the other way through [`encode`].

use thiserror::Error;

pub mod decode;
pub mod encode;
pub mod map;
pub mod session;
pub mod status;
pub mod tables;

pub use decode::{DecodeError, Version};
pub use encode::{encode_voltage, write_voltage, EncodeError};
pub use map::{Access, RegisterAddress, RegisterBlock};
pub use session::DeviceSession;
pub use status::{read_status, StatusReport, StatusSection};
pub use tables::{lookup, CodeTable, UnknownCode};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error(transparent)]
    Communication(#[from] modbus_client::CommunicationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
