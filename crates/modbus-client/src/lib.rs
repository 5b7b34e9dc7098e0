use std::cmp::min;
use std::fmt;
use std::io;
use std::thread::sleep;
use std::time::Duration;

use thiserror::Error;
use tokio_modbus::client::sync::{self, Context};
use tokio_modbus::prelude::{Slave, SyncReader, SyncWriter};
use tracing::{debug, warn};

mod memory;

pub use memory::MemoryClient;

/// Configuration options for opening and talking to a Modbus RTU device on a serial line.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Serial device path, e.g. `/dev/ttyUSB0`.
    pub path: String,
    pub baud_rate: u32,
    pub slave_id: u8,
    /// Maximum number of registers to read in a single request; devices with quirks may require lower batch sizes.
    pub max_batch_size: Option<u16>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Optional delay between split reads to placate slower devices.
    pub inter_read_delay_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            path: "/dev/ttyAMA0".to_string(),
            baud_rate: 9_600,
            slave_id: 1,
            max_batch_size: None,
            timeout_ms: 1_000,
            inter_read_delay_ms: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CommunicationError {
    #[error("failed to open serial port {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("modbus transport error: {0}")]
    Modbus(io::Error),
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("device rejected request at register {address:#06X}")]
    Rejected { address: u16 },
    #[error("short response at register {address:#06X}: expected {expected} registers, got {received}")]
    ShortResponse {
        address: u16,
        expected: u16,
        received: usize,
    },
    #[error("register address overflow")]
    AddressOverflow,
}

/// Register-level access to a field-bus device.
///
/// Every call is one blocking request/response exchange; failures are
/// reported as-is and never retried here.
pub trait RegisterClient {
    fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>, CommunicationError>;

    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CommunicationError>;

    fn write_registers(&mut self, address: u16, values: &[u16]) -> Result<(), CommunicationError>;

    fn read_register(&mut self, address: u16) -> Result<u16, CommunicationError> {
        let values = self.read_registers(address, 1)?;
        values
            .first()
            .copied()
            .ok_or(CommunicationError::ShortResponse {
                address,
                expected: 1,
                received: 0,
            })
    }

    /// Reads `register_count` registers as ASCII text, two characters per register.
    fn read_string(&mut self, address: u16, register_count: u16) -> Result<String, CommunicationError> {
        let values = self.read_registers(address, register_count)?;
        Ok(registers_to_string(&values))
    }
}

/// Big-endian byte pairs to text, with NUL padding dropped and whitespace trimmed.
pub fn registers_to_string(registers: &[u16]) -> String {
    let bytes: Vec<u8> = registers
        .iter()
        .flat_map(|register| register.to_be_bytes())
        .filter(|byte| *byte != 0)
        .collect();
    String::from_utf8_lossy(&bytes).trim().to_string()
}

/// Modbus RTU client owning the serial port for its whole lifetime.
pub struct ModbusClient {
    config: ClientConfig,
    context: Context,
}

impl fmt::Debug for ModbusClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModbusClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ModbusClient {
    pub fn connect(config: ClientConfig) -> Result<Self, CommunicationError> {
        let builder = tokio_serial::new(config.path.as_str(), config.baud_rate);
        let timeout = Some(Duration::from_millis(config.timeout_ms));
        let context = sync::rtu::connect_slave_with_timeout(&builder, Slave(config.slave_id), timeout)
            .map_err(|source| CommunicationError::Open {
                path: config.path.clone(),
                source,
            })?;
        debug!(
            path = %config.path,
            baud_rate = config.baud_rate,
            slave_id = config.slave_id,
            "serial port opened"
        );
        Ok(Self { config, context })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn read_chunk(&mut self, start: u16, count: u16) -> Result<Vec<u16>, CommunicationError> {
        match self.context.read_holding_registers(start, count) {
            Ok(values) if values.len() == usize::from(count) => {
                debug!(start, count, "modbus read ok");
                Ok(values)
            }
            Ok(values) => {
                warn!(start, count, received = values.len(), "modbus read short");
                Err(CommunicationError::ShortResponse {
                    address: start,
                    expected: count,
                    received: values.len(),
                })
            }
            Err(err) => {
                warn!(start, count, error = %err, "modbus read error");
                Err(self.map_io_error(err))
            }
        }
    }

    fn map_io_error(&self, err: io::Error) -> CommunicationError {
        if err.kind() == io::ErrorKind::TimedOut {
            CommunicationError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            CommunicationError::Modbus(err)
        }
    }
}

impl RegisterClient for ModbusClient {
    fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>, CommunicationError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let batch_size = self.config.max_batch_size.unwrap_or(count).max(1u16);
        let mut remaining = count;
        let mut offset = 0u16;
        let mut out = Vec::with_capacity(usize::from(count));

        while remaining > 0 {
            let chunk = min(remaining, batch_size);
            let chunk_start = u16::try_from(u32::from(address) + u32::from(offset))
                .map_err(|_| CommunicationError::AddressOverflow)?;
            let values = self.read_chunk(chunk_start, chunk)?;
            out.extend(values);
            remaining -= chunk;
            offset += chunk;

            if remaining > 0 {
                if let Some(delay_ms) = self.config.inter_read_delay_ms {
                    sleep(Duration::from_millis(delay_ms));
                }
            }
        }

        Ok(out)
    }

    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CommunicationError> {
        match self.context.write_single_register(address, value) {
            Ok(()) => {
                debug!(address, value, "modbus write ok");
                Ok(())
            }
            Err(err) => {
                warn!(address, value, error = %err, "modbus write error");
                Err(self.map_io_error(err))
            }
        }
    }

    fn write_registers(&mut self, address: u16, values: &[u16]) -> Result<(), CommunicationError> {
        match self.context.write_multiple_registers(address, values) {
            Ok(()) => {
                debug!(address, count = values.len(), "modbus write ok");
                Ok(())
            }
            Err(err) => {
                warn!(address, count = values.len(), error = %err, "modbus write error");
                Err(self.map_io_error(err))
            }
        }
    }
}
