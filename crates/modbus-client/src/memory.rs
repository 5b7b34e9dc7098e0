use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::{CommunicationError, RegisterClient};

/// In-memory register map that answers like a device on the bus.
///
/// Unmapped addresses and addresses marked with [`MemoryClient::fail_on`]
/// are rejected, the way a controller answers an illegal-address request.
#[derive(Debug, Default, Clone)]
pub struct MemoryClient {
    registers: BTreeMap<u16, u16>,
    failing: BTreeSet<u16>,
    writes: Vec<(u16, Vec<u16>)>,
    requests: usize,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, address: u16, value: u16) -> &mut Self {
        self.registers.insert(address, value);
        self
    }

    pub fn set_range(&mut self, start: u16, values: &[u16]) -> &mut Self {
        for (offset, value) in values.iter().enumerate() {
            let address = u32::from(start) + offset as u32;
            if let Ok(address) = u16::try_from(address) {
                self.registers.insert(address, *value);
            }
        }
        self
    }

    /// Fills `start..start + count` with zeros, leaving already mapped registers alone.
    pub fn map_zeroed(&mut self, start: u16, count: u16) -> &mut Self {
        for address in start..start.saturating_add(count) {
            self.registers.entry(address).or_insert(0);
        }
        self
    }

    /// Every request touching `address` fails from now on.
    pub fn fail_on(&mut self, address: u16) -> &mut Self {
        self.failing.insert(address);
        self
    }

    pub fn get(&self, address: u16) -> Option<u16> {
        self.registers.get(&address).copied()
    }

    /// Successful writes in the order they were committed.
    pub fn writes(&self) -> &[(u16, Vec<u16>)] {
        &self.writes
    }

    /// Number of requests seen, successful or not.
    pub fn request_count(&self) -> usize {
        self.requests
    }

    fn check_range(&self, address: u16, count: usize) -> Result<(), CommunicationError> {
        for offset in 0..count {
            let current = u16::try_from(u32::from(address) + offset as u32)
                .map_err(|_| CommunicationError::AddressOverflow)?;
            if self.failing.contains(&current) {
                return Err(CommunicationError::Rejected { address: current });
            }
        }
        Ok(())
    }
}

impl RegisterClient for MemoryClient {
    fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>, CommunicationError> {
        self.requests += 1;
        self.check_range(address, usize::from(count))?;

        let mut out = Vec::with_capacity(usize::from(count));
        for offset in 0..count {
            let current = address
                .checked_add(offset)
                .ok_or(CommunicationError::AddressOverflow)?;
            let value = self
                .registers
                .get(&current)
                .copied()
                .ok_or(CommunicationError::Rejected { address: current })?;
            out.push(value);
        }
        debug!(address, count, "memory read ok");
        Ok(out)
    }

    fn write_register(&mut self, address: u16, value: u16) -> Result<(), CommunicationError> {
        self.write_registers(address, &[value])
    }

    fn write_registers(&mut self, address: u16, values: &[u16]) -> Result<(), CommunicationError> {
        self.requests += 1;
        self.check_range(address, values.len())?;

        for (offset, value) in values.iter().enumerate() {
            let current = u16::try_from(u32::from(address) + offset as u32)
                .map_err(|_| CommunicationError::AddressOverflow)?;
            self.registers.insert(current, *value);
        }
        self.writes.push((address, values.to_vec()));
        debug!(address, count = values.len(), "memory write ok");
        Ok(())
    }
}
