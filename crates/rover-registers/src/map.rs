use std::ops::RangeInclusive;

use modbus_client::{CommunicationError, RegisterClient};

use crate::decode::DecodeError;

/// Identity and live measurements. Never written.
pub const STATUS_BLOCK: RangeInclusive<u16> = 0x0000..=0x0122;
/// Thresholds, load/LED and sensing parameters.
pub const CONFIG_BLOCK: RangeInclusive<u16> = 0xE000..=0xE02D;
pub const DAILY_COUNTERS: RangeInclusive<u16> = 0xF000..=0xF001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// A fixed register address tagged with what it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterAddress {
    pub address: u16,
    pub name: &'static str,
}

impl RegisterAddress {
    pub const fn new(address: u16, name: &'static str) -> Self {
        Self { address, name }
    }

    pub fn access(&self) -> Access {
        if CONFIG_BLOCK.contains(&self.address) {
            Access::ReadWrite
        } else {
            Access::ReadOnly
        }
    }

    pub fn is_writable(&self) -> bool {
        self.access() == Access::ReadWrite
    }
}

// Identity, read once per session.
pub const RATED_VOLTAGE_CURRENT: RegisterAddress = RegisterAddress::new(0x000A, "rated voltage / charge current");
pub const RATED_DISCHARGE_MODEL: RegisterAddress = RegisterAddress::new(0x000B, "rated discharge current / model type");
pub const PRODUCT_MODEL: RegisterAddress = RegisterAddress::new(0x000C, "product model");
pub const PRODUCT_MODEL_LEN: u16 = 8;
pub const SOFTWARE_VERSION: RegisterAddress = RegisterAddress::new(0x0014, "software version");
pub const HARDWARE_VERSION: RegisterAddress = RegisterAddress::new(0x0016, "hardware version");
pub const SERIAL_NUMBER: RegisterAddress = RegisterAddress::new(0x0018, "serial number");
pub const IDENTITY_START: u16 = 0x000A;
pub const IDENTITY_LEN: u16 = 16;

// Live status.
pub const BATTERY_SOC: RegisterAddress = RegisterAddress::new(0x0100, "battery state of charge");
pub const BATTERY_VOLTAGE: RegisterAddress = RegisterAddress::new(0x0101, "battery voltage");
pub const CHARGING_CURRENT: RegisterAddress = RegisterAddress::new(0x0102, "charging current");
pub const TEMPERATURES: RegisterAddress = RegisterAddress::new(0x0103, "controller / battery temperature");
pub const LOAD_VOLTAGE: RegisterAddress = RegisterAddress::new(0x0104, "load voltage");
pub const LOAD_CURRENT: RegisterAddress = RegisterAddress::new(0x0105, "load current");
pub const LOAD_POWER: RegisterAddress = RegisterAddress::new(0x0106, "load power");
pub const SOLAR_VOLTAGE: RegisterAddress = RegisterAddress::new(0x0107, "solar voltage");
pub const SOLAR_CURRENT: RegisterAddress = RegisterAddress::new(0x0108, "solar current");
pub const SOLAR_POWER: RegisterAddress = RegisterAddress::new(0x0109, "solar power");
pub const DEVICE_ADDRESS: RegisterAddress = RegisterAddress::new(0x010A, "device address");
pub const TODAY_MIN_VOLTAGE: RegisterAddress = RegisterAddress::new(0x010B, "today min battery voltage");
pub const TODAY_MAX_VOLTAGE: RegisterAddress = RegisterAddress::new(0x010C, "today max battery voltage");
pub const TODAY_MAX_CHARGE_CURRENT: RegisterAddress = RegisterAddress::new(0x010D, "today max charging current");
pub const TODAY_MAX_DISCHARGE_CURRENT: RegisterAddress = RegisterAddress::new(0x010E, "today max discharging current");
pub const TODAY_MAX_CHARGE_POWER: RegisterAddress = RegisterAddress::new(0x010F, "today max charging power");
pub const TODAY_MAX_DISCHARGE_POWER: RegisterAddress = RegisterAddress::new(0x0110, "today max discharging power");
pub const TODAY_CHARGE_AH: RegisterAddress = RegisterAddress::new(0x0111, "today charging amp-hours");
pub const TODAY_DISCHARGE_AH: RegisterAddress = RegisterAddress::new(0x0112, "today discharging amp-hours");
pub const TODAY_GENERATION: RegisterAddress = RegisterAddress::new(0x0113, "today power generation");
pub const TODAY_CONSUMPTION: RegisterAddress = RegisterAddress::new(0x0114, "today power consumption");
pub const OPERATING_DAYS: RegisterAddress = RegisterAddress::new(0x0115, "operating days");
pub const OVER_DISCHARGE_COUNT: RegisterAddress = RegisterAddress::new(0x0116, "over-discharge count");
pub const FULL_CHARGE_COUNT: RegisterAddress = RegisterAddress::new(0x0117, "full charge count");
pub const TOTAL_CHARGE_AH: RegisterAddress = RegisterAddress::new(0x0118, "total charging amp-hours");
pub const TOTAL_DISCHARGE_AH: RegisterAddress = RegisterAddress::new(0x011A, "total discharging amp-hours");
pub const TOTAL_GENERATION: RegisterAddress = RegisterAddress::new(0x011C, "total power generation");
pub const TOTAL_CONSUMPTION: RegisterAddress = RegisterAddress::new(0x011E, "total power consumption");
pub const LOAD_CHARGING_STATE: RegisterAddress = RegisterAddress::new(0x0120, "load status / charging state");
pub const FAULTS: RegisterAddress = RegisterAddress::new(0x0121, "controller faults");
pub const STATUS_START: u16 = 0x0100;
pub const STATUS_LEN: u16 = 0x23;

// Configuration.
pub const LED_DIMMING: RegisterAddress = RegisterAddress::new(0xE001, "LED dimming");
pub const BATTERY_CAPACITY: RegisterAddress = RegisterAddress::new(0xE002, "battery capacity");
pub const BATTERY_TYPE: RegisterAddress = RegisterAddress::new(0xE004, "battery type");
pub const OVER_VOLTAGE_LIMIT: RegisterAddress = RegisterAddress::new(0xE005, "over-voltage limit");
pub const CHARGE_LIMIT: RegisterAddress = RegisterAddress::new(0xE006, "charge limit");
pub const EQUALIZATION: RegisterAddress = RegisterAddress::new(0xE007, "equalization");
pub const BOOST: RegisterAddress = RegisterAddress::new(0xE008, "boost");
pub const FLOAT_RECOVERY: RegisterAddress = RegisterAddress::new(0xE009, "float / overcharge recovery");
pub const BOOST_RECOVERY: RegisterAddress = RegisterAddress::new(0xE00A, "boost recovery");
pub const DISCHARGE_RECOVERY: RegisterAddress = RegisterAddress::new(0xE00B, "over-discharge recovery");
pub const UNDER_VOLTAGE_WARNING: RegisterAddress = RegisterAddress::new(0xE00C, "under-voltage warning");
pub const OVER_DISCHARGE: RegisterAddress = RegisterAddress::new(0xE00D, "over-discharge");
pub const DISCHARGE_LIMIT: RegisterAddress = RegisterAddress::new(0xE00E, "discharge limit");
pub const SOC_LIMITS: RegisterAddress = RegisterAddress::new(0xE00F, "charge / discharge SOC");
pub const OVER_DISCHARGE_DELAY: RegisterAddress = RegisterAddress::new(0xE010, "over-discharge delay");
pub const EQUALIZING_TIME: RegisterAddress = RegisterAddress::new(0xE011, "equalizing time");
pub const BOOST_TIME: RegisterAddress = RegisterAddress::new(0xE012, "boost time");
pub const EQUALIZING_INTERVAL: RegisterAddress = RegisterAddress::new(0xE013, "equalizing interval");
pub const TEMPERATURE_COMPENSATION: RegisterAddress = RegisterAddress::new(0xE014, "temperature compensation factor");
/// Four (duration, power) pairs starting at 0xE015.
pub const STAGES_START: u16 = 0xE015;
pub const LOAD_MODE: RegisterAddress = RegisterAddress::new(0xE01D, "load mode");
pub const LIGHT_DELAY: RegisterAddress = RegisterAddress::new(0xE01E, "light control delay");
pub const LIGHT_VOLTAGE: RegisterAddress = RegisterAddress::new(0xE01F, "light control voltage");
pub const LED_CURRENT_SETTING: RegisterAddress = RegisterAddress::new(0xE020, "LED load current setting");
/// Three (working hours, power with people, power without people) triples starting at 0xE022.
pub const SENSING_START: u16 = 0xE022;
pub const SENSING_DELAY: RegisterAddress = RegisterAddress::new(0xE02B, "sensing time delay");
pub const LED_LOAD_CURRENT: RegisterAddress = RegisterAddress::new(0xE02C, "LED load current");
pub const CONFIG_START: u16 = 0xE001;
pub const CONFIG_LEN: u16 = 0x2D;

// Daily counters.
pub const CURRENT_DAY: RegisterAddress = RegisterAddress::new(0xF000, "current day");
pub const LAST_DAY: RegisterAddress = RegisterAddress::new(0xF001, "last day");

/// Contiguous registers returned by one read, indexed by device address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBlock {
    start: u16,
    values: Vec<u16>,
}

impl RegisterBlock {
    pub fn new(start: u16, values: Vec<u16>) -> Self {
        Self { start, values }
    }

    pub fn read<C>(client: &mut C, start: u16, count: u16) -> Result<Self, CommunicationError>
    where
        C: RegisterClient + ?Sized,
    {
        let values = client.read_registers(start, count)?;
        Ok(Self::new(start, values))
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, address: u16) -> Option<u16> {
        let index = usize::from(address.checked_sub(self.start)?);
        self.values.get(index).copied()
    }

    pub fn value(&self, register: RegisterAddress) -> Result<u16, DecodeError> {
        self.get(register.address)
            .ok_or(DecodeError::MissingRegister(register.address))
    }

    pub fn slice(&self, address: u16, count: u16) -> Result<&[u16], DecodeError> {
        let index = usize::from(
            address
                .checked_sub(self.start)
                .ok_or(DecodeError::MissingRegister(address))?,
        );
        let end = index + usize::from(count);
        self.values
            .get(index..end)
            .ok_or(DecodeError::MissingRegister(address))
    }
}
