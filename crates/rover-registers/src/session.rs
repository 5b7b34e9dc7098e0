use modbus_client::{registers_to_string, RegisterClient};
use serde::Serialize;
use tracing::info;
use types::RatedSystemVoltage;

use crate::decode::{decode_multi_register_integer, decode_packed_byte_fields, decode_version, Version};
use crate::map::{self, RegisterBlock};
use crate::tables::MODEL_TYPE;
use crate::RegisterError;

/// Identity and ratings captured once when the controller is first contacted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSession {
    pub model: String,
    pub model_type: u8,
    pub serial_number: u128,
    pub software_version: Version,
    pub hardware_version: Version,
    pub rated_voltage: RatedSystemVoltage,
    pub rated_charge_current: u8,
    pub rated_discharge_current: u8,
}

impl DeviceSession {
    pub fn connect<C>(client: &mut C) -> Result<Self, RegisterError>
    where
        C: RegisterClient + ?Sized,
    {
        let block = RegisterBlock::read(client, map::IDENTITY_START, map::IDENTITY_LEN)?;
        let session = Self::from_block(&block)?;
        info!(
            model = %session.model,
            serial_number = %session.serial_number,
            rated_voltage = %session.rated_voltage,
            software = %session.software_version,
            "device session established"
        );
        Ok(session)
    }

    pub fn from_block(block: &RegisterBlock) -> Result<Self, RegisterError> {
        let (charge_current, voltage_code) = decode_packed_byte_fields(block.value(map::RATED_VOLTAGE_CURRENT)?);
        let (model_type, discharge_current) = decode_packed_byte_fields(block.value(map::RATED_DISCHARGE_MODEL)?);
        let model = registers_to_string(block.slice(map::PRODUCT_MODEL.address, map::PRODUCT_MODEL_LEN)?);
        let software = block.slice(map::SOFTWARE_VERSION.address, 2)?;
        let hardware = block.slice(map::HARDWARE_VERSION.address, 2)?;
        let serial_number = decode_multi_register_integer(block.slice(map::SERIAL_NUMBER.address, 2)?)?;

        Ok(Self {
            model,
            model_type,
            serial_number,
            software_version: decode_version(software[0], software[1]),
            hardware_version: decode_version(hardware[0], hardware[1]),
            rated_voltage: RatedSystemVoltage::from_code(voltage_code),
            rated_charge_current: charge_current,
            rated_discharge_current: discharge_current,
        })
    }

    pub fn model_type_label(&self) -> &'static str {
        MODEL_TYPE.lookup(u64::from(self.model_type))
    }
}
