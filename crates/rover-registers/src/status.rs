use modbus_client::RegisterClient;
use serde::Serialize;
use tracing::info;
use types::{DeviceReading, Unit};

use crate::decode::{
    decode_current, decode_decivolts, decode_fault_codes, decode_multi_register_integer,
    decode_packed_byte_fields, decode_scaled, decode_temperatures, decode_voltage, CurrentScale,
    DecodeError,
};
use crate::map::{self, RegisterAddress, RegisterBlock};
use crate::session::DeviceSession;
use crate::tables::{BATTERY_TYPE, CHARGING_STATE, ERROR_CODE, LOAD_MODE};
use crate::RegisterError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSection {
    pub title: &'static str,
    pub readings: Vec<DeviceReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub sections: Vec<StatusSection>,
}

impl StatusReport {
    pub fn section(&self, title: &str) -> Option<&StatusSection> {
        self.sections.iter().find(|section| section.title == title)
    }

    pub fn reading(&self, title: &str, name: &str) -> Option<&DeviceReading> {
        self.section(title)?
            .readings
            .iter()
            .find(|reading| reading.name == name)
    }
}

/// Reads the status block, the configuration block and the daily counters,
/// one request each, and decodes them into report sections.
pub fn read_status<C>(client: &mut C, session: &DeviceSession) -> Result<StatusReport, RegisterError>
where
    C: RegisterClient + ?Sized,
{
    let status = RegisterBlock::read(client, map::STATUS_START, map::STATUS_LEN)?;
    let config = RegisterBlock::read(client, map::CONFIG_START, map::CONFIG_LEN)?;
    let daily = RegisterBlock::read(client, map::CURRENT_DAY.address, 2)?;

    let report = decode_status(session, &status, &config, &daily)?;
    info!(sections = report.sections.len(), "status report decoded");
    Ok(report)
}

pub fn decode_status(
    session: &DeviceSession,
    status: &RegisterBlock,
    config: &RegisterBlock,
    daily: &RegisterBlock,
) -> Result<StatusReport, DecodeError> {
    Ok(StatusReport {
        sections: vec![
            controller_section(status, config)?,
            battery_section(status, config)?,
            load_section(status)?,
            solar_section(status)?,
            today_section(status)?,
            total_section(status, daily)?,
            led_section(config)?,
            charging_section(session, config)?,
            stages_section(config)?,
            sensing_section(config)?,
        ],
    })
}

fn raw(block: &RegisterBlock, register: RegisterAddress, name: &str, unit: Unit) -> Result<DeviceReading, DecodeError> {
    Ok(DeviceReading::new(name, f64::from(block.value(register)?), unit))
}

fn multi(block: &RegisterBlock, register: RegisterAddress) -> Result<u128, DecodeError> {
    decode_multi_register_integer(block.slice(register.address, 2)?)
}

fn controller_section(status: &RegisterBlock, config: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    let load_mode = config.value(map::LOAD_MODE)?;
    let fault_registers = status.slice(map::FAULTS.address, 2)?;
    // Older tooling read the fault pair as one decimal-joined code.
    let legacy_code = decode_multi_register_integer(fault_registers)?;
    let legacy_label = u64::try_from(legacy_code)
        .map(|code| ERROR_CODE.lookup(code))
        .unwrap_or(ERROR_CODE.fallback());
    let faults = decode_fault_codes(fault_registers[0], fault_registers[1]);
    let fault_label = if faults.is_empty() {
        ERROR_CODE.lookup(0).to_string()
    } else {
        faults
            .iter()
            .map(|code| ERROR_CODE.lookup(u64::from(*code)))
            .collect::<Vec<_>>()
            .join("; ")
    };

    Ok(StatusSection {
        title: "Controller",
        readings: vec![
            raw(status, map::DEVICE_ADDRESS, "Device address", Unit::None)?,
            DeviceReading::labelled("Load mode", f64::from(load_mode), LOAD_MODE.lookup(u64::from(load_mode))),
            raw(status, map::OPERATING_DAYS, "Days working", Unit::Day)?,
            raw(status, map::OVER_DISCHARGE_COUNT, "Over-discharges", Unit::Times)?,
            raw(status, map::FULL_CHARGE_COUNT, "Full charges", Unit::Times)?,
            DeviceReading::labelled("Error status", legacy_code as f64, legacy_label),
            DeviceReading::labelled("Active faults", faults.len() as f64, fault_label),
        ],
    })
}

fn battery_section(status: &RegisterBlock, config: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    let battery_type = config.value(map::BATTERY_TYPE)?;
    let (_, battery_temp) = decode_temperatures(status.value(map::TEMPERATURES)?);

    Ok(StatusSection {
        title: "Battery",
        readings: vec![
            raw(status, map::BATTERY_SOC, "SOC", Unit::Percent)?,
            DeviceReading::new("Voltage", decode_decivolts(status.value(map::BATTERY_VOLTAGE)?), Unit::Volt),
            DeviceReading::new(
                "Charging current",
                decode_current(status.value(map::CHARGING_CURRENT)?, CurrentScale::Centiamps),
                Unit::Amp,
            ),
            DeviceReading::labelled("Type", f64::from(battery_type), BATTERY_TYPE.lookup(u64::from(battery_type))),
            raw(config, map::BATTERY_CAPACITY, "Capacity", Unit::AmpHour)?,
            DeviceReading::new("Temperature", f64::from(battery_temp), Unit::Celsius),
        ],
    })
}

fn load_section(status: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    let (controller_temp, _) = decode_temperatures(status.value(map::TEMPERATURES)?);
    let (_, load_flags) = decode_packed_byte_fields(status.value(map::LOAD_CHARGING_STATE)?);
    let load_on = load_flags & 0x80 != 0;

    Ok(StatusSection {
        title: "Load",
        readings: vec![
            DeviceReading::new("Voltage", decode_decivolts(status.value(map::LOAD_VOLTAGE)?), Unit::Volt),
            DeviceReading::new(
                "Current",
                decode_current(status.value(map::LOAD_CURRENT)?, CurrentScale::Centiamps),
                Unit::Amp,
            ),
            raw(status, map::LOAD_POWER, "Power", Unit::Watt)?,
            DeviceReading::new("Controller temperature", f64::from(controller_temp), Unit::Celsius),
            DeviceReading::labelled("Output", f64::from(u8::from(load_on)), if load_on { "on" } else { "off" }),
        ],
    })
}

fn solar_section(status: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    let (state, _) = decode_packed_byte_fields(status.value(map::LOAD_CHARGING_STATE)?);

    Ok(StatusSection {
        title: "Solar/Charging",
        readings: vec![
            DeviceReading::new("Voltage", decode_decivolts(status.value(map::SOLAR_VOLTAGE)?), Unit::Volt),
            DeviceReading::new(
                "Current",
                decode_current(status.value(map::SOLAR_CURRENT)?, CurrentScale::Centiamps),
                Unit::Amp,
            ),
            raw(status, map::SOLAR_POWER, "Power", Unit::Watt)?,
            DeviceReading::labelled("Status", f64::from(state), CHARGING_STATE.lookup(u64::from(state))),
        ],
    })
}

fn today_section(status: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    Ok(StatusSection {
        title: "Today",
        readings: vec![
            DeviceReading::new("Min voltage", decode_decivolts(status.value(map::TODAY_MIN_VOLTAGE)?), Unit::Volt),
            DeviceReading::new("Max voltage", decode_decivolts(status.value(map::TODAY_MAX_VOLTAGE)?), Unit::Volt),
            DeviceReading::new(
                "Max charging current",
                decode_current(status.value(map::TODAY_MAX_CHARGE_CURRENT)?, CurrentScale::Centiamps),
                Unit::Amp,
            ),
            DeviceReading::new(
                "Max discharging current",
                decode_current(status.value(map::TODAY_MAX_DISCHARGE_CURRENT)?, CurrentScale::Centiamps),
                Unit::Amp,
            ),
            raw(status, map::TODAY_MAX_CHARGE_POWER, "Max charging power", Unit::Watt)?,
            raw(status, map::TODAY_MAX_DISCHARGE_POWER, "Max discharging power", Unit::Watt)?,
            raw(status, map::TODAY_CHARGE_AH, "Charging", Unit::AmpHour)?,
            raw(status, map::TODAY_DISCHARGE_AH, "Discharging", Unit::AmpHour)?,
            raw(status, map::TODAY_GENERATION, "Power generation", Unit::WattHour)?,
            raw(status, map::TODAY_CONSUMPTION, "Power consumption", Unit::WattHour)?,
        ],
    })
}

fn total_section(status: &RegisterBlock, daily: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    Ok(StatusSection {
        title: "Total",
        readings: vec![
            DeviceReading::new("Charging", multi(status, map::TOTAL_CHARGE_AH)? as f64, Unit::AmpHour),
            DeviceReading::new("Discharging", multi(status, map::TOTAL_DISCHARGE_AH)? as f64, Unit::AmpHour),
            DeviceReading::new(
                "Power generation",
                decode_scaled(multi(status, map::TOTAL_GENERATION)?, 1_000),
                Unit::KilowattHour,
            ),
            DeviceReading::new(
                "Power consumption",
                decode_scaled(multi(status, map::TOTAL_CONSUMPTION)?, 1_000),
                Unit::KilowattHour,
            ),
            raw(daily, map::CURRENT_DAY, "Current day", Unit::None)?,
            raw(daily, map::LAST_DAY, "Last day", Unit::None)?,
        ],
    })
}

fn led_section(config: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    Ok(StatusSection {
        title: "LED load",
        readings: vec![
            raw(config, map::LIGHT_DELAY, "Light delay", Unit::Minute)?,
            raw(config, map::LIGHT_VOLTAGE, "Light voltage", Unit::Volt)?,
            DeviceReading::new(
                "LED load current setting",
                f64::from(config.value(map::LED_CURRENT_SETTING)?) * 10.0,
                Unit::Milliamp,
            ),
            raw(config, map::LED_DIMMING, "Dimming", Unit::Percent)?,
            DeviceReading::new(
                "LED load current",
                f64::from(config.value(map::LED_LOAD_CURRENT)?) * 10.0,
                Unit::Milliamp,
            ),
        ],
    })
}

const THRESHOLD_READINGS: [(RegisterAddress, &str); 10] = [
    (map::OVER_VOLTAGE_LIMIT, "Over-voltage threshold"),
    (map::CHARGE_LIMIT, "Charge limit"),
    (map::EQUALIZATION, "Charge equalize"),
    (map::BOOST, "Charge boost"),
    (map::FLOAT_RECOVERY, "Charge float"),
    (map::BOOST_RECOVERY, "Charge boost recover"),
    (map::DISCHARGE_RECOVERY, "Discharge recover"),
    (map::UNDER_VOLTAGE_WARNING, "Under-voltage warning"),
    (map::OVER_DISCHARGE, "Over-discharge"),
    (map::DISCHARGE_LIMIT, "Discharge limit"),
];

fn charging_section(session: &DeviceSession, config: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    let mut readings = Vec::with_capacity(THRESHOLD_READINGS.len() + 7);
    for (register, name) in THRESHOLD_READINGS {
        readings.push(DeviceReading::new(
            name,
            decode_voltage(config.value(register)?, session.rated_voltage),
            Unit::Volt,
        ));
    }

    let (soc_discharge, soc_charge) = decode_packed_byte_fields(config.value(map::SOC_LIMITS)?);
    readings.push(DeviceReading::new("SOC charge", f64::from(soc_charge), Unit::Percent));
    readings.push(DeviceReading::new("SOC discharge", f64::from(soc_discharge), Unit::Percent));
    readings.push(raw(config, map::OVER_DISCHARGE_DELAY, "Over-discharge delay", Unit::Second)?);
    readings.push(raw(config, map::EQUALIZING_TIME, "Equalizing time", Unit::Minute)?);
    readings.push(raw(config, map::BOOST_TIME, "Boost time", Unit::Minute)?);
    readings.push(raw(config, map::EQUALIZING_INTERVAL, "Equalizing interval", Unit::Day)?);
    readings.push(raw(
        config,
        map::TEMPERATURE_COMPENSATION,
        "Temp. comp. factor (mV/°C/2V)",
        Unit::None,
    )?);

    Ok(StatusSection {
        title: "Charging parameters",
        readings,
    })
}

fn stages_section(config: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    let stages = config.slice(map::STAGES_START, 8)?;
    let readings = stages
        .chunks(2)
        .enumerate()
        .flat_map(|(index, pair)| {
            let stage = index + 1;
            [
                DeviceReading::new(format!("Stage {stage} duration"), f64::from(pair[0]), Unit::Hour),
                DeviceReading::new(format!("Stage {stage} power"), f64::from(pair[1]), Unit::Percent),
            ]
        })
        .collect();

    Ok(StatusSection {
        title: "Stages",
        readings,
    })
}

fn sensing_section(config: &RegisterBlock) -> Result<StatusSection, DecodeError> {
    let sensing = config.slice(map::SENSING_START, 9)?;
    let mut readings: Vec<DeviceReading> = sensing
        .chunks(3)
        .enumerate()
        .flat_map(|(index, triple)| {
            let sense = index + 1;
            [
                DeviceReading::new(format!("Working sense {sense}"), f64::from(triple[0]), Unit::Hour),
                DeviceReading::new(format!("Power with people {sense}"), f64::from(triple[1]), Unit::Percent),
                DeviceReading::new(format!("Power without people {sense}"), f64::from(triple[2]), Unit::Percent),
            ]
        })
        .collect();
    readings.push(raw(config, map::SENSING_DELAY, "Sensing time delay", Unit::Second)?);

    Ok(StatusSection {
        title: "Sensing",
        readings,
    })
}
