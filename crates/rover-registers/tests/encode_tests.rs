use modbus_client::MemoryClient;
use rover_registers::decode::decode_voltage;
use rover_registers::map;
use rover_registers::{encode_voltage, write_voltage, EncodeError};
use types::{Millivolts, RatedSystemVoltage};

#[test]
fn encode_halves_for_24v_class() {
    assert_eq!(encode_voltage(Millivolts(29_200), RatedSystemVoltage::V12).expect("encode"), 292);
    assert_eq!(encode_voltage(Millivolts(29_200), RatedSystemVoltage::V24).expect("encode"), 146);
    assert_eq!(encode_voltage(Millivolts(29_200), RatedSystemVoltage::V48).expect("encode"), 292);
}

#[test]
fn encode_truncates_toward_zero() {
    assert_eq!(encode_voltage(Millivolts(28_700), RatedSystemVoltage::V24).expect("encode"), 143);
    assert_eq!(encode_voltage(Millivolts(20_399), RatedSystemVoltage::V12).expect("encode"), 203);
    // 28.7 parsed from a float must not land one step low
    let volts = Millivolts::from_volts(28.7).expect("finite");
    assert_eq!(encode_voltage(volts, RatedSystemVoltage::V12).expect("encode"), 287);
}

#[test]
fn encode_rejects_unrepresentable_values() {
    assert!(matches!(
        encode_voltage(Millivolts(-100), RatedSystemVoltage::V12),
        Err(EncodeError::OutOfRange { .. })
    ));
    assert!(matches!(
        encode_voltage(Millivolts(6_553_600), RatedSystemVoltage::V12),
        Err(EncodeError::OutOfRange { .. })
    ));
}

#[test]
fn decode_encode_round_trip_12v() {
    for decivolts in 0..=6_553i64 {
        let volts = Millivolts(decivolts * 100);
        let raw = encode_voltage(volts, RatedSystemVoltage::V12).expect("encode");
        let decoded = decode_voltage(raw, RatedSystemVoltage::V12);
        assert!((decoded - volts.as_volts()).abs() < 0.1, "{volts}");
    }
}

#[test]
fn decode_encode_round_trip_24v() {
    for raw in 0..=u16::MAX / 2 {
        let decoded = decode_voltage(raw, RatedSystemVoltage::V24);
        let volts = Millivolts::from_volts(decoded).expect("finite");
        let encoded = encode_voltage(volts, RatedSystemVoltage::V24).expect("encode");
        assert_eq!(encoded, raw);
        let again = decode_voltage(encoded, RatedSystemVoltage::V24);
        assert!((again - volts.as_volts()).abs() < 0.1);
    }
}

#[test]
fn write_refuses_status_registers_without_bus_traffic() {
    let mut client = MemoryClient::new();
    client.map_zeroed(0x0100, 0x23);

    let err = write_voltage(
        &mut client,
        map::BATTERY_VOLTAGE,
        Millivolts(13_200),
        RatedSystemVoltage::V12,
    )
    .expect_err("read-only");
    assert!(matches!(err, EncodeError::ReadOnlyRegister { address: 0x0101, .. }));
    assert_eq!(client.request_count(), 0);
}

#[test]
fn write_encodes_configuration_register() {
    let mut client = MemoryClient::new();

    let raw = write_voltage(
        &mut client,
        map::OVER_VOLTAGE_LIMIT,
        Millivolts(29_200),
        RatedSystemVoltage::V24,
    )
    .expect("write");
    assert_eq!(raw, 146);
    assert_eq!(client.get(0xE005), Some(146));
}

#[test]
fn register_access_follows_address_blocks() {
    assert!(map::OVER_VOLTAGE_LIMIT.is_writable());
    assert!(map::LED_LOAD_CURRENT.is_writable());
    assert!(!map::BATTERY_VOLTAGE.is_writable());
    assert!(!map::FAULTS.is_writable());
    assert!(!map::CURRENT_DAY.is_writable());
    assert_eq!(map::RATED_VOLTAGE_CURRENT.access(), map::Access::ReadOnly);
}
