use rover_registers::decode::{
    decode_current, decode_decivolts, decode_enum, decode_fault_codes,
    decode_multi_register_integer, decode_packed_byte_fields, decode_scaled,
    decode_signed_byte_temperature, decode_temperatures, decode_version, decode_voltage,
    CurrentScale, DecodeError,
};
use rover_registers::tables::BATTERY_TYPE;
use types::RatedSystemVoltage;

#[test]
fn voltage_scales_only_for_24v_class() {
    assert_eq!(decode_voltage(146, RatedSystemVoltage::V12), 14.6);
    assert_eq!(decode_voltage(146, RatedSystemVoltage::V24), 29.2);
    assert_eq!(decode_voltage(146, RatedSystemVoltage::V48), 14.6);
    assert_eq!(decode_voltage(0, RatedSystemVoltage::V24), 0.0);
    assert_eq!(decode_decivolts(132), 13.2);
}

#[test]
fn current_scale_depends_on_field() {
    assert_eq!(decode_current(40, CurrentScale::WholeAmps), 40.0);
    assert_eq!(decode_current(325, CurrentScale::Centiamps), 3.25);
}

#[test]
fn kwh_totals_divide_the_joined_integer() {
    let total = decode_multi_register_integer(&[1, 2345]).expect("joined total");
    assert_eq!(decode_scaled(total, 1_000), 12.345);
    assert_eq!(decode_scaled(7, 0), 7.0);
}

#[test]
fn signed_byte_temperature_is_sign_magnitude() {
    assert_eq!(decode_signed_byte_temperature(0x05), 5);
    assert_eq!(decode_signed_byte_temperature(0x85), -5);
    assert_eq!(decode_signed_byte_temperature(0x7F), 127);
    assert_eq!(decode_signed_byte_temperature(0xFF), -127);
    assert_eq!(decode_signed_byte_temperature(0x80), 0);
}

#[test]
fn temperatures_share_one_register() {
    // controller 25°C in the high byte, battery -5°C in the low byte
    assert_eq!(decode_temperatures(0x1985), (25, -5));
}

#[test]
fn packed_byte_fields_split_low_high() {
    assert_eq!(decode_packed_byte_fields(0x1828), (0x28, 0x18));
    assert_eq!(decode_packed_byte_fields(0x00FF), (0xFF, 0x00));
}

#[test]
fn multi_register_integer_joins_decimal_strings() {
    assert_eq!(decode_multi_register_integer(&[1234, 5678]), Ok(12_345_678));
    assert_eq!(decode_multi_register_integer(&[1, 2345]), Ok(12_345));
    assert_eq!(decode_multi_register_integer(&[0, 987]), Ok(987));
    assert_eq!(decode_multi_register_integer(&[5, 0]), Ok(50));
    assert_eq!(decode_multi_register_integer(&[65_535, 65_535]), Ok(6_553_565_535));
    assert_ne!(
        decode_multi_register_integer(&[1234, 5678]),
        Ok((1234u128 << 16) | 5678)
    );
}

#[test]
fn multi_register_integer_reports_empty_and_overflow() {
    assert_eq!(decode_multi_register_integer(&[]), Err(DecodeError::Empty));
    assert_eq!(
        decode_multi_register_integer(&[65_535; 8]),
        Err(DecodeError::Overflow { registers: 8 })
    );
    assert!(decode_multi_register_integer(&[65_535; 7]).is_ok());
}

#[test]
fn version_uses_packed_bytes() {
    let version = decode_version(0x0001, 0x0407);
    assert_eq!(version.to_string(), "V1.4.7");
}

#[test]
fn fault_bits_map_to_codes() {
    assert!(decode_fault_codes(0, 0).is_empty());
    assert_eq!(decode_fault_codes(0x0005, 0x0000), vec![16, 18]);
    assert_eq!(decode_fault_codes(0x8000, 0x0001), vec![0, 31]);
}

#[test]
fn strict_enum_decode_signals_unknown_code() {
    assert_eq!(decode_enum(&BATTERY_TYPE, 4), Ok("lithium"));
    let err = decode_enum(&BATTERY_TYPE, 9).expect_err("unknown");
    assert_eq!(err.code, 9);
    assert_eq!(err.table, "battery type");
}

#[test]
fn decoders_are_total_over_register_domain() {
    for raw in 0..=u16::MAX {
        let _ = decode_voltage(raw, RatedSystemVoltage::V24);
        let _ = decode_voltage(raw, RatedSystemVoltage::Other(0xFF));
        let _ = decode_current(raw, CurrentScale::Centiamps);
        let _ = decode_temperatures(raw);
        let _ = decode_version(raw, raw);
        let _ = decode_fault_codes(raw, raw);
        assert!(decode_multi_register_integer(&[raw, raw]).is_ok());
    }
}
