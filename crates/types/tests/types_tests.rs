use types::{DeviceReading, Millivolts, RatedSystemVoltage, Unit};

#[test]
fn millivolt_truncation_and_rounding() {
    let value = Millivolts(28_749);
    assert_eq!(value.truncate_to(10), Millivolts(28_740));
    assert_eq!(value.truncate_to(100), Millivolts(28_700));
    assert_eq!(value.round_to(100), Millivolts(28_700));
    assert_eq!(Millivolts(28_750).round_to(100), Millivolts(28_800));
    assert_eq!(Millivolts(-150).truncate_to(100), Millivolts(-100));
}

#[test]
fn millivolt_from_volts_rejects_non_finite() {
    assert_eq!(Millivolts::from_volts(4.2), Some(Millivolts(4_200)));
    assert_eq!(Millivolts::from_volts(f64::NAN), None);
    assert_eq!(Millivolts::from_volts(f64::INFINITY), None);
}

#[test]
fn millivolt_display() {
    assert_eq!(Millivolts(29_200).to_string(), "29.20V");
    assert_eq!(Millivolts(20_335).to_string(), "20.335V");
}

#[test]
fn rated_voltage_factor() {
    assert_eq!(RatedSystemVoltage::from_code(24).voltage_factor(), 2);
    assert_eq!(RatedSystemVoltage::from_code(12).voltage_factor(), 1);
    assert_eq!(RatedSystemVoltage::from_code(48).voltage_factor(), 1);
    assert!(!RatedSystemVoltage::from_code(0xFF).is_known());
    assert_eq!(RatedSystemVoltage::V36.to_string(), "36V");
}

#[test]
fn reading_display_prefers_label() {
    let plain = DeviceReading::new("Battery voltage", 13.2, Unit::Volt);
    assert_eq!(plain.to_string(), "13.2V");

    let coded = DeviceReading::labelled("Battery type", 4.0, "lithium");
    assert_eq!(coded.to_string(), "lithium");
}
