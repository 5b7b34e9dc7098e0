use std::collections::HashSet;

use rover_registers::tables::{
    lookup, CodeTable, BATTERY_TYPE, CHARGING_STATE, ERROR_CODE, LOAD_MODE, MODEL_TYPE,
    RESERVED, SYSTEM_VOLTAGE, UNKNOWN,
};

#[test]
fn error_codes_resolve_reserved_ranges() {
    assert_eq!(lookup(&ERROR_CODE, 0), "None");
    assert_eq!(lookup(&ERROR_CODE, 1), RESERVED);
    assert_eq!(lookup(&ERROR_CODE, 15), RESERVED);
    assert_eq!(lookup(&ERROR_CODE, 16), "battery over-discharge");
    assert_eq!(lookup(&ERROR_CODE, 30), "charge MOS short circuit");
    assert_eq!(lookup(&ERROR_CODE, 31), RESERVED);
    assert_eq!(lookup(&ERROR_CODE, u64::MAX), RESERVED);
}

#[test]
fn load_modes_fall_back_to_unknown() {
    assert_eq!(
        lookup(&LOAD_MODE, 0),
        "Sole light control, light control over on/off of load"
    );
    assert_eq!(
        lookup(&LOAD_MODE, 1),
        "Load is turned on by light control, and goes off after a time delay of 1 hour"
    );
    assert_eq!(
        lookup(&LOAD_MODE, 14),
        "Load is turned on by light control, and goes off after a time delay of 14 hours"
    );
    assert_eq!(lookup(&LOAD_MODE, 15), "Manual");
    assert_eq!(lookup(&LOAD_MODE, 17), "Normal on");
    assert_eq!(lookup(&LOAD_MODE, 18), UNKNOWN);
}

#[test]
fn device_tables_have_expected_labels() {
    assert_eq!(lookup(&BATTERY_TYPE, 4), "lithium");
    assert_eq!(lookup(&BATTERY_TYPE, 0), UNKNOWN);
    assert_eq!(lookup(&CHARGING_STATE, 5), "floating");
    assert_eq!(lookup(&SYSTEM_VOLTAGE, 24), "24V");
    assert_eq!(lookup(&MODEL_TYPE, 0), "controller");
    assert_eq!(lookup(&MODEL_TYPE, 7), UNKNOWN);
}

#[test]
fn table_codes_are_unique() {
    let tables: [&CodeTable; 6] = [
        &BATTERY_TYPE,
        &CHARGING_STATE,
        &LOAD_MODE,
        &ERROR_CODE,
        &SYSTEM_VOLTAGE,
        &MODEL_TYPE,
    ];
    for table in tables {
        let codes: HashSet<u64> = table.entries().iter().map(|(code, _)| *code).collect();
        assert_eq!(codes.len(), table.entries().len(), "{}", table.name);
    }
}
