use modbus_client::{CommunicationError, MemoryClient};
use rover_registers::{read_status, DeviceSession, RegisterError};
use types::{RatedSystemVoltage, Unit};

#[test]
fn connect_captures_identity_once() {
    let mut client = simulated_rover();
    let session = DeviceSession::connect(&mut client).expect("connect");

    assert_eq!(session.model, "RNG-CTRL-RVR40");
    assert_eq!(session.model_type_label(), "controller");
    assert_eq!(session.serial_number, 12_345_678);
    assert_eq!(session.software_version.to_string(), "V1.4.7");
    assert_eq!(session.hardware_version.to_string(), "V2.1.0");
    assert_eq!(session.rated_voltage, RatedSystemVoltage::V24);
    assert_eq!(session.rated_charge_current, 40);
    assert_eq!(session.rated_discharge_current, 20);
    assert_eq!(client.request_count(), 1);
}

#[test]
fn status_report_decodes_every_section() {
    let mut client = simulated_rover();
    let session = DeviceSession::connect(&mut client).expect("connect");
    let report = read_status(&mut client, &session).expect("status");

    assert_eq!(client.request_count(), 4);
    assert_eq!(report.sections.len(), 10);

    let value = |title: &str, name: &str| {
        report
            .reading(title, name)
            .unwrap_or_else(|| panic!("missing {title}/{name}"))
            .clone()
    };

    assert_eq!(value("Battery", "SOC").value, 87.0);
    assert_eq!(value("Battery", "Voltage").value, 13.2);
    assert_eq!(value("Battery", "Voltage").unit, Unit::Volt);
    assert_eq!(value("Battery", "Charging current").value, 2.5);
    assert_eq!(value("Battery", "Type").label.as_deref(), Some("lithium"));
    assert_eq!(value("Battery", "Temperature").value, -5.0);
    assert_eq!(value("Load", "Controller temperature").value, 25.0);
    assert_eq!(value("Load", "Output").label.as_deref(), Some("on"));
    assert_eq!(value("Solar/Charging", "Current").value, 3.25);
    assert_eq!(value("Solar/Charging", "Status").label.as_deref(), Some("floating"));
    assert_eq!(value("Controller", "Load mode").label.as_deref(), Some("Manual"));
    assert_eq!(value("Controller", "Error status").value, 50.0);
    assert_eq!(value("Controller", "Error status").label.as_deref(), Some("reserved"));
    assert_eq!(
        value("Controller", "Active faults").label.as_deref(),
        Some("battery over-discharge; battery under-voltage warning")
    );
    assert_eq!(value("Total", "Charging").value, 12_345.0);
    assert_eq!(value("Total", "Discharging").value, 987.0);
    assert_eq!(value("Total", "Power generation").value, 12.345);
    assert_eq!(value("Total", "Current day").value, 12.0);
    assert_eq!(value("LED load", "LED load current setting").value, 350.0);
    assert_eq!(value("Charging parameters", "Over-voltage threshold").value, 29.2);
    assert_eq!(value("Charging parameters", "Charge equalize").value, 28.6);
    assert_eq!(value("Charging parameters", "SOC charge").value, 100.0);
    assert_eq!(value("Charging parameters", "SOC discharge").value, 50.0);
    assert_eq!(value("Stages", "Stage 2 power").value, 60.0);
    assert_eq!(value("Sensing", "Power without people 3").value, 10.0);
}

#[test]
fn status_read_failure_is_a_communication_error() {
    let mut client = simulated_rover();
    let session = DeviceSession::connect(&mut client).expect("connect");
    client.fail_on(0xE010);

    let err = read_status(&mut client, &session).expect_err("should fail");
    assert!(matches!(
        err,
        RegisterError::Communication(CommunicationError::Rejected { address: 0xE010 })
    ));
}

fn simulated_rover() -> MemoryClient {
    let mut client = MemoryClient::new();

    // 24V class, 40A charge; 20A discharge, controller
    client.set(0x000A, 0x1828).set(0x000B, 0x1400);
    client.set_range(0x000C, &ascii_registers(b"  RNG-CTRL-RVR40"));
    client.set_range(0x0014, &[0x0001, 0x0407, 0x0002, 0x0100]);
    client.set_range(0x0018, &[1234, 5678]);

    client.set_range(
        0x0100,
        &[
            87, 132, 250, 0x1985, 131, 120, 16, 184, 325, 60, // 0x0100..0x0109
            1, 121, 144, 410, 220, 75, 30, 12, 6, 180, // 0x010A..0x0113
            90, 365, 2, 120, 1, 2345, 0, 987, 12, 345, // 0x0114..0x011D
            0, 0, 0x8005, 0x0005, 0x0000, // 0x011E..0x0122
        ],
    );

    client.map_zeroed(0xE001, 0x2D);
    client
        .set(0xE001, 80)
        .set(0xE002, 100)
        .set(0xE004, 4)
        .set_range(0xE005, &[146, 145, 143, 145, 141, 133, 126, 112, 106, 101])
        .set(0xE00F, 0x6432)
        .set_range(0xE015, &[2, 100, 4, 60, 3, 30, 5, 20])
        .set(0xE01D, 15)
        .set(0xE020, 35)
        .set_range(0xE022, &[2, 100, 30, 3, 80, 20, 4, 50, 10])
        .set(0xE02B, 10)
        .set(0xE02C, 40);

    client.set_range(0xF000, &[12, 11]);
    client
}

fn ascii_registers(text: &[u8]) -> Vec<u16> {
    text.chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}
