use modbus_client::{ClientConfig, ModbusClient, RegisterClient};

#[test]
fn serial_integration_read() {
    let path = match std::env::var("ROVER_TEST_PORT") {
        Ok(value) => value,
        Err(_) => return,
    };

    let mut config = ClientConfig::default();
    config.path = path;
    config.baud_rate = env_u32("ROVER_TEST_BAUD").unwrap_or(9_600);
    config.slave_id = env_u8("ROVER_TEST_SLAVE_ID").unwrap_or(1);
    config.max_batch_size = Some(2);
    config.timeout_ms = env_u64("ROVER_TEST_TIMEOUT_MS").unwrap_or(1_000);

    let mut client = ModbusClient::connect(config).expect("connect");
    let values = client.read_registers(0x000A, 2).expect("read");
    assert_eq!(values.len(), 2);
}

fn env_u8(key: &str) -> Option<u8> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}
