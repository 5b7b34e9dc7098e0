use modbus_client::{registers_to_string, CommunicationError, MemoryClient, RegisterClient};

#[test]
fn read_register_and_range() {
    let mut client = MemoryClient::new();
    client.set_range(0x0100, &[87, 132, 0]);

    assert_eq!(client.read_register(0x0101).expect("read"), 132);
    assert_eq!(
        client.read_registers(0x0100, 3).expect("read range"),
        vec![87, 132, 0]
    );
    assert!(client.read_registers(0x0100, 0).expect("empty read").is_empty());
}

#[test]
fn unmapped_address_is_rejected() {
    let mut client = MemoryClient::new();
    client.set(0x0100, 1);

    let err = client.read_registers(0x0100, 2).expect_err("should fail");
    assert!(matches!(err, CommunicationError::Rejected { address: 0x0101 }));
}

#[test]
fn forced_failure_blocks_reads_and_writes() {
    let mut client = MemoryClient::new();
    client.map_zeroed(0xE005, 10).fail_on(0xE007);

    assert!(client.read_register(0xE007).is_err());
    assert!(client.write_registers(0xE007, &[143]).is_err());
    assert!(client.writes().is_empty());

    client.write_registers(0xE008, &[145]).expect("write");
    assert_eq!(client.get(0xE008), Some(145));
    assert_eq!(client.writes(), [(0xE008u16, vec![145u16])].as_slice());
    assert_eq!(client.request_count(), 3);
}

#[test]
fn read_string_decodes_ascii_pairs() {
    let mut client = MemoryClient::new();
    // "  RNG-CTRL-RVR40" padded with spaces, then NUL padding.
    let text = b"  RNG-CTRL-RVR40";
    let registers: Vec<u16> = text
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    client.set_range(0x000C, &registers);

    assert_eq!(
        client.read_string(0x000C, 8).expect("read string"),
        "RNG-CTRL-RVR40"
    );
    assert_eq!(registers_to_string(&[0x4142, 0x4300]), "ABC");
}
