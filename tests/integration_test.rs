use rct_proto::command::Command;
use rct_proto::frame::build_frame;
use rct_proto::receive::ReceiveFrame;
use rct_proto::registry::{fault_bits, Group, ObjectInfo, Registry};
use rct_proto::types::{self, DataType, Value};

#[test]
fn read_battery_soc_matches_known_wire_bytes() {
    let out = build_frame(Command::Read, 0x959930BF, &[], None).unwrap();
    assert_eq!(
        out,
        vec![0x2B, 0x01, 0x04, 0x95, 0x99, 0x30, 0xBF, 0x0D, 0x65]
    );
}

#[test]
fn response_with_float_payload_decodes_through_registry_type() {
    let bytes = [
        0x00, 0x2B, 0x05, 0x08, 0x95, 0x99, 0x30, 0xBF, 0x3E, 0x97, 0xB1, 0x91, 0x9C, 0x86,
    ];
    let mut rf = ReceiveFrame::new();
    let consumed = rf.consume(&bytes);
    assert_eq!(consumed, bytes.len());
    assert!(rf.complete());
    assert_eq!(rf.command(), Command::Response);
    assert_eq!(rf.id(), 0x959930BF);
    assert_eq!(rf.address(), 0);

    let frame = rf.frame().expect("frame complete");
    assert_eq!(frame.command, Command::Response);
    assert_eq!(frame.id, 0x959930BF);
    assert_eq!(frame.payload, rf.data());

    let registry = Registry::build(vec![ObjectInfo {
        object_id: 0x959930BF,
        name: "battery.soc".to_string(),
        group: Group::Battery,
        description: Some("state of charge".to_string()),
        unit: Some("%".to_string()),
        request_data_type: DataType::Float,
        response_data_type: DataType::Float,
        enum_map: None,
        sim_data: None,
    }])
    .unwrap();

    let info = registry.by_id(rf.id()).unwrap();
    match types::decode(info.response_data_type, rf.data()).unwrap() {
        Value::Float(v) => assert!((v - 0.2961).abs() < 0.001),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn response_fed_in_two_chunks_still_completes() {
    let bytes = [
        0x00, 0x2B, 0x05, 0x08, 0x95, 0x99, 0x30, 0xBF, 0x3E, 0x97, 0xB1, 0x91, 0x9C, 0x86,
    ];
    let mut rf = ReceiveFrame::new();
    let first = rf.consume(&bytes[..4]);
    assert!(!rf.complete());
    let second = rf.consume(&bytes[4..]);
    assert_eq!(first + second, bytes.len());
    assert!(rf.complete());
    assert_eq!(rf.id(), 0x959930BF);
}

#[test]
fn crc_mismatch_is_terminal_and_consumes_the_whole_frame() {
    let mut bytes = vec![
        0x00, 0x2B, 0x05, 0x08, 0x95, 0x99, 0x30, 0xBF, 0x3E, 0x97, 0xB1, 0x91, 0x9C, 0x86,
    ];
    *bytes.last_mut().unwrap() ^= 0xFF;

    let mut rf = ReceiveFrame::new();
    let consumed = rf.consume(&bytes);
    assert_eq!(consumed, 14);
    assert!(!rf.complete());
    assert!(rf.error().is_some());

    let mut permissive = ReceiveFrame::new_permissive();
    permissive.consume(&bytes);
    assert!(permissive.complete());
    assert!(permissive.crc_mismatch());
    assert_eq!(permissive.data(), &[0x3E, 0x97, 0xB1, 0x91]);
}

#[test]
fn unknown_command_byte_fails_after_the_command_byte() {
    let mut rf = ReceiveFrame::new();
    let consumed = rf.consume(&[0x2B, 0xFF, 0x00, 0x00, 0x00]);
    assert_eq!(consumed, 2);
    assert!(rf.error().is_some());
}

#[test]
fn escape_round_trip_through_the_whole_send_and_receive_path() {
    let payload = b"a+b-c\0";
    let out = build_frame(Command::Write, 1, payload, None).unwrap();
    assert!(out.contains(&rct_proto::escape::ESCAPE));

    let mut rf = ReceiveFrame::new();
    rf.consume(&out);
    assert!(rf.complete());
    match types::decode(DataType::String, rf.data()) {
        Ok(Value::String(s)) => assert_eq!(s, "a+b-c"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn build_then_receive_round_trips_for_every_non_plant_command() {
    let commands = [
        Command::Read,
        Command::Write,
        Command::LongWrite,
        Command::Response,
        Command::LongResponse,
        Command::ReadPeriodically,
    ];
    for &cmd in &commands {
        let payload = vec![0xAB, 0xCD, 0xEF];
        let built = build_frame(cmd, 0x01020304, &payload, None).unwrap();

        let mut rf = ReceiveFrame::new();
        let consumed = rf.consume(&built);
        assert_eq!(consumed, built.len(), "command {:?}", cmd);
        assert!(rf.complete(), "command {:?}", cmd);
        assert_eq!(rf.command(), cmd);
        assert_eq!(rf.id(), 0x01020304);
        assert_eq!(rf.data(), payload.as_slice());
    }
}

#[test]
fn build_then_receive_round_trips_for_plant_commands() {
    let commands = [
        Command::PlantRead,
        Command::PlantWrite,
        Command::PlantLongWrite,
        Command::PlantResponse,
        Command::PlantLongResponse,
        Command::PlantReadPeriodically,
    ];
    for &cmd in &commands {
        let payload = vec![0x11, 0x22];
        let built = build_frame(cmd, 42, &payload, Some(0xCAFEBABE)).unwrap();

        let mut rf = ReceiveFrame::new();
        rf.consume(&built);
        assert!(rf.complete(), "command {:?}", cmd);
        assert_eq!(rf.address(), 0xCAFEBABE);
        assert_eq!(rf.id(), 42);
        assert_eq!(rf.data(), payload.as_slice());
    }
}

#[test]
fn trailing_bytes_after_a_complete_frame_are_left_for_the_next_one() {
    let first = build_frame(Command::Read, 1, &[], None).unwrap();
    let second = build_frame(Command::Read, 2, &[], None).unwrap();
    let mut combined = first.clone();
    combined.extend_from_slice(&second);

    let mut rf = ReceiveFrame::new();
    let consumed = rf.consume(&combined);
    assert_eq!(consumed, first.len());
    assert!(rf.complete());
    assert_eq!(rf.id(), 1);

    let mut rf2 = ReceiveFrame::new();
    let consumed2 = rf2.consume(&combined[consumed..]);
    assert_eq!(consumed2, second.len());
    assert!(rf2.complete());
    assert_eq!(rf2.id(), 2);
}

#[test]
fn time_series_and_event_table_round_trip_through_a_long_response_frame() {
    let mut payload = vec![];
    payload.extend_from_slice(&1_700_000_000u32.to_be_bytes());
    payload.extend_from_slice(&1_700_000_010u32.to_be_bytes());
    payload.extend_from_slice(&12.5f32.to_be_bytes());
    payload.extend_from_slice(&1_700_000_020u32.to_be_bytes());
    payload.extend_from_slice(&13.75f32.to_be_bytes());

    let built = build_frame(Command::LongResponse, 0xAABBCCDD, &payload, None).unwrap();
    let mut rf = ReceiveFrame::new();
    rf.consume(&built);
    assert!(rf.complete());

    match types::decode(DataType::TimeSeries, rf.data()).unwrap() {
        Value::TimeSeries(ts) => {
            assert_eq!(ts.request_timestamp, 1_700_000_000);
            assert_eq!(ts.samples.len(), 2);
            assert_eq!(ts.samples[1].value, 13.75);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn fault_bitfield_helper_folds_four_words_lsb_first() {
    let bits = fault_bits([0b1010, 0, 0, 0]);
    assert!(!bits[0]);
    assert!(bits[1]);
    assert!(!bits[2]);
    assert!(bits[3]);
    assert!(bits[4..128].iter().all(|b| !b));
}
