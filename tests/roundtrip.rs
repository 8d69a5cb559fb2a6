//! Structural round trips and error-path checks that do not depend on
//! specific golden bytes: list policies, alignment, bounded decoding and
//! clean versus truncated termination.

use ofwire::oxm::{xm_field, MATCH_TYPE_OXM, XM_CLASS_OPENFLOW_BASIC};
use ofwire::{
    Action, Bucket, BucketCounter, Encode, GroupDescStats, GroupMod, GroupStats, Hello, HelloElem,
    Instruction, Match, Oxm, PacketQueue, QueueGetConfigReply, QueueGetConfigRequest, QueueProp,
    UnknownPolicy, WireError,
};
use std::io::Cursor;

fn oxm(field: u8, value: Vec<u8>, mask: Option<Vec<u8>>) -> Oxm {
    Oxm { class: XM_CLASS_OPENFLOW_BASIC, field, value, mask }
}

#[test]
fn test_match_encoding_is_8_aligned() {
    // 6-byte MAC value: 4 + 10 = 14 body bytes, so 2 padding bytes.
    let m = Match {
        match_type: MATCH_TYPE_OXM,
        fields: vec![oxm(xm_field::ETH_DST, vec![0, 1, 2, 3, 4, 5], None)],
    };
    let bytes = m.to_bytes().expect("encode");
    assert_eq!(bytes.len() % 8, 0);
    assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), 14); // padding excluded

    let decoded = Match::decode(&mut Cursor::new(&bytes[..])).expect("decode");
    assert_eq!(decoded.fields, m.fields);
}

#[test]
fn test_oxm_mask_splits_payload_evenly() {
    let x = oxm(
        xm_field::METADATA,
        vec![1, 2, 3, 4, 5, 6, 7, 8],
        Some(vec![0xff; 8]),
    );
    let bytes = x.to_bytes().expect("encode");
    assert_eq!(bytes[3], 16); // payload length counts value and mask

    let decoded = Oxm::decode(&mut Cursor::new(&bytes[..])).expect("decode");
    assert_eq!(decoded, x);
    assert_eq!(
        decoded.mask.as_ref().map(Vec::len),
        Some(decoded.value.len())
    );
}

#[test]
fn test_oxm_zero_length_value() {
    // ETH_TYPE with a declared length of zero: empty value, no mask.
    let bytes = [0x80, 0x00, 0x0a, 0x00];
    let decoded = Oxm::decode(&mut Cursor::new(&bytes[..])).expect("decode");
    assert_eq!(
        decoded,
        Oxm {
            class: XM_CLASS_OPENFLOW_BASIC,
            field: xm_field::ETH_TYPE,
            value: vec![],
            mask: None,
        }
    );
    assert_eq!(decoded.to_bytes().expect("encode"), bytes);
}

#[test]
fn test_oxm_payload_too_long_to_encode() {
    // Value plus mask overflow the one-byte length field; the encoder must
    // fail rather than write a truncated length.
    let x = oxm(xm_field::METADATA, vec![0; 200], Some(vec![0xff; 200]));
    match x.to_bytes() {
        Err(WireError::BadLength(_)) => {}
        other => panic!("expected bad length, got {other:?}"),
    }
}

#[test]
fn test_bucket_too_long_to_encode() {
    // 4100 output actions put the total past the u16 length slot.
    let b = Bucket {
        weight: 0,
        watch_port: ofwire::port::PORT_ANY,
        watch_group: ofwire::group::GROUP_ANY,
        actions: (0..4100).map(|i| Action::Output { port: i, max_len: 0 }).collect(),
    };
    match b.to_bytes() {
        Err(WireError::BadLength(_)) => {}
        other => panic!("expected bad length, got {other:?}"),
    }
}

#[test]
fn test_oxm_masked_odd_length_is_rejected() {
    // Mask bit set but a 5-byte payload cannot split into value and mask.
    let bytes = [0x80, 0x00, 0x05, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05];
    match Oxm::decode(&mut Cursor::new(&bytes[..])) {
        Err(WireError::BadLength(_)) => {}
        other => panic!("expected bad length, got {other:?}"),
    }
}

#[test]
fn test_match_field_lookup() {
    let m = Match {
        match_type: MATCH_TYPE_OXM,
        fields: vec![
            oxm(xm_field::IN_PORT, 7u32.to_be_bytes().to_vec(), None),
            oxm(xm_field::ETH_TYPE, 0x0800u16.to_be_bytes().to_vec(), None),
        ],
    };
    assert_eq!(m.field(xm_field::IN_PORT).and_then(Oxm::value_u32), Some(7));
    assert_eq!(m.field(xm_field::ETH_TYPE).and_then(Oxm::value_u16), Some(0x0800));
    assert!(m.field(xm_field::VLAN_VID).is_none());
}

#[test]
fn test_unknown_action_rejected_or_kept() {
    // Type code 5 is unassigned in this protocol revision.
    let bytes = [0x00, 0x05, 0x00, 0x08, 0xaa, 0xbb, 0xcc, 0xdd];

    match Action::decode_one(&mut Cursor::new(&bytes[..]), UnknownPolicy::Reject) {
        Err(WireError::UnknownVariant { kind: "action", code: 5 }) => {}
        other => panic!("expected unknown variant, got {other:?}"),
    }

    let kept = Action::decode_one(&mut Cursor::new(&bytes[..]), UnknownPolicy::Keep)
        .expect("decode");
    assert_eq!(kept, Action::Unknown { action_type: 5, body: vec![0xaa, 0xbb, 0xcc, 0xdd] });
    assert_eq!(kept.to_bytes().expect("encode"), bytes);
}

#[test]
fn test_unknown_variant_aborts_whole_list() {
    let mut bytes = Action::CopyTtlIn.to_bytes().expect("encode");
    bytes.extend_from_slice(&[0x00, 0x05, 0x00, 0x08, 0, 0, 0, 0]);

    // No partial list comes back under the rejecting policy.
    assert!(Action::decode_list(&mut Cursor::new(&bytes[..]), UnknownPolicy::Reject).is_err());

    let kept =
        Action::decode_list(&mut Cursor::new(&bytes[..]), UnknownPolicy::Keep).expect("decode");
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0], Action::CopyTtlIn);
}

#[test]
fn test_keep_policy_steps_over_unknown_without_desync() {
    // unknown record, then a known one: the length header keeps the scan
    // aligned on the next record.
    let mut bytes = vec![0x00, 0x05, 0x00, 0x0c, 1, 2, 3, 4, 5, 6, 7, 8];
    bytes.extend_from_slice(&Action::PopVlan.to_bytes().expect("encode"));

    let kept =
        Action::decode_list(&mut Cursor::new(&bytes[..]), UnknownPolicy::Keep).expect("decode");
    assert_eq!(kept[1], Action::PopVlan);
}

#[test]
fn test_policy_reaches_nested_action_list() {
    let mut body = Instruction::WriteActions {
        actions: vec![Action::Unknown { action_type: 5, body: vec![0; 4] }],
    }
    .to_bytes()
    .expect("encode");

    assert!(
        Instruction::decode_list(&mut Cursor::new(&body[..]), UnknownPolicy::Reject).is_err()
    );
    let kept = Instruction::decode_list(&mut Cursor::new(&body[..]), UnknownPolicy::Keep)
        .expect("decode");
    assert_eq!(kept.len(), 1);

    // Same for unknown instruction codes themselves.
    body[0..2].copy_from_slice(&[0x00, 0x2a]);
    assert!(
        Instruction::decode_list(&mut Cursor::new(&body[..]), UnknownPolicy::Reject).is_err()
    );
}

#[test]
fn test_group_mod_roundtrip() {
    let g = GroupMod {
        command: ofwire::group::GROUP_COMMAND_ADD,
        group_type: ofwire::group::GROUP_TYPE_FAST_FAILOVER,
        group: 9,
        buckets: vec![
            Bucket {
                weight: 1,
                watch_port: 3,
                watch_group: ofwire::group::GROUP_ANY,
                actions: vec![Action::Output { port: 3, max_len: 0 }],
            },
            Bucket {
                weight: 1,
                watch_port: 4,
                watch_group: ofwire::group::GROUP_ANY,
                actions: vec![Action::Output { port: 4, max_len: 0 }],
            },
        ],
    };
    let bytes = g.to_bytes().expect("encode");
    let decoded =
        GroupMod::decode(&mut Cursor::new(&bytes[..]), UnknownPolicy::Reject).expect("decode");
    assert_eq!(decoded, g);
}

#[test]
fn test_group_stats_bounds_bucket_counters() {
    let s = GroupStats {
        group: 1,
        ref_count: 2,
        packet_count: 1000,
        byte_count: 64000,
        duration_sec: 60,
        duration_nsec: 500,
        bucket_stats: vec![
            BucketCounter { packet_count: 600, byte_count: 38400 },
            BucketCounter { packet_count: 400, byte_count: 25600 },
        ],
    };
    let bytes = s.to_bytes().expect("encode");
    assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]) as usize, bytes.len());

    // A second stats record right behind the first must decode from the
    // same stream, so the counter list cannot overrun its bound.
    let mut stream = bytes.clone();
    stream.extend_from_slice(&bytes);
    let both = GroupStats::decode_list(&mut Cursor::new(&stream[..])).expect("decode");
    assert_eq!(both, vec![s.clone(), s]);
}

#[test]
fn test_group_desc_stats_roundtrip() {
    let d = GroupDescStats {
        group_type: ofwire::group::GROUP_TYPE_ALL,
        group: 4,
        buckets: vec![Bucket {
            weight: 0,
            watch_port: ofwire::port::PORT_ANY,
            watch_group: ofwire::group::GROUP_ANY,
            actions: vec![Action::DecNwTtl],
        }],
    };
    let bytes = d.to_bytes().expect("encode");
    let decoded = GroupDescStats::decode(&mut Cursor::new(&bytes[..]), UnknownPolicy::Reject)
        .expect("decode");
    assert_eq!(decoded, d);
}

#[test]
fn test_queue_reply_clean_eof_vs_truncation() {
    let reply = QueueGetConfigReply {
        port: 2,
        queues: vec![
            PacketQueue {
                queue_id: 1,
                port: 2,
                properties: vec![QueueProp::MinRate { rate: 100 }],
            },
            PacketQueue {
                queue_id: 2,
                port: 2,
                properties: vec![QueueProp::MaxRate { rate: 900 }],
            },
        ],
    };
    let bytes = reply.to_bytes().expect("encode");

    // Ending exactly on a record boundary terminates the queue list.
    let decoded = QueueGetConfigReply::decode(&mut Cursor::new(&bytes[..]), UnknownPolicy::Reject)
        .expect("decode");
    assert_eq!(decoded, reply);

    // The same bytes cut mid-record are a short read, not a shorter list.
    let truncated = &bytes[..bytes.len() - 4];
    match QueueGetConfigReply::decode(&mut Cursor::new(truncated), UnknownPolicy::Reject) {
        Err(WireError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected short read, got {other:?}"),
    }
}

#[test]
fn test_queue_request_roundtrip() {
    let req = QueueGetConfigRequest { port: ofwire::queue::QUEUE_ALL };
    let bytes = req.to_bytes().expect("encode");
    assert_eq!(bytes.len(), 8);
    let decoded = QueueGetConfigRequest::decode(&mut Cursor::new(&bytes[..])).expect("decode");
    assert_eq!(decoded, req);
}

#[test]
fn test_queue_experimenter_property_carries_data() {
    let p = QueueProp::Experimenter { experimenter: 0xcafe, data: vec![1, 2, 3] };
    let bytes = p.to_bytes().expect("encode");
    assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]) as usize, bytes.len());
    let decoded = QueueProp::decode_one(&mut Cursor::new(&bytes[..]), UnknownPolicy::Reject)
        .expect("decode");
    assert_eq!(decoded, p);
}

#[test]
fn test_hello_keeps_unknown_elements() {
    // Elements from future protocol revisions must not fail the handshake.
    let h = Hello {
        elements: vec![
            HelloElem::VersionBitmap { bitmaps: vec![0x10] },
            HelloElem::Unknown { elem_type: 7, body: vec![1, 2, 3, 4] },
        ],
    };
    let bytes = h.to_bytes().expect("encode");
    let decoded = Hello::decode(&mut Cursor::new(&bytes[..])).expect("decode");
    assert_eq!(decoded, h);
}

#[test]
fn test_empty_hello() {
    let h = Hello::default();
    assert!(h.to_bytes().expect("encode").is_empty());
    let decoded = Hello::decode(&mut Cursor::new(&[][..])).expect("decode");
    assert!(decoded.elements.is_empty());
}

#[test]
fn test_declared_length_shorter_than_header_is_rejected() {
    // Bucket claiming 12 total bytes cannot hold its own 16-byte header.
    let bytes = [
        0x00, 0x0c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00,
    ];
    match Bucket::decode(&mut Cursor::new(&bytes[..]), UnknownPolicy::Reject) {
        Err(WireError::BadLength(_)) => {}
        other => panic!("expected bad length, got {other:?}"),
    }
}
