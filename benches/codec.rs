//! Benchmark: encode and decode a realistic mix of protocol records (a
//! populated match, an instruction list with nested actions, and a group
//! mod with buckets).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ofwire::oxm::{xm_field, MATCH_TYPE_OXM, XM_CLASS_OPENFLOW_BASIC};
use ofwire::{
    Action, Bucket, Encode, GroupMod, Instruction, Match, Oxm, UnknownPolicy,
};
use std::io::Cursor;

fn sample_match() -> Match {
    Match {
        match_type: MATCH_TYPE_OXM,
        fields: vec![
            Oxm {
                class: XM_CLASS_OPENFLOW_BASIC,
                field: xm_field::IN_PORT,
                value: 3u32.to_be_bytes().to_vec(),
                mask: None,
            },
            Oxm {
                class: XM_CLASS_OPENFLOW_BASIC,
                field: xm_field::ETH_TYPE,
                value: 0x0800u16.to_be_bytes().to_vec(),
                mask: None,
            },
            Oxm {
                class: XM_CLASS_OPENFLOW_BASIC,
                field: xm_field::IPV4_DST,
                value: vec![10, 0, 0, 0],
                mask: Some(vec![255, 255, 255, 0]),
            },
        ],
    }
}

fn sample_instructions() -> Vec<Instruction> {
    vec![
        Instruction::ApplyActions {
            actions: vec![
                Action::SetField(Oxm {
                    class: XM_CLASS_OPENFLOW_BASIC,
                    field: xm_field::IPV4_SRC,
                    value: vec![192, 168, 0, 1],
                    mask: None,
                }),
                Action::Output { port: 4, max_len: 0 },
            ],
        },
        Instruction::GotoTable { table: 1 },
    ]
}

fn sample_group_mod() -> GroupMod {
    GroupMod {
        command: ofwire::group::GROUP_COMMAND_ADD,
        group_type: ofwire::group::GROUP_TYPE_SELECT,
        group: 1,
        buckets: (0..8)
            .map(|i| Bucket {
                weight: 1,
                watch_port: ofwire::port::PORT_ANY,
                watch_group: ofwire::group::GROUP_ANY,
                actions: vec![Action::Output { port: i + 1, max_len: 0 }],
            })
            .collect(),
    }
}

fn bench_codec(c: &mut Criterion) {
    let m = sample_match();
    let instructions = sample_instructions();
    let group_mod = sample_group_mod();

    let match_bytes = m.to_bytes().expect("encode match");
    let mut instruction_bytes = Vec::new();
    for i in &instructions {
        i.encode(&mut instruction_bytes).expect("encode instruction");
    }
    let group_bytes = group_mod.to_bytes().expect("encode group mod");

    c.bench_function("encode_match", |b| {
        b.iter(|| black_box(&m).to_bytes().expect("encode"));
    });

    c.bench_function("decode_match", |b| {
        b.iter(|| {
            let mut r = Cursor::new(black_box(&match_bytes[..]));
            Match::decode(&mut r).expect("decode")
        });
    });

    c.bench_function("decode_instruction_list", |b| {
        b.iter(|| {
            let mut r = Cursor::new(black_box(&instruction_bytes[..]));
            Instruction::decode_list(&mut r, UnknownPolicy::Reject).expect("decode")
        });
    });

    c.bench_function("encode_group_mod", |b| {
        b.iter(|| black_box(&group_mod).to_bytes().expect("encode"));
    });

    c.bench_function("decode_group_mod", |b| {
        b.iter(|| {
            let mut r = Cursor::new(black_box(&group_bytes[..]));
            GroupMod::decode(&mut r, UnknownPolicy::Reject).expect("decode")
        });
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
