//! Decode fuzz target: feed arbitrary bytes to the record decoders.
//! Decoding must not panic; it should return Ok(value) or Err(WireError).
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use ofwire::{Hello, Instruction, Match, UnknownPolicy};
    use std::io::Cursor;

    let _ = Match::decode(&mut Cursor::new(data));
    let _ = Instruction::decode_list(&mut Cursor::new(data), UnknownPolicy::Reject);
    let _ = Instruction::decode_list(&mut Cursor::new(data), UnknownPolicy::Keep);
    let _ = Hello::decode(&mut Cursor::new(data));
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
