//! Fuzz target: `LineDecoder::push`
//!
//! Splits arbitrary bytes at a fuzzer-chosen point, feeds both halves and
//! checks that every yielded line is bounded, single-line and that the
//! command path accepts it without panicking.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermolink::fsm::{apply_command, OperatingMode};
use thermolink::link::codec::{decode_command, LineDecoder, MAX_LINE_LEN};

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());

    let mut decoder = LineDecoder::new();
    decoder.push(&rest[..split]);
    decoder.push(&rest[split..]);

    let mut mode = OperatingMode::Idle;
    while let Some(line) = decoder.next_line() {
        assert!(line.len() <= MAX_LINE_LEN);
        assert!(!line.contains('\n'));
        mode = apply_command(mode, decode_command(&line));
    }

    // After a reset nothing is left over.
    decoder.reset();
    assert!(!decoder.has_line());
});
