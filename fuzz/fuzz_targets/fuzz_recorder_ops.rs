#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rtkeys_core::clock::{Clock, ManualTimeSource};
use rtkeys_core::config::RecorderConfig;
use rtkeys_core::recorder::{KeyQuery, KeyRecorder};

const CODES: [&str; 5] = ["KeyA", "KeyB", "Space", "Numpad1", "Unidentified"];
const NAMES: [&str; 5] = ["a", "b", "space", "num_1", "N/A"];

#[derive(Debug, Arbitrary)]
enum Op {
    Down(u8),
    Up(u8),
    Advance(u8),
    Query { keys: u8, wait_release: bool, clear: bool },
    Start,
    Stop,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let capacity = usize::from(input.capacity).max(1);
    let time = Rc::new(ManualTimeSource::new(0.0));
    let clock = Rc::new(Clock::with_source(time.clone()));
    let Ok(mut kb) =
        KeyRecorder::with_clock(RecorderConfig::default().with_buffer_size(capacity), clock)
    else {
        return;
    };

    for op in &input.ops {
        match *op {
            Op::Down(k) => kb.on_key_down(CODES[usize::from(k) % CODES.len()]),
            Op::Up(k) => kb.on_key_up(CODES[usize::from(k) % CODES.len()]),
            Op::Advance(ms) => time.advance(f64::from(ms) / 1000.0),
            Op::Query { keys, wait_release, clear } => {
                // Low bits pick which names are in the filter.
                let names = NAMES
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| keys & (1 << i) != 0)
                    .map(|(_, n)| *n);
                let query = KeyQuery::new()
                    .keys(names)
                    .wait_release(wait_release)
                    .clear(clear);
                for press in kb.get_keys(&query) {
                    assert!(query.accepts(&press.name));
                    if let Some(d) = press.duration {
                        assert!(d >= 0.0);
                    }
                }
            }
            Op::Start => kb.start(),
            Op::Stop => kb.stop(),
            Op::Clear => kb.clear_events(),
        }
        assert!(kb.get_events().len() <= capacity);
    }
});
