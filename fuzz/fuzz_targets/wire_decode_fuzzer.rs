//! Fuzz target for wire frame decoding
//!
//! Feeds arbitrary bytes through the frame decoder and the typed inbound and
//! outbound event decoders to find:
//! - Parser crashes or panics
//! - Payloads accepted under the wrong event name
//! - Typed events that do not survive re-encoding
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use huddle_core::{InboundEvent, OutboundEvent, WireEvent};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(wire) = WireEvent::decode_slice(data) else {
        return;
    };

    if let Ok(event) = InboundEvent::from_wire(&wire) {
        assert_eq!(event.name().as_str(), wire.name, "decoded under a different name");
        let again = event.to_wire().expect("decoded event must re-encode");
        assert_eq!(InboundEvent::from_wire(&again).ok(), Some(event));
    }

    if let Ok(event) = OutboundEvent::from_wire(&wire) {
        assert_eq!(event.name().as_str(), wire.name, "decoded under a different name");
        let again = event.to_wire().expect("decoded event must re-encode");
        assert_eq!(OutboundEvent::from_wire(&again).ok(), Some(event));
    }
});
