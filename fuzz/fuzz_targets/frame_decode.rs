//! Fuzz target for length-prefixed frame decoding.
//!
//! Feeds arbitrary byte sequences through the decoder to find:
//! - Parser crashes or panics
//! - Integer overflows in length calculations
//! - Allocations driven by unvalidated declared lengths
//!
//! The decoder should NEVER panic. All invalid inputs must return an
//! error, and oversized declared lengths must be rejected before any
//! payload allocation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use linkseal_proto::decode_frame;

fuzz_target!(|data: &[u8]| {
    let _ = decode_frame(data);
});
