#![no_main]
use libfuzzer_sys::fuzz_target;
use zenpixmap::{DecodeRequest, Limits};

fuzz_target!(|data: &[u8]| {
    // Sniff + decode must never panic, whatever the bytes claim to be
    let limits = Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(64 << 20),
        ..Default::default()
    };
    let _ = DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(&enough::Unstoppable);
});
