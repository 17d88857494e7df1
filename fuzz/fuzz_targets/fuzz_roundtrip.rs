#![no_main]
use libfuzzer_sys::fuzz_target;
use zenpixmap::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 20),
        max_memory_bytes: Some(64 << 20),
        ..Default::default()
    };
    let Ok(source) = DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(&enough::Unstoppable)
    else {
        return;
    };

    // A no-op traversal re-encoded as PNG must decode to the same size
    let output = TraverseRequest::new(&source)
        .traverse(|_| {}, &enough::Unstoppable)
        .expect("no-op traversal cannot fail on a decoded image");
    let png = EncodeRequest::new(OutputFormat::Png)
        .encode(&output, &enough::Unstoppable)
        .expect("PNG encode of a decoded image failed");
    let Ok(again) = DecodeRequest::new(&png).decode(&enough::Unstoppable) else {
        panic!("re-encoded PNG failed to decode");
    };

    assert_eq!(again.bounds(), source.bounds());
});
