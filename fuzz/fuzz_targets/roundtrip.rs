#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let compressed = match dotz::encode(data, 16) {
        Ok(compressed) => compressed,
        // Input beyond what 16 bit codes can describe.
        Err(dotz::LzwError::Capacity { .. }) => return,
        Err(err) => panic!("{}", err),
    };

    let decompressed = dotz::decode(&compressed);
    assert!(decompressed.as_deref() == Ok(data), "{:?}", decompressed.err());
});
