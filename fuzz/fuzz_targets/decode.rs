#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw_data: &[u8]| {
    let mut data = vec![0x1f, 0x9d, 0x10];
    data.extend_from_slice(raw_data);
    let _ = dotz::decode(&data);
});
