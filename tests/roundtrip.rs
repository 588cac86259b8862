use dotz::{decode, encode, Decoder, Encoder, LzwError};
use quickcheck_macros::quickcheck;
use std::{env, fs};

#[test]
fn roundtrip_all() {
    let file = env::args().next().unwrap();
    let data = fs::read(file).unwrap();

    for max_bits in 9..=16 {
        // Every code after the first adds an entry, so this much input always fits.
        let fits = (1usize << max_bits) - 257;
        let data = &data[..data.len().min(fits)];
        assert_roundtrips(data, max_bits);
    }
}

#[test]
fn roundtrip_edge_cases() {
    assert_roundtrips(b"", 16);
    assert_roundtrips(b"a", 16);
    assert_roundtrips(b"ab", 9);
    assert_roundtrips(b"aaaaaaaaaa", 16);
    assert_roundtrips(b"TOBEORNOTTOBEORTOBEORNOT", 16);
    assert_roundtrips(&[0xff; 3], 16);
}

#[test]
fn roundtrip_long_run() {
    assert_roundtrips(&vec![b'!'; 1 << 20], 16);
    assert_roundtrips(&vec![0; 30_000], 9);
}

#[test]
fn roundtrip_across_width_changes() {
    // Reaches 12 bit codes unless the maximum caps them earlier.
    let data: Vec<u8> = (0u32..6000).map(|i| (i * 7 + i / 13) as u8).collect();
    for max_bits in 10..=16 {
        assert_roundtrips(&data[..data.len().min((1 << max_bits) - 257)], max_bits);
    }
}

#[test]
fn capacity_is_reported_not_wrapped() {
    let data: Vec<u8> = (0u32..20_000).map(|i| (i * 31 + i / 256) as u8).collect();
    match encode(&data, 9) {
        Err(LzwError::Capacity { max_bits: 9, offset }) => assert!(offset < data.len()),
        other => panic!("expected a capacity error, got {:?}", other.map(|v| v.len())),
    }
}

#[quickcheck]
fn forward_reverse(data: Vec<u8>) -> bool {
    let compressed = encode(&data, 16).unwrap();
    decode(&compressed).unwrap() == data
}

#[quickcheck]
fn forward_reverse_narrow(data: Vec<u8>) -> bool {
    // Short enough for 9 bit codes.
    let data = &data[..data.len().min(255)];
    let compressed = Encoder::new(9).unwrap().encode(data).unwrap();
    Decoder::new().decode(&compressed).unwrap() == data
}

#[quickcheck]
fn codes_roundtrip_without_packing(data: Vec<u8>) -> bool {
    let codes = Encoder::default().encode_codes(&data).unwrap();
    Decoder::new().decode_codes(16, &codes).unwrap() == data
}

fn assert_roundtrips(data: &[u8], max_bits: u8) {
    eprintln!("Roundtrip test {} bytes at {} bits", data.len(), max_bits);
    let encoder = Encoder::new(max_bits).unwrap();
    let compressed = encoder.encode(data).unwrap();
    assert_eq!(&compressed[..3], &[0x1f, 0x9d, max_bits]);

    let result = Decoder::new().decode(&compressed);
    assert!(result.is_ok(), "{}, {:?}", max_bits, result);
    assert!(result.unwrap() == data, "{}", max_bits);
}
