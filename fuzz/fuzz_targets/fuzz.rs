#![no_main]

use libfuzzer_sys::fuzz_target;
use smartfile::{BlockSize, decode, encode};

/// Arbitrary bytes fed to the decoder must produce `Ok` or `Err`, never a
/// panic or an unbounded allocation.
fn verify_decode_robustness(data: &[u8]) {
    let mut output = Vec::new();
    let _ = decode(data, &mut output);
}

/// `decode(encode(data, b)) == data` for a block size derived from the input.
///
/// # Panics
/// On any mismatch, or if the decoder rejects encoder output.
fn verify_round_trip(data: &[u8]) {
    let block_size = BlockSize::new(usize::from(data.first().copied().unwrap_or(1)).max(1))
        .expect("block size is non-zero");

    let mut encoded = Vec::new();
    encode(data, block_size, &mut encoded).expect("encoding failed");

    let mut decoded = Vec::new();
    match decode(&encoded, &mut decoded) {
        Ok(_) => {
            if decoded != data {
                panic!(
                    "Round-trip mismatch!\nInput len: {}\nEncoded len: {}\nDecoded len: {}",
                    data.len(),
                    encoded.len(),
                    decoded.len()
                );
            }
        }
        Err(e) => {
            panic!(
                "Round-trip failed! Decoder rejected valid encoded data.\nError: {:?}\nInput len: {}",
                e,
                data.len()
            );
        }
    }
}

fuzz_target!(|data: &[u8]| {
    verify_decode_robustness(data);
    verify_round_trip(data);
});
