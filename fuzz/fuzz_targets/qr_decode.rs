#![no_main]

use libfuzzer_sys::fuzz_target;
use unchained_signer::ser::{decode_qr_data, encode_qr_data};

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode to the same bytes
    if let Ok(qr) = decode_qr_data(data) {
        assert_eq!(encode_qr_data(&qr).ok().as_deref(), Some(data));
    }
});
