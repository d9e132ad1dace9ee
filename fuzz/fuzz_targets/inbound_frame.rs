#![no_main]

use libfuzzer_sys::fuzz_target;
use unchained_signer::frame::{parse_inbound, OpcodeTable};

fuzz_target!(|data: &[u8]| {
    let _ = parse_inbound(&OpcodeTable::V6, data);
    let _ = parse_inbound(&OpcodeTable::V10, data);
});
