#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Split input into a signed url and a base64 secret
    let mid = data.len() / 2;
    let (left, right) = data.split_at(mid);
    if let (Ok(url), Ok(secret)) = (std::str::from_utf8(left), std::str::from_utf8(right)) {
        let _ = mapsign_sign::verify::verify(url, secret);
    }
});
