#![no_main]
use libfuzzer_sys::fuzz_target;
use mapsign_core::secret::SigningSecret;

fuzz_target!(|data: &[u8]| {
    let Ok(url) = std::str::from_utf8(data) else {
        return;
    };
    let secret = SigningSecret::from_bytes(b"foobar".to_vec()).unwrap();
    // The signed bytes must be the url's own path and query text.
    if let Ok(signable) = mapsign_sign::canonical::signable_portion(url) {
        assert!(url.ends_with(&signable) || url.ends_with(&signable[1..]));
    }
    // Whatever signs must verify and keep the original url as prefix.
    if let Ok(signed) = mapsign_sign::sign::sign_with(url, &secret) {
        assert!(signed.starts_with(url));
        assert_eq!(mapsign_sign::verify::verify_with(&signed, &secret), Ok(true));
    }
});
