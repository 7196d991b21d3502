//! Attempt access code generation and normalization

use rand::Rng;

/// Unambiguous uppercase alphabet (no `0 O 1 I L`)
pub const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const ACCESS_CODE_LENGTH: usize = 8;

lazy_static::lazy_static! {
    pub static ref ACCESS_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-HJKMNP-Z2-9]{8}$").unwrap();
}

/// Generate a fresh code from the thread-local CSPRNG
pub fn generate_access_code() -> String {
    generate_access_code_with(&mut rand::thread_rng())
}

pub fn generate_access_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ACCESS_CODE_LENGTH)
        .map(|_| ACCESS_CODE_ALPHABET[rng.gen_range(0..ACCESS_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Trim and uppercase user input. Returns `None` when the result is not a
/// well-formed code.
pub fn normalize_access_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    ACCESS_CODE_REGEX.is_match(&code).then_some(code)
}
