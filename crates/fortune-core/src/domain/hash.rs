//! The challenge hash shared by the client and the authorization service.
//!
//! ```text
//! value  = nonce + secret                  (two's-complement, wrapping)
//! bytes  = zig-zag varint(value)           (1..=10 bytes)
//! hash   = lowercase hex(MD5(bytes))       (32 chars)
//! ```
//!
//! Both sides must agree on every byte fed into the digest, so the varint
//! layout here is fixed: zig-zag maps signed to unsigned (`0→0, -1→1, 1→2,
//! -2→3, …`), then the result is written 7 bits at a time, least significant
//! group first, with `0x80` set on every byte except the last.

/// Longest possible encoding of an `i64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Encodes `value` as a zig-zag signed varint.
///
/// # Examples
///
/// ```rust
/// use fortune_core::encode_varint;
///
/// assert_eq!(encode_varint(0), [0x00]);
/// assert_eq!(encode_varint(-1), [0x01]);
/// assert_eq!(encode_varint(64), [0x80, 0x01]);
/// ```
pub fn encode_varint(value: i64) -> Vec<u8> {
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    while zigzag >= 0x80 {
        out.push((zigzag as u8) | 0x80);
        zigzag >>= 7;
    }
    out.push(zigzag as u8);
    out
}

/// Computes the hash a client must send in reply to `nonce`.
pub fn challenge_hash(nonce: i64, secret: i64) -> String {
    let digest = md5::compute(encode_varint(nonce.wrapping_add(secret)));
    hex::encode(digest.0)
}

/// Returns `true` when `supplied` is exactly the expected hash for
/// `(nonce, secret)`.  Comparison is byte-for-byte, so upper-case hex is a
/// mismatch.
pub fn verify_challenge(nonce: i64, secret: i64, supplied: &str) -> bool {
    challenge_hash(nonce, secret) == supplied
}

// ── Tests ─────────────────────────────────────────────────────────────────────
