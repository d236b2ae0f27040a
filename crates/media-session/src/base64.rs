//! Standard-alphabet base64 encoding of artwork bytes.
//!
//! Only encoding is needed: image bytes go out across the boundary as
//! text, nothing ever comes back in. Total function, cannot fail.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Encode `data` as base64 with `=` padding. Output length is always
/// `4 * ceil(n / 3)`; empty input yields an empty string.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);

        let symbols = [
            b0 >> 2,
            (b0 & 0x03) << 4 | b1 >> 4,
            (b1 & 0x0f) << 2 | b2 >> 6,
            b2 & 0x3f,
        ];

        // A partial chunk of n bytes carries data in the first n + 1
        // symbols; the rest is padding.
        let carried = chunk.len() + 1;
        for &symbol in &symbols[..carried] {
            out.push(ALPHABET[symbol as usize] as char);
        }
        for _ in carried..4 {
            out.push('=');
        }
    }

    out
}
