//! Printable-ASCII encoding of word arrays, for text-only key/value stores.
//!
//! Each word becomes a digit `'0'..='5'` giving how many base-94 digits
//! follow, then those digits least-significant first, each as a character
//! in `'!'..='~'`. Zero is the single character `'0'`.

const FIRST_CHAR: u8 = b'!';
const LAST_CHAR: u8 = b'~';
const RADIX: u64 = (LAST_CHAR - FIRST_CHAR + 1) as u64;

/// Largest digit count a 32-bit word can need (94^5 > 2^32).
const MAX_DIGITS: u32 = 5;

pub fn encode_words(words: &[u32]) -> String {
    let mut out = String::with_capacity(words.len() * 3);
    let mut digits = Vec::with_capacity(MAX_DIGITS as usize);
    for &word in words {
        digits.clear();
        let mut n = word as u64;
        while n > 0 {
            digits.push(FIRST_CHAR + (n % RADIX) as u8);
            n /= RADIX;
        }
        out.push(char::from(b'0' + digits.len() as u8));
        out.extend(digits.iter().map(|d| char::from(*d)));
    }
    out
}

/// Decode an encoded string. Decoding stops at the first malformed word and
/// returns everything decoded before it.
pub fn decode_words(encoded: &str) -> Vec<u32> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let count = match bytes[i] {
            c @ b'0'..=b'5' => (c - b'0') as usize,
            _ => break,
        };
        let Some(digits) = bytes.get(i + 1..i + 1 + count) else {
            break;
        };
        let mut n: u64 = 0;
        let mut ok = true;
        for &d in digits.iter().rev() {
            if !(FIRST_CHAR..=LAST_CHAR).contains(&d) {
                ok = false;
                break;
            }
            n = n * RADIX + (d - FIRST_CHAR) as u64;
        }
        match u32::try_from(n) {
            Ok(word) if ok => out.push(word),
            _ => break,
        }
        i += 1 + count;
    }
    out
}
