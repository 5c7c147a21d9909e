//! RFC 4648 Base32, the encoding TOTP secrets are exchanged in.

use thiserror::Error;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Every variant means the text is not valid Base32.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Base32Error {
    #[error("invalid base32 character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },
    #[error("invalid base32 length: {0} data characters")]
    InvalidLength(usize),
    #[error("invalid base32 padding")]
    InvalidPadding,
    #[error("empty base32 input")]
    Empty,
}

fn value_of(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a'),
        b'2'..=b'7' => Some(c - b'2' + 26),
        _ => None,
    }
}

/// Decode Base32 text, case-insensitively, with or without `=` padding.
///
/// A trailing partial group must be 2, 4, 5 or 7 characters long (1, 2, 3
/// or 4 bytes). When padding is present it has to fill the last 8-character
/// group exactly. Leftover bits in the last character are ignored.
pub fn decode(input: &str) -> Result<Vec<u8>, Base32Error> {
    let bytes = input.as_bytes();
    let data_len = bytes
        .iter()
        .rposition(|&b| b != b'=')
        .map_or(0, |i| i + 1);
    let padding = bytes.len() - data_len;

    if data_len == 0 {
        return Err(if padding == 0 {
            Base32Error::Empty
        } else {
            Base32Error::InvalidPadding
        });
    }

    let tail = data_len % 8;
    let tail_bytes = match tail {
        0 => 0,
        2 => 1,
        4 => 2,
        5 => 3,
        7 => 4,
        _ => return Err(Base32Error::InvalidLength(data_len)),
    };
    if padding != 0 && (tail == 0 || padding != 8 - tail) {
        return Err(Base32Error::InvalidPadding);
    }

    let mut out = Vec::with_capacity(data_len / 8 * 5 + tail_bytes);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for (position, &b) in bytes[..data_len].iter().enumerate() {
        let value = match value_of(b) {
            Some(v) => v,
            None if b == b'=' => return Err(Base32Error::InvalidPadding),
            None => {
                // все предыдущие байты ASCII, значит position на границе символа
                let ch = input[position..].chars().next().unwrap_or('\u{FFFD}');
                return Err(Base32Error::InvalidCharacter { ch, position });
            }
        };

        buffer = (buffer << 5) | u32::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    Ok(out)
}

/// Encode bytes as padded, upper-case Base32.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);

    for chunk in data.chunks(5) {
        let mut block = [0u8; 5];
        block[..chunk.len()].copy_from_slice(chunk);
        let n = block.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        let chars = (chunk.len() * 8).div_ceil(5);

        for i in 0..8 {
            if i < chars {
                let idx = (n >> (35 - i * 5)) & 0x1F;
                out.push(ALPHABET[idx as usize] as char);
            } else {
                out.push('=');
            }
        }
    }

    out
}
