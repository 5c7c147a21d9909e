//! HOTP (RFC 4226) and TOTP (RFC 6238) with HMAC-SHA1 and 6 digits.

use std::fmt;
use std::num::NonZeroU64;

use hmac::{Hmac, Mac};
use log::debug;
use serde::Serialize;
use sha1::Sha1;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::base32::{self, Base32Error};

type HmacSha1 = Hmac<Sha1>;

const DIGEST_LEN: usize = 20;
const MODULUS: u32 = 1_000_000;

// Смещение маскируется до 0..=15, чтение 4 байт всегда внутри дайджеста.
const _: () = assert!(0x0F + 4 <= DIGEST_LEN);

/// Standard TOTP period, in seconds.
pub const DEFAULT_PERIOD: NonZeroU64 = match NonZeroU64::new(30) {
    Some(p) => p,
    None => panic!("period must be non-zero"),
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TotpError {
    /// The secret is not valid Base32.
    #[error("invalid TOTP secret: {0}")]
    InvalidSecret(#[from] Base32Error),
}

/// One generated code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totp {
    /// Between 0 and 999999; display it zero-padded, see [`Totp::code`].
    pub password: u32,
    /// Unix time in seconds the code was generated for.
    pub generated_at: f64,
}

impl Totp {
    /// The password as a 6-digit string, e.g. `42` becomes `"000042"`.
    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Totp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.password)
    }
}

/// Number of whole periods since the Unix epoch. Negative and NaN times map
/// to step 0.
pub fn time_step(time: f64, period: NonZeroU64) -> u64 {
    (time / period.get() as f64).floor() as u64
}

/// RFC 4226 HOTP value for `counter`, 6 digits.
pub fn hotp(key: &[u8], counter: u64) -> u32 {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(&counter.to_be_bytes());

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    truncate(&digest)
}

/// Dynamic truncation, RFC 4226 §5.3.
fn truncate(digest: &[u8; DIGEST_LEN]) -> u32 {
    let offset = usize::from(digest[DIGEST_LEN - 1] & 0x0F);
    let word = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    (word & 0x7FFF_FFFF) % MODULUS
}

/// Generate the TOTP for `time` (Unix seconds) from a Base32 `secret`.
///
/// The secret is decoded on every call and the key bytes are wiped before
/// returning. A secret that does not decode fails with
/// [`TotpError::InvalidSecret`] and no HMAC is computed.
pub fn generate(time: f64, secret: &str, period: NonZeroU64) -> Result<Totp, TotpError> {
    let counter = time_step(time, period);
    let key = Zeroizing::new(base32::decode(secret)?);
    let password = hotp(&key, counter);
    debug!("generated code for time step {counter} (period {period}s)");

    Ok(Totp {
        password,
        generated_at: time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn rfc4226_hotp_vectors() {
        let expected = [
            755224, 287082, 359152, 969429, 338314, 254676, 287922, 162583, 399871, 520489,
        ];
        for (counter, code) in expected.into_iter().enumerate() {
            assert_eq!(hotp(b"12345678901234567890", counter as u64), code);
        }
    }

    #[test]
    fn rfc4226_truncation_example() {
        let digest = [
            0x1f, 0x86, 0x98, 0x69, 0x0e, 0x02, 0xca, 0x16, 0x61, 0x85, 0x50, 0xef, 0x7f, 0x19,
            0xda, 0x8e, 0x94, 0x5b, 0x55, 0x5a,
        ];
        assert_eq!(truncate(&digest), 872921);
    }

    #[test]
    fn truncation_at_largest_offset() {
        let mut digest = [0u8; DIGEST_LEN];
        digest[15..].copy_from_slice(&[0xff, 0xff, 0xff, 0xff, 0x0f]);
        // 0x7fffffff = 2147483647
        assert_eq!(truncate(&digest), 483647);
    }

    #[test]
    fn rfc6238_sha1_vectors() {
        let cases = [
            (59.0, "287082"),
            (1111111109.0, "081804"),
            (1111111111.0, "050471"),
            (1234567890.0, "005924"),
            (2000000000.0, "279037"),
            (20000000000.0, "353130"),
        ];
        for (time, code) in cases {
            let totp = generate(time, RFC_SECRET, DEFAULT_PERIOD).unwrap();
            assert_eq!(totp.code(), code, "time {time}");
            assert_eq!(totp.generated_at, time);
        }
    }

    #[test]
    fn lower_case_secret_gives_same_code() {
        let upper = generate(59.0, RFC_SECRET, DEFAULT_PERIOD).unwrap();
        let lower = generate(59.0, &RFC_SECRET.to_lowercase(), DEFAULT_PERIOD).unwrap();
        assert_eq!(upper.password, lower.password);
    }

    #[test]
    fn same_step_same_password() {
        let a = generate(1111111080.0, RFC_SECRET, DEFAULT_PERIOD).unwrap();
        let b = generate(1111111109.9, RFC_SECRET, DEFAULT_PERIOD).unwrap();
        assert_eq!(a.password, b.password);
        assert_ne!(a.generated_at, b.generated_at);
    }

    #[test]
    fn time_step_floors() {
        assert_eq!(time_step(59.0, DEFAULT_PERIOD), 1);
        assert_eq!(time_step(60.0, DEFAULT_PERIOD), 2);
        assert_eq!(time_step(89.999, DEFAULT_PERIOD), 2);
        assert_eq!(time_step(-5.0, DEFAULT_PERIOD), 0);
        assert_eq!(time_step(f64::NAN, DEFAULT_PERIOD), 0);
        assert_eq!(time_step(120.0, NonZeroU64::new(60).unwrap()), 2);
    }

    #[test]
    fn invalid_secret() {
        let err = generate(59.0, "NOT-BASE", DEFAULT_PERIOD).unwrap_err();
        assert!(matches!(
            err,
            TotpError::InvalidSecret(Base32Error::InvalidCharacter { .. })
        ));
        assert_eq!(
            generate(59.0, "", DEFAULT_PERIOD).unwrap_err(),
            TotpError::InvalidSecret(Base32Error::Empty)
        );
    }

    #[test]
    fn zero_padded_display() {
        let totp = Totp {
            password: 42,
            generated_at: 0.0,
        };
        assert_eq!(totp.to_string(), "000042");
        assert_eq!(totp.code(), "000042");
    }
}
