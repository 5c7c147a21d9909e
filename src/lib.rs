//! Time-based one-time passwords (RFC 6238) and `otpauth://` provisioning
//! URIs.
//!
//! ```
//! use twofa::{Account, DEFAULT_PERIOD, countdown};
//!
//! let account: Account = "otpauth://totp/GitHub:alice@example.com?secret=JBSWY3DPEHPK3PXP"
//!     .parse()
//!     .unwrap();
//! let totp = account.generate(1_700_000_000.0, DEFAULT_PERIOD).unwrap();
//! assert_eq!(totp.code().len(), 6);
//! assert_eq!(countdown::seconds_remaining(1_700_000_000.0, DEFAULT_PERIOD), 10);
//! ```

pub mod account;
pub mod base32;
pub mod countdown;
pub mod otp;
pub mod uri;

pub use account::{Account, AccountError, AccountList};
pub use base32::Base32Error;
pub use otp::{DEFAULT_PERIOD, Totp, TotpError, generate};
pub use uri::UriError;
