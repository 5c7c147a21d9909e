//! `otpauth://totp/Issuer:Username?secret=...` provisioning URIs, as found in
//! enrollment QR codes.

use log::debug;
use thiserror::Error;
use url::Url;

use crate::account::Account;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("malformed URI: {0}")]
    MalformedUri(#[from] url::ParseError),
    #[error("unsupported URI scheme '{0}', expected 'otpauth'")]
    UnsupportedScheme(String),
    #[error("unsupported OTP type '{0}', only 'totp' is supported")]
    UnsupportedType(String),
    #[error("label must have the form Issuer:Username")]
    MalformedPath,
    #[error("URI has no 'secret' parameter")]
    MissingSecret,
}

/// Parse a provisioning URI into an [`Account`].
///
/// The label is split at its first `:` into display name and username, both
/// percent-decoded. Query parameters other than `secret` are ignored, and the
/// secret is kept exactly as given; it is only checked when a code is
/// generated.
pub fn parse(input: &str) -> Result<Account, UriError> {
    let url = Url::parse(input)?;

    if url.scheme() != "otpauth" {
        return Err(UriError::UnsupportedScheme(url.scheme().to_string()));
    }

    let kind = url.host_str().unwrap_or_default();
    if !kind.eq_ignore_ascii_case("totp") {
        return Err(UriError::UnsupportedType(kind.to_string()));
    }

    let label = url.path().strip_prefix('/').unwrap_or(url.path());
    let label = urlencoding::decode(label).map_err(|_| UriError::MalformedPath)?;
    let (display_name, username) = label.split_once(':').ok_or(UriError::MalformedPath)?;
    // "Example: alice" тоже допустимо
    let username = username.trim_start();

    let secret = url
        .query_pairs()
        .find(|(k, _)| k == "secret")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .ok_or(UriError::MissingSecret)?;

    debug!("parsed provisioning URI for '{display_name}'");
    Ok(Account::new(secret, username, display_name))
}
