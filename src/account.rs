use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::otp::{self, Totp, TotpError};
use crate::uri::{self, UriError};

/// One enrolled TOTP credential. The secret is its identity.
///
/// Fields are fixed at construction. The secret is not validated here; an
/// invalid one only shows up as [`TotpError::InvalidSecret`] when a code is
/// generated.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    secret: String,
    username: String,
    display_name: String,
}

impl Account {
    pub fn new(
        secret: impl Into<String>,
        username: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            username: username.into(),
            display_name: display_name.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Code for this account at `time`.
    pub fn generate(&self, time: f64, period: NonZeroU64) -> Result<Totp, TotpError> {
        otp::generate(time, &self.secret, period)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("secret", &"<redacted>")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl FromStr for Account {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uri::parse(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("an account with the same secret already exists ('{0}')")]
    DuplicateSecret(String),
}

/// Accounts in insertion order, at most one per secret.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct AccountList {
    accounts: Vec<Account>,
}

impl AccountList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account. Fails if its secret is already taken; secrets are
    /// compared exactly as stored.
    pub fn insert(&mut self, account: Account) -> Result<(), AccountError> {
        if let Some(existing) = self.get(account.secret()) {
            return Err(AccountError::DuplicateSecret(
                existing.display_name().to_string(),
            ));
        }
        self.accounts.push(account);
        Ok(())
    }

    pub fn remove(&mut self, secret: &str) -> Option<Account> {
        let idx = self.accounts.iter().position(|a| a.secret() == secret)?;
        Some(self.accounts.remove(idx))
    }

    pub fn get(&self, secret: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.secret() == secret)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl TryFrom<Vec<Account>> for AccountList {
    type Error = AccountError;

    fn try_from(accounts: Vec<Account>) -> Result<Self, Self::Error> {
        let mut list = AccountList::new();
        for account in accounts {
            list.insert(account)?;
        }
        Ok(list)
    }
}

impl<'a> IntoIterator for &'a AccountList {
    type Item = &'a Account;
    type IntoIter = std::slice::Iter<'a, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
