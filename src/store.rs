use anyhow::Context;
use log::debug;
use serde::Deserialize;
use std::path::Path;
use twofa::{Account, AccountList};

/// Запись в файле: либо объект аккаунта, либо строка otpauth://
#[derive(Deserialize)]
#[serde(untagged)]
enum FileEntry {
    Uri(String),
    Record(Account),
}

/// Прочитать список аккаунтов из JSON-файла (только чтение).
pub fn load_accounts(path: &Path) -> anyhow::Result<AccountList> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read accounts file {}", path.display()))?;
    let entries: Vec<FileEntry> = serde_json::from_str(&data)
        .with_context(|| format!("invalid accounts file {}", path.display()))?;

    let mut accounts = AccountList::new();
    for (i, entry) in entries.into_iter().enumerate() {
        let account = match entry {
            FileEntry::Record(account) => account,
            FileEntry::Uri(uri) => uri
                .parse::<Account>()
                .with_context(|| format!("accounts file entry #{}", i + 1))?,
        };
        accounts
            .insert(account)
            .with_context(|| format!("accounts file entry #{}", i + 1))?;
    }

    debug!("loaded {} accounts from {}", accounts.len(), path.display());
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("twofa-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_records_and_uris() {
        let path = write_temp(
            "accounts.json",
            r#"[
                { "secret": "JBSWY3DPEHPK3PXP", "username": "alice", "display_name": "GitHub" },
                "otpauth://totp/GitLab:bob?secret=GEZDGNBVGY3TQOJQ"
            ]"#,
        );
        let accounts = load_accounts(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let names: Vec<_> = accounts.iter().map(Account::display_name).collect();
        assert_eq!(names, ["GitHub", "GitLab"]);
        assert_eq!(accounts.get("GEZDGNBVGY3TQOJQ").unwrap().username(), "bob");
    }

    #[test]
    fn duplicate_secret_is_an_error() {
        let path = write_temp(
            "dupes.json",
            r#"[
                "otpauth://totp/A:a?secret=JBSWY3DPEHPK3PXP",
                "otpauth://totp/B:b?secret=JBSWY3DPEHPK3PXP"
            ]"#,
        );
        let err = load_accounts(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("entry #2"));
    }

    #[test]
    fn bad_uri_is_an_error() {
        let path = write_temp("bad.json", r#"[ "otpauth://hotp/A:a?secret=JBSWY3DP" ]"#);
        let err = load_accounts(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("only 'totp'"));
    }
}
