use anyhow::Result;

/// Секрет не должен оставаться на экране, поэтому ввод скрыт.
pub fn prompt_secret_hidden(prompt: &str) -> Result<String> {
    let secret = rpassword::prompt_password(prompt)?;
    Ok(secret)
}
