mod config;
mod logging;
mod prompt;
mod store;

use crate::config::{Config, config_path, save_config};
use crate::prompt::prompt_secret_hidden;
use crate::store::load_accounts;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use std::io::Write;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use twofa::{Account, countdown};

const BAR_WIDTH: usize = 30;
const ERROR_CODE: &str = "------";

#[derive(Parser, Debug)]
#[command(name = "twofa", version, about = "TOTP two-factor code generator")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the current code
    ///
    /// Примеры:
    ///   twofa code JBSWY3DPEHPK3PXP
    ///   twofa code 'otpauth://totp/GitHub:alice?secret=JBSWY3DPEHPK3PXP'
    ///   twofa code            (secret is asked for)
    Code {
        /// Base32 secret or otpauth:// URI
        input: Option<String>,
        /// Unix time to generate the code for (default: now)
        #[arg(long)]
        time: Option<f64>,
        /// Period in seconds (default: from config, 30)
        #[arg(long)]
        period: Option<NonZeroU64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse an otpauth:// URI and show the account
    Parse {
        uri: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the code and a countdown, refreshed every second
    Watch {
        /// Base32 secret or otpauth:// URI
        input: Option<String>,
        /// Period in seconds (default: from config, 30)
        #[arg(long)]
        period: Option<NonZeroU64>,
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Show codes for every account in an accounts file
    ///
    /// The file is a JSON array of {secret, username, display_name}
    /// objects and/or otpauth:// strings.
    List {
        /// Accounts file (default: accounts_file from config)
        #[arg(long)]
        accounts: Option<PathBuf>,
        /// Unix time to generate codes for (default: now)
        #[arg(long)]
        time: Option<f64>,
    },

    /// Show configuration
    Config {
        /// Write the default config file if there is none
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logging::init_logger(&config.log_level, cli.verbose)?;

    match cli.command {
        Commands::Code {
            input,
            time,
            period,
            json,
        } => cmd_code(&config, input, time, period, json)?,
        Commands::Parse { uri, json } => cmd_parse(&uri, json)?,
        Commands::Watch {
            input,
            period,
            ticks,
        } => cmd_watch(&config, input, period, ticks)?,
        Commands::List { accounts, time } => cmd_list(&config, accounts, time)?,
        Commands::Config { init } => cmd_config(&config, init)?,
    }

    Ok(())
}

fn now_unix() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9
}

fn format_timestamp(t: f64) -> anyhow::Result<String> {
    let dt = OffsetDateTime::from_unix_timestamp(t.floor() as i64)?;
    Ok(dt.format(&Rfc3339)?)
}

/// Разобрать то, что ввёл пользователь:
/// - otpauth:// (или любой другой URI) → парсим как provisioning URI
/// - иначе считаем base32 секретом, пробелы выкидываем ("JBSW Y3DP ...")
fn resolve_account(input: Option<String>) -> anyhow::Result<Account> {
    let raw = match input {
        Some(s) => s,
        None => prompt_secret_hidden("Secret (base32) or otpauth:// URI: ")?,
    };
    let raw = raw.trim();

    if raw.is_empty() {
        bail!("secret cannot be empty");
    }

    if raw.contains("://") {
        let account = raw.parse::<Account>()?;
        debug!("using account {account:?}");
        return Ok(account);
    }

    let secret: String = raw.split_whitespace().collect();
    Ok(Account::new(secret, "", ""))
}

fn resolve_period(config: &Config, period: Option<NonZeroU64>) -> anyhow::Result<NonZeroU64> {
    match period {
        Some(p) => Ok(p),
        None => config.period(),
    }
}

fn cmd_code(
    config: &Config,
    input: Option<String>,
    time: Option<f64>,
    period: Option<NonZeroU64>,
    json: bool,
) -> anyhow::Result<()> {
    let account = resolve_account(input)?;
    let period = resolve_period(config, period)?;
    let time = time.unwrap_or_else(now_unix);

    let totp = account
        .generate(time, period)
        .context("cannot generate code")?;
    let left = countdown::seconds_remaining(time, period);

    if json {
        let out = serde_json::json!({
            "code": totp.code(),
            "password": totp.password,
            "generated_at": format_timestamp(totp.generated_at)?,
            "period": period.get(),
            "seconds_remaining": left,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    // код в stdout, чтобы его можно было пайпить
    println!("{totp}");
    eprintln!("valid for {left}s");
    Ok(())
}

fn cmd_parse(uri: &str, json: bool) -> anyhow::Result<()> {
    let account = uri.parse::<Account>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
        return Ok(());
    }

    println!("Issuer:   {}", account.display_name());
    println!("Username: {}", account.username());
    println!("Secret:   {}", account.secret());
    if twofa::base32::decode(account.secret()).is_err() {
        println!("Warning:  secret is not valid base32, no codes can be generated");
    }

    Ok(())
}

fn progress_bar(now: f64, period: NonZeroU64) -> String {
    let filled = (countdown::progress(now, period) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

fn cmd_watch(
    config: &Config,
    input: Option<String>,
    period: Option<NonZeroU64>,
    ticks: Option<u64>,
) -> anyhow::Result<()> {
    let account = resolve_account(input)?;
    let period = resolve_period(config, period)?;
    let mut stdout = std::io::stdout();
    let mut tick = 0u64;

    loop {
        let now = now_unix();
        let left = countdown::seconds_remaining(now, period);

        // ошибка не фатальна: показываем заглушку, на следующем тике пробуем снова
        let code = match account.generate(now, period) {
            Ok(totp) => totp.code(),
            Err(e) => {
                debug!("tick {tick}: {e}");
                ERROR_CODE.to_string()
            }
        };

        write!(stdout, "\r{code} {} {left:>3}s ", progress_bar(now, period))?;
        stdout.flush()?;

        tick += 1;
        if ticks.is_some_and(|n| tick >= n) {
            break;
        }
        std::thread::sleep(Duration::from_secs(1));
    }

    writeln!(stdout)?;
    Ok(())
}

fn cmd_list(config: &Config, accounts: Option<PathBuf>, time: Option<f64>) -> anyhow::Result<()> {
    let path = match accounts.or_else(|| config.accounts_file.clone()) {
        Some(p) => p,
        None => bail!("no accounts file given and none configured (see `twofa config`)"),
    };

    let accounts = load_accounts(&path)?;
    if accounts.is_empty() {
        println!("No accounts.");
        return Ok(());
    }

    let period = config.period()?;
    let time = time.unwrap_or_else(now_unix);
    let left = countdown::seconds_remaining(time, period);

    for account in &accounts {
        let code = match account.generate(time, period) {
            Ok(totp) => totp.code(),
            Err(e) => {
                warn!("{}: {e}", account.display_name());
                format!("{ERROR_CODE} (invalid secret)")
            }
        };
        println!(
            "{:<20} {:<30} {}",
            account.display_name(),
            account.username(),
            code
        );
    }
    println!("{left}s remaining");

    Ok(())
}

fn cmd_config(config: &Config, init: bool) -> anyhow::Result<()> {
    let path = config_path()?;

    if init {
        if path.exists() {
            println!("Config already exists at: {}", path.display());
        } else {
            save_config(config, &path)?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    println!("Config:     {}", path.display());
    println!("Period:     {}s", config.period);
    match config.accounts_file {
        Some(ref p) => println!("Accounts:   {}", p.display()),
        None => println!("Accounts:   not set"),
    }
    println!(
        "Biometrics: {}",
        if config.biometrics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("Log level:  {}", config.log_level);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_secret_with_spaces() {
        let account = resolve_account(Some(" jbsw y3dp ehpk 3pxp ".to_string())).unwrap();
        assert_eq!(account.secret(), "jbswy3dpehpk3pxp");
        assert_eq!(account.display_name(), "");
    }

    #[test]
    fn uri_input() {
        let account = resolve_account(Some(
            "otpauth://totp/GitHub:alice?secret=JBSWY3DPEHPK3PXP".to_string(),
        ))
        .unwrap();
        assert_eq!(account.display_name(), "GitHub");
    }

    #[test]
    fn non_otpauth_uri_is_rejected() {
        assert!(resolve_account(Some("https://example.com".to_string())).is_err());
        assert!(resolve_account(Some("   ".to_string())).is_err());
    }

    #[test]
    fn bar_fills_with_remaining_time() {
        let period = twofa::DEFAULT_PERIOD;
        assert_eq!(progress_bar(30.0, period), format!("[{}]", "#".repeat(30)));
        assert_eq!(
            progress_bar(45.0, period),
            format!("[{}{}]", "#".repeat(15), " ".repeat(15))
        );
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from(["twofa", "-vv", "code", "JBSWY3DP", "--time", "59", "--period", "30"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(Cli::try_parse_from(["twofa", "code", "X", "--period", "0"]).is_err());
    }

    #[test]
    fn timestamp_format() {
        assert_eq!(format_timestamp(59.7).unwrap(), "1970-01-01T00:00:59Z");
    }
}
