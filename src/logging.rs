use anyhow::anyhow;
use log::LevelFilter;
use simple_logger::SimpleLogger;

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Base level from the config, one step more verbose per `-v`.
pub fn effective_level(base: LevelFilter, verbose: u8) -> LevelFilter {
    let idx = LEVELS.iter().position(|l| *l == base).unwrap_or(2);
    LEVELS[(idx + usize::from(verbose)).min(LEVELS.len() - 1)]
}

pub fn init_logger(config_level: &str, verbose: u8) -> anyhow::Result<()> {
    let base: LevelFilter = config_level
        .parse()
        .map_err(|_| anyhow!("invalid log level '{config_level}' in config"))?;

    SimpleLogger::new()
        .with_level(effective_level(base, verbose))
        .init()
        .map_err(|e| anyhow!("cannot init logger: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(effective_level(LevelFilter::Warn, 0), LevelFilter::Warn);
        assert_eq!(effective_level(LevelFilter::Warn, 1), LevelFilter::Info);
        assert_eq!(effective_level(LevelFilter::Warn, 2), LevelFilter::Debug);
        assert_eq!(effective_level(LevelFilter::Warn, 9), LevelFilter::Trace);
        assert_eq!(effective_level(LevelFilter::Off, 1), LevelFilter::Error);
    }
}
