//! Console logging setup via `log` + `log4rs`.

use log::{LevelFilter, SetLoggerError};
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

/// Initialize a stderr logger at the given level.
///
/// Log output goes to stderr so the benchmark report on stdout stays clean
/// (and machine-parseable when JSON output is requested).
pub fn init(log_level: LevelFilter) -> Result<(), SetLoggerError> {
    const LOGGING_PATTERN: &str = "{d} {l} {f}:{L} - {m}\n";

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(log_level))
        .unwrap();

    log4rs::init_config(config)?;
    Ok(())
}
