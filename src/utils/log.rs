use std::io::Write;

use chrono::Local;
use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter};

/// Installs the process-wide logger.
///
/// Levels are coloured the way the lab's console output always was: green for
/// loaded data, yellow for warnings, red for failures. `RUST_LOG` overrides the
/// level chosen here. Calling this more than once is harmless.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                Local::now().format("%H:%M:%S%.3f"),
                colored_level(record.level()),
                record.args()
            )
        })
        .try_init();
}

fn colored_level(level: Level) -> ColoredString {
    let label = format!("{:<5}", level);
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.normal(),
        Level::Trace => label.dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        init_logging(false);
        init_logging(true);
        log::info!("logger ready");
    }

    #[test]
    fn level_labels_are_padded() {
        colored::control::set_override(false);
        assert_eq!(colored_level(Level::Info).to_string(), "INFO ");
        assert_eq!(colored_level(Level::Error).to_string(), "ERROR");
        colored::control::unset_override();
    }
}
