mod checksum;
mod cli;
mod descriptor;
mod patch;
mod patch_files;
mod prompt;
mod repo;
mod util;

use anyhow::ensure;
use cli::Cli;
use prompt::TerminalPrompter;
use repo::{Roots, build_repository};
use std::fmt as stdfmt;
use std::io::{IsTerminal, stderr};
use std::process::ExitCode;
use tracing::{Event, Level, Subscriber, error, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use util::human_size::format_size;

/// Exit code for any failure (I/O errors, bad descriptors, closed stdin).
fn failure_exit_code() -> ExitCode {
    ExitCode::from(255)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            failure_exit_code()
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    ensure!(
        cli.from.is_dir(),
        "Source directory {} does not exist",
        cli.from.display()
    );

    let roots = Roots::new(cli.from, cli.to);
    info!(
        "Updating repository {} -> {}{}",
        roots.source.display(),
        roots.dest.display(),
        if roots.same { " (in place)" } else { "" }
    );

    let stdin = std::io::stdin();
    let mut prompter = TerminalPrompter::new(stdin.lock(), std::io::stdout());
    let mut out = std::io::stdout();

    let summary = build_repository(&roots, &mut prompter, &mut out)?;

    info!(
        "{} patches, {} files, {} total",
        summary.patches,
        summary.files,
        format_size(summary.total_size)
    );
    println!("Done.");

    Ok(())
}

/// Explicit `-v` flags win over `RUST_LOG`; without them `RUST_LOG` applies,
/// falling back to warnings only.
fn log_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    }
}

fn init_tracing(verbose: u8) {
    let formatter = LevelPrefixFormatter {
        color: stderr().is_terminal(),
    };

    let fmt_layer = tracing_fmt::layer()
        .event_format(formatter)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(log_filter(verbose))
        .with(fmt_layer)
        .init();
}

/// Writes `<level>: <message>` lines, with the prefix colored when stderr is
/// a terminal.
struct LevelPrefixFormatter {
    color: bool,
}

impl LevelPrefixFormatter {
    fn prefix(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::ERROR => ("error", "\x1b[1;31m"),
            Level::WARN => ("warning", "\x1b[1;33m"),
            Level::INFO => ("info", "\x1b[1;32m"),
            Level::DEBUG => ("debug", "\x1b[1;34m"),
            Level::TRACE => ("trace", "\x1b[1;35m"),
        }
    }
}

impl<S, N> FormatEvent<S, N> for LevelPrefixFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let (label, ansi) = Self::prefix(*event.metadata().level());
        if self.color {
            write!(writer, "{ansi}{label}:\x1b[0m ")?;
        } else {
            write!(writer, "{label}: ")?;
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_use_lowercase_level_names() {
        assert_eq!(LevelPrefixFormatter::prefix(Level::ERROR).0, "error");
        assert_eq!(LevelPrefixFormatter::prefix(Level::WARN).0, "warning");
        assert_eq!(LevelPrefixFormatter::prefix(Level::DEBUG).0, "debug");
    }

    #[test]
    fn verbose_flag_selects_level() {
        assert_eq!(log_filter(1).to_string(), "info");
        assert_eq!(log_filter(2).to_string(), "debug");
        assert_eq!(log_filter(5).to_string(), "debug");
    }
}
