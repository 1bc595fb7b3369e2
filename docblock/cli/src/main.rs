//! Adds doc comments to undocumented PHP methods.
//!
//! Walks a directory (by default `src/Controller`), and for every method
//! without a leading comment inserts a block built from its signature.
//! Everything else in the file is left byte-for-byte intact.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;
use docblock_lib::config::{DEFAULT_EXTENSION, DEFAULT_ROOT};
use docblock_lib::{DefaultStyle, DocBlockConfig, FileEvent, FileReport, WriteMode};
use similar::TextDiff;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "docblock",
    version,
    about = "Synthesize doc comments for undocumented PHP methods"
)]
struct Cli {
    /// Directory to scan recursively
    #[arg(value_name = "ROOT", default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// File extension to match (case-insensitive)
    #[arg(long, short = 'e', value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// How to show default values that are not constants or literals
    #[arg(long, value_enum, default_value_t = DefaultsArg::Verbatim)]
    defaults: DefaultsArg,

    /// Print a unified diff instead of rewriting files
    #[arg(long)]
    diff: bool,

    /// Print a JSON summary of the run
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DefaultsArg {
    /// Re-emit the expression's source text
    Verbatim,
    /// Emit only the expression's syntactic category
    Category,
}

impl From<DefaultsArg> for DefaultStyle {
    fn from(value: DefaultsArg) -> Self {
        match value {
            DefaultsArg::Verbatim => Self::Verbatim,
            DefaultsArg::Category => Self::Category,
        }
    }
}

impl Cli {
    fn config(&self) -> DocBlockConfig {
        let write_mode = if self.diff {
            WriteMode::Diff
        } else {
            WriteMode::InPlace
        };

        DocBlockConfig::default()
            .with_root(&self.root)
            .with_extension(&self.extension)
            .with_default_style(self.defaults.into())
            .with_write_mode(write_mode)
    }
}

/// Initializes tracing based on verbosity level.
///
/// Logging goes to stderr so stdout stays reserved for parse errors,
/// diffs and JSON output.
///
/// - 0: silent unless `RUST_LOG` is set
/// - 1 (-v): INFO (run summary)
/// - 2 (-vv): DEBUG (per-file results)
/// - 3+ (-vvv): TRACE (per-method decisions)
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => return,
            1 => "warn,docblock=info,docblock_lib=info".to_string(),
            2 => "warn,docblock=debug,docblock_lib=debug".to_string(),
            _ => "info,docblock=trace,docblock_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config();
    tracing::debug!(?config, "starting run");

    let summary = docblock_lib::run(&config, |event| match event {
        FileEvent::ParseFailed(failure) => {
            if !cli.json {
                println!("Parse Error: {}", failure.message);
            }
        }
        FileEvent::Processed(report) => {
            if cli.diff && !cli.json {
                print_diff(report);
            }
        }
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Prints a unified diff for a file the run would change.
fn print_diff(report: &FileReport) {
    let Some(change) = &report.change else {
        return;
    };

    let path = report.path.display();
    let old_header = format!("a/{path}");
    let new_header = format!("b/{path}");

    let diff = TextDiff::from_lines(&change.before, &change.after);
    let mut unified = diff.unified_diff();
    unified.context_radius(3).header(&old_header, &new_header);
    print!("{unified}");
}
