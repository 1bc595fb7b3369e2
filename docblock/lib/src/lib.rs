pub mod config;
pub mod driver;
pub mod error;
pub mod file;
pub mod printer;
pub mod shared;
pub mod synth;

pub use config::{DocBlockConfig, WriteMode};
pub use driver::{
    FileChange, FileEvent, FileReport, ParseFailure, RunSummary, collect_files, process_file, run,
};
pub use error::DocBlockError;
pub use file::PhpFile;
pub use printer::print_preserving;
pub use shared::*;
pub use synth::{DefaultStyle, DocSynthesizer};
