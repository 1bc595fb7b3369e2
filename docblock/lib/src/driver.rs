//! Traversal driver: find files, then parse, synthesize, print and write
//! each one in turn.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::config::{DocBlockConfig, WriteMode};
use crate::error::DocBlockError;
use crate::file::PhpFile;
use crate::printer::print_preserving;
use crate::synth::DocSynthesizer;

/// The before and after text of a file the run changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub before: String,
    pub after: String,
}

/// Outcome of processing one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Methods that received a synthesized comment.
    pub documented: usize,
    /// Methods left alone because they already had one.
    pub skipped: usize,
    /// Whether the printed text differs from the original.
    pub changed: bool,
    /// Present for changed files when the run does not write in place.
    #[serde(skip)]
    pub change: Option<FileChange>,
}

/// A file that was skipped because it did not parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Everything that happened during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub parse_failures: Vec<ParseFailure>,
}

impl RunSummary {
    /// Total number of synthesized comments across all files.
    pub fn documented(&self) -> usize {
        self.files.iter().map(|report| report.documented).sum()
    }

    /// Number of files whose text changed.
    pub fn changed_files(&self) -> usize {
        self.files.iter().filter(|report| report.changed).count()
    }
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum FileEvent<'a> {
    Processed(&'a FileReport),
    ParseFailed(&'a ParseFailure),
}

/// Recursively collects files under `root` whose extension matches
/// `extension`, ignoring case.
///
/// No ignore files are honoured and hidden entries are included. The
/// result is sorted.
///
/// ## Errors
/// Returns an error if the directory cannot be walked.
pub fn collect_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, DocBlockError> {
    let walker = WalkBuilder::new(root).standard_filters(false).build();
    let mut files = Vec::new();

    for entry in walker {
        let entry = entry?;

        let is_file = entry
            .file_type()
            .map(|file| file.is_file())
            .unwrap_or(false);

        if !is_file || !has_extension(entry.path(), extension) {
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Parses a file, documents its undocumented methods and writes the
/// result back according to the configured [`WriteMode`].
///
/// ## Errors
/// Parse failures leave the file untouched and are reported as errors for
/// which [`DocBlockError::is_parse_failure`] holds. Read and write failures
/// are returned as they are.
#[instrument(skip_all, fields(file = %path.display()))]
pub fn process_file(path: &Path, config: &DocBlockConfig) -> Result<FileReport, DocBlockError> {
    let original = PhpFile::new(path)?;

    let mut modified = original.unit().clone();
    let mut synthesizer = DocSynthesizer::new(config.default_style);
    modified.accept(&mut synthesizer);

    let output = print_preserving(path, original.source(), original.unit(), &modified)?;
    let changed = output != original.source();

    debug!(
        documented = synthesizer.documented(),
        skipped = synthesizer.skipped(),
        changed,
        "processed file"
    );

    let change = match config.write_mode {
        WriteMode::InPlace if changed => {
            write_atomic(path, &output)?;
            None
        }
        WriteMode::Diff if changed => Some(FileChange {
            before: original.source().to_string(),
            after: output,
        }),
        _ => None,
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        documented: synthesizer.documented(),
        skipped: synthesizer.skipped(),
        changed,
        change,
    })
}

/// Processes every matching file under the configured root.
///
/// A file that fails to parse is reported through `on_event` and the run
/// moves on. Any other error stops the run.
///
/// ## Errors
/// Returns the first error that is not a parse failure.
#[instrument(skip_all, fields(root = %config.root.display()))]
pub fn run<F>(config: &DocBlockConfig, mut on_event: F) -> Result<RunSummary, DocBlockError>
where
    F: FnMut(FileEvent<'_>),
{
    let files = collect_files(&config.root, &config.extension)?;
    info!(count = files.len(), extension = %config.extension, "collected files");

    let mut summary = RunSummary::default();

    for path in files {
        match process_file(&path, config) {
            Ok(report) => {
                on_event(FileEvent::Processed(&report));
                summary.files.push(report);
            }
            Err(error) if error.is_parse_failure() => {
                warn!(file = %path.display(), %error, "skipping file that failed to parse");
                let failure = ParseFailure {
                    path,
                    message: error.to_string(),
                };
                on_event(FileEvent::ParseFailed(&failure));
                summary.parse_failures.push(failure);
            }
            Err(error) => return Err(error),
        }
    }

    info!(
        files = summary.files.len(),
        changed = summary.changed_files(),
        documented = summary.documented(),
        parse_failures = summary.parse_failures.len(),
        "run complete"
    );

    Ok(summary)
}

/// Replaces `path` with `contents` via a temporary file in the same
/// directory, keeping the original permissions.
fn write_atomic(path: &Path, contents: &str) -> Result<(), DocBlockError> {
    let write_error = |source: std::io::Error| DocBlockError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path).map_err(write_error)?.permissions();

    let mut temp_file = NamedTempFile::new_in(parent).map_err(write_error)?;
    temp_file
        .write_all(contents.as_bytes())
        .map_err(write_error)?;
    temp_file
        .as_file()
        .set_permissions(permissions)
        .map_err(write_error)?;

    temp_file
        .persist(path)
        .map_err(|source| DocBlockError::Persist {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert!(has_extension(Path::new("src/A.php"), "php"));
        assert!(has_extension(Path::new("src/B.PHP"), "php"));
        assert!(has_extension(Path::new("src/C.Php"), "PHP"));
        assert!(!has_extension(Path::new("src/D.phtml"), "php"));
        assert!(!has_extension(Path::new("src/php"), "php"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn parse_failure_is_logged_and_run_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a_broken.php"), "<?php\nclass A {\n    function f( {\n}\n")
            .expect("write broken");
        fs::write(dir.path().join("b_ok.php"), "<?php\nclass B {\n    function g() {}\n}\n")
            .expect("write ok");

        let config = DocBlockConfig::default().with_root(dir.path());
        let summary = run(&config, |_| {}).expect("run succeeds");

        assert_eq!(summary.parse_failures.len(), 1);
        assert_eq!(summary.changed_files(), 1);
        assert!(logs_contain("skipping file that failed to parse"));
        assert_eq!(
            fs::read_to_string(dir.path().join("a_broken.php")).expect("read"),
            "<?php\nclass A {\n    function f( {\n}\n"
        );
    }

    #[test]
    fn unchanged_file_is_not_rewritten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Done.php");
        let source = "<?php\nclass Done {\n    // ok\n    function g() {}\n}\n";
        fs::write(&path, source).expect("write");
        let modified_before = fs::metadata(&path).and_then(|m| m.modified()).expect("mtime");

        let report = process_file(&path, &DocBlockConfig::default()).expect("process");

        assert!(!report.changed);
        assert_eq!(report.skipped, 1);
        let modified_after = fs::metadata(&path).and_then(|m| m.modified()).expect("mtime");
        assert_eq!(modified_before, modified_after);
    }
}
