use std::fs;
use std::path::{Path, PathBuf};

use docblock_lib::{
    DefaultStyle, DocBlockConfig, DocBlockError, FileEvent, WriteMode, collect_files, run,
};
use tempfile::TempDir;

const SHOW_DOC: &str = "    /**
     * show function
     *
     * @param int $id
     * @param ?string $format = null
     * @return bool
     */
    public function show(";

const SEARCH_DOC: &str = "    /**
     * search function
     *
     * @param array $filters = ['active' => true]
     * @param mixed $sort = self::PER_PAGE
     * @return void
     */
    public function search(";

const CREATE_DOC: &str = "    /**
     * create function
     *
     * @return ?User
     */
    public static function create()";

const DASHBOARD_DOC: &str = "\t/**
\t * dashboard function
\t *
\t * @param string $title = Admin
\t * @param float $ratio = 0.5
\t * @return string
\t */
\t#[Route('/admin')]
\tpublic function dashboard(";

#[test]
fn collects_matching_files_case_insensitively() -> Result<(), DocBlockError> {
    let workspace = fixture_workspace();
    let files = collect_files(workspace.path(), "php")?;

    let names: Vec<_> = files
        .iter()
        .map(|file| relative(workspace.path(), file))
        .collect();

    assert_eq!(
        names,
        [
            "Admin/DashboardController.PHP",
            "Broken.php",
            "UserController.php"
        ]
    );
    Ok(())
}

#[test]
fn documents_undocumented_methods_in_place() -> Result<(), DocBlockError> {
    let workspace = fixture_workspace();
    let config = DocBlockConfig::default().with_root(workspace.path());

    let summary = run(&config, |_| {})?;

    let user = read(workspace.path(), "UserController.php");
    assert!(user.contains(SHOW_DOC), "show doc missing:\n{user}");
    assert!(user.contains(SEARCH_DOC), "search doc missing:\n{user}");
    assert!(user.contains(CREATE_DOC), "create doc missing:\n{user}");
    assert!(user.contains("    /**\n     * Lists users.\n     */\n    public function index("));
    assert!(!user.contains("index function"));
    assert!(!user.contains("helper function"));

    let dashboard = read(workspace.path(), "Admin/DashboardController.PHP");
    assert!(dashboard.contains(DASHBOARD_DOC), "dashboard doc missing:\n{dashboard}");
    assert!(dashboard.contains("\t// legacy entry point\n\tpublic function legacy()"));
    assert!(!dashboard.contains("legacy function"));

    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.documented(), 4);
    assert_eq!(summary.changed_files(), 2);
    assert_eq!(summary.parse_failures.len(), 1);
    Ok(())
}

#[test]
fn preserves_everything_outside_inserted_blocks() -> Result<(), DocBlockError> {
    let workspace = fixture_workspace();
    let before = read(workspace.path(), "UserController.php");

    run(&DocBlockConfig::default().with_root(workspace.path()), |_| {})?;

    let after = read(workspace.path(), "UserController.php");
    let stripped = after
        .replacen(&SHOW_DOC[..SHOW_DOC.len() - "    public function show(".len()], "", 1)
        .replacen(&SEARCH_DOC[..SEARCH_DOC.len() - "    public function search(".len()], "", 1)
        .replacen(
            &CREATE_DOC[..CREATE_DOC.len() - "    public static function create()".len()],
            "",
            1,
        );

    assert_eq!(stripped, before);
    Ok(())
}

#[test]
fn second_run_is_a_no_op() -> Result<(), DocBlockError> {
    let workspace = fixture_workspace();
    let config = DocBlockConfig::default().with_root(workspace.path());

    run(&config, |_| {})?;
    let first = read(workspace.path(), "UserController.php");

    let summary = run(&config, |_| {})?;
    let second = read(workspace.path(), "UserController.php");

    assert_eq!(first, second);
    assert_eq!(summary.documented(), 0);
    assert_eq!(summary.changed_files(), 0);
    Ok(())
}

#[test]
fn parse_failures_are_reported_and_left_untouched() -> Result<(), DocBlockError> {
    let workspace = fixture_workspace();
    let broken_before = read(workspace.path(), "Broken.php");
    let mut failures = Vec::new();
    let mut processed = Vec::new();

    run(&DocBlockConfig::default().with_root(workspace.path()), |event| match event {
        FileEvent::ParseFailed(failure) => failures.push(failure.clone()),
        FileEvent::Processed(report) => processed.push(report.path.clone()),
    })?;

    assert_eq!(failures.len(), 1);
    assert!(failures[0].path.ends_with("Broken.php"));
    assert!(failures[0].message.contains("Syntax error"));
    assert_eq!(read(workspace.path(), "Broken.php"), broken_before);

    // Files after the broken one in traversal order were still processed.
    assert!(processed.iter().any(|path| path.ends_with("UserController.php")));
    Ok(())
}

#[test]
fn diff_mode_reports_changes_without_writing() -> Result<(), DocBlockError> {
    let workspace = fixture_workspace();
    let before = read(workspace.path(), "UserController.php");
    let config = DocBlockConfig::default()
        .with_root(workspace.path())
        .with_write_mode(WriteMode::Diff);

    let summary = run(&config, |_| {})?;

    assert_eq!(read(workspace.path(), "UserController.php"), before);
    let report = summary
        .files
        .iter()
        .find(|report| report.path.ends_with("UserController.php"))
        .expect("report for UserController.php");
    let change = report.change.as_ref().expect("change recorded in diff mode");
    assert_eq!(change.before, before);
    assert!(change.after.contains(SHOW_DOC));
    Ok(())
}

#[test]
fn category_style_hides_complex_defaults() -> Result<(), DocBlockError> {
    let workspace = fixture_workspace();
    let config = DocBlockConfig::default()
        .with_root(workspace.path())
        .with_default_style(DefaultStyle::Category);

    run(&config, |_| {})?;

    let user = read(workspace.path(), "UserController.php");
    assert!(user.contains("     * @param array $filters = array_creation_expression\n"));
    assert!(user.contains("     * @param mixed $sort = class_constant_access_expression\n"));
    Ok(())
}

#[test]
fn missing_root_is_fatal() {
    let workspace = TempDir::new().expect("tempdir");
    let config = DocBlockConfig::default().with_root(workspace.path().join("nope"));

    let error = run(&config, |_| {}).expect_err("walking a missing root fails");
    assert!(!error.is_parse_failure());
}

#[test]
fn empty_root_processes_nothing() -> Result<(), DocBlockError> {
    let workspace = TempDir::new().expect("tempdir");
    let summary = run(&DocBlockConfig::default().with_root(workspace.path()), |_| {})?;

    assert!(summary.files.is_empty());
    assert!(summary.parse_failures.is_empty());
    Ok(())
}

fn fixture_workspace() -> TempDir {
    let workspace = TempDir::new().expect("tempdir");
    copy_dir(&fixture_path("controller"), workspace.path());
    workspace
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("create fixture dir");
    for entry in fs::read_dir(from).expect("read fixture dir") {
        let entry = entry.expect("fixture entry");
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).expect("copy fixture");
        }
    }
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect("read fixture")
}

fn relative(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .expect("inside workspace")
        .to_string_lossy()
        .replace('\\', "/")
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
