//! Unit and behavioural tests for the static table backend.


use std::fs;
use std::io::Cursor;

use rstest::{fixture, rstest};
use tablekit_config::Config;
use tempfile::TempDir;

use crate::{AppError, run_with_io};

struct TableFile {
    _dir: TempDir,
    config: Config,
}

impl TableFile {
    fn rewrite(&self, contents: &str) {
        fs::write(self.config.table_path(), contents).expect("rewrite table file");
    }
}

#[fixture]
fn table_file() -> TableFile {
    let dir = tempfile::tempdir().expect("temporary directory");
    let std_path = dir.path().join("aliases.tbl");
    fs::write(&std_path, "postmaster root\nabuse root\n").expect("write table file");
    let path = camino::Utf8PathBuf::from_path_buf(std_path).expect("utf-8 temp path");
    let config = Config::load_from_iter(["tablekit-static", "--layout", "compact", path.as_str()])
        .expect("configuration loads");
    TableFile { _dir: dir, config }
}

fn serve(config: &Config, input: &str) -> (Result<(), AppError>, String) {
    let mut output = Vec::new();
    let result = run_with_io(config, Cursor::new(input.to_owned()), &mut output);
    (result, String::from_utf8(output).expect("utf-8 output"))
}

#[rstest]
#[case::lookup(
    "table|0.1|aliases|lookup|T1|alias|postmaster\n",
    "table-result|T1|found|root\n"
)]
#[case::check_missing(
    "table|0.1|aliases|check|T1|alias|nobody\n",
    "table-result|T1|not-found\n"
)]
#[case::fetch(
    "table|0.1|aliases|fetch|T1|alias\n",
    "table-result|T1|found|root\n"
)]
#[case::update(
    "table|0.1|aliases|update|T1\n",
    "table-result|T1|updated\n"
)]
fn serves_requests_from_the_table_file(
    table_file: TableFile,
    #[case] input: &str,
    #[case] expected: &str,
) {
    let (result, output) = serve(&table_file.config, input);
    result.expect("dispatch succeeds");
    assert_eq!(output, expected);
}

#[rstest]
fn update_rereads_the_file(table_file: TableFile) {
    table_file.rewrite("postmaster admin\n");
    let (result, output) = serve(
        &table_file.config,
        concat!(
            "table|0.1|aliases|update|T1\n",
            "table|0.1|aliases|lookup|T2|alias|postmaster\n",
        ),
    );
    result.expect("dispatch succeeds");
    assert_eq!(
        output,
        "table-result|T1|updated\ntable-result|T2|found|admin\n"
    );
}

#[rstest]
fn broken_reload_answers_failure(table_file: TableFile) {
    table_file.rewrite("postmaster admin\npostmaster other\n");
    let (result, output) = serve(
        &table_file.config,
        concat!(
            "table|0.1|aliases|update|T1\n",
            "table|0.1|aliases|lookup|T2|alias|postmaster\n",
        ),
    );
    result.expect("dispatch succeeds");
    assert_eq!(
        output,
        "table-result|T1|failure\ntable-result|T2|found|root\n"
    );
}

#[rstest]
fn rejected_request_stops_with_protocol_status(table_file: TableFile) {
    let (result, output) = serve(
        &table_file.config,
        "table|0.2|aliases|lookup|T1|alias|postmaster\n",
    );
    let error = result.expect_err("version mismatch stops dispatch");
    assert_eq!(error.exit_status(), 1);
    assert!(output.is_empty());
}

#[test]
fn missing_table_file_is_a_setup_error() {
    let config = Config::new("/nonexistent/tablekit/aliases.tbl");
    let (result, output) = serve(&config, "");
    let error = result.expect_err("table must load");
    assert!(matches!(error, AppError::Table(_)));
    assert_eq!(error.exit_status(), 2);
    assert!(output.is_empty());
}
