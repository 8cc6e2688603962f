//! Batch enrollment from a CSV or JSON-lines file

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, info, warn};

use super::{ColumnMap, RowDriver};
use crate::config::{EnrollmentSettings, ImportSettings};
use crate::enrollment::{Enrollment, FieldRules, User};
use crate::error::{Error, Result};
use crate::store::{StoredUser, UserStore};
use crate::workflow::drive;

/// A row that could not be enrolled
#[derive(Debug)]
pub struct RowFailure {
    /// Line of the row in the input (a CSV header is line 1)
    pub line: u64,
    pub error: Error,
}

/// Outcome of an import run
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<StoredUser>,
    pub failures: Vec<RowFailure>,

    /// Set when `fail_fast` stopped the run before the end of the input
    pub aborted: bool,
}

impl ImportReport {
    /// Whether every row was enrolled
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Account for one row; `Ok(true)` means the import has to stop.
    fn record(&mut self, line: u64, outcome: Result<StoredUser>, options: &ImportSettings) -> Result<bool> {
        match outcome {
            Ok(stored) => {
                debug!(line, id = %stored.id, "Row enrolled");
                self.imported.push(stored);
            }
            Err(error) if error.is_record_error() => {
                warn!(line, error = %error.format_for_log(), "Row rejected");
                self.failures.push(RowFailure { line, error });
                self.aborted = options.fail_fast;
            }
            Err(error) => return Err(error),
        }
        Ok(self.aborted)
    }

    fn finish(self) -> Self {
        info!(
            imported = self.imported.len(),
            failed = self.failures.len(),
            aborted = self.aborted,
            "Import finished"
        );
        self
    }
}

/// Open `path` and enroll every row.
///
/// A `.jsonl` file holds one user object per line; anything else is CSV.
pub fn import_file(
    path: &Path,
    enrollment: &EnrollmentSettings,
    options: &ImportSettings,
    store: &dyn UserStore,
) -> Result<ImportReport> {
    let file = File::open(path).map_err(|e| Error::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), "Importing users");
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("jsonl") => import_jsonl(BufReader::new(file), enrollment, options, store),
        _ => import_csv(file, enrollment, options, store),
    }
}

/// Enroll every row of a CSV stream with a header line.
///
/// Each row runs its own `Enrollment`, resumed by a `RowDriver`; a completed
/// enrollment is already normalized against the `[enrollment]` rules. Rows that
/// fail on their own data are collected in the report; errors that are not
/// about the row (I/O, a corrupt store) abort the import.
pub fn import_csv<R: Read>(
    input: R,
    enrollment: &EnrollmentSettings,
    options: &ImportSettings,
    store: &dyn UserStore,
) -> Result<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter_byte()?)
        .has_headers(true)
        .from_reader(input);

    let columns = ColumnMap::from_headers(reader.headers()?)?;
    let mut report = ImportReport::default();

    for result in reader.records() {
        let (line, outcome) = match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                let outcome = drive(
                    &mut Enrollment::from_settings(enrollment),
                    &mut RowDriver::new(&columns, &record),
                )
                .and_then(|user| store.insert_user(&user));
                (line, outcome)
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                (line, Err(Error::from(e)))
            }
        };

        if report.record(line, outcome, options)? {
            break;
        }
    }
    Ok(report.finish())
}

/// Enroll users given as JSON objects, one per line.
///
/// These records never pass through an `Enrollment`, so each one is held
/// to the same rules with `User::validate` before it is stored. Blank lines
/// are skipped.
pub fn import_jsonl<R: BufRead>(
    input: R,
    enrollment: &EnrollmentSettings,
    options: &ImportSettings,
    store: &dyn UserStore,
) -> Result<ImportReport> {
    let rules = FieldRules::from(enrollment);
    let mut report = ImportReport::default();

    for (index, text) in input.lines().enumerate() {
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }
        let line = index as u64 + 1;
        let outcome = serde_json::from_str::<User>(&text)
            .map_err(|e| Error::MalformedRow {
                line: Some(line),
                message: e.to_string(),
            })
            .and_then(|user| {
                user.validate(&rules)?;
                store.insert_user(&user)
            });

        if report.record(line, outcome, options)? {
            break;
        }
    }
    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::store::{JsonlStore, MemoryStore};
    use tempfile::TempDir;

    const HEADER: &str = "name,email,password,initial_preferences\n";

    fn run(csv: &str, options: &ImportSettings) -> (ImportReport, MemoryStore) {
        let store = MemoryStore::new();
        let report = import_csv(csv.as_bytes(), &EnrollmentSettings::default(), options, &store).unwrap();
        (report, store)
    }

    #[test]
    fn test_imports_all_valid_rows() {
        let csv = format!(
            "{}Ada,ada@example.com,analytical,\"news, digest\"\nGrace,grace@example.com,compiler1,\n",
            HEADER
        );
        let (report, store) = run(&csv, &ImportSettings::default());

        assert!(report.is_clean());
        assert_eq!(report.imported.len(), 2);
        assert_eq!(report.imported[0].preferences, vec!["news", "digest"]);
        assert_eq!(store.list_users().unwrap().len(), 2);
    }

    #[test]
    fn test_bad_rows_are_reported_with_lines() {
        let csv = format!(
            "{}Ada,ada@example.com,analytical,\nBob,bob-at-example.com,password1,\nCy,cy@example.com,short,\nDee,dee@example.com,password1,\n",
            HEADER
        );
        let (report, store) = run(&csv, &ImportSettings::default());

        assert_eq!(report.imported.len(), 2);
        let lines: Vec<u64> = report.failures.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert_eq!(report.failures[0].error.code(), ErrorCode::InvalidField);
        assert!(!report.aborted);
        assert!(store.find_by_email("dee@example.com").unwrap().is_some());
    }

    #[test]
    fn test_duplicate_rows() {
        let csv = format!(
            "{}Ada,ada@example.com,analytical,\nAda Again,ADA@example.com,analytical,\n",
            HEADER
        );
        let (report, _) = run(&csv, &ImportSettings::default());
        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.failures[0].error.code(), ErrorCode::DuplicateUser);
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let csv = format!(
            "{}Bob,bob-at-example.com,password1,\nAda,ada@example.com,analytical,\n",
            HEADER
        );
        let options = ImportSettings {
            fail_fast: true,
            ..Default::default()
        };
        let (report, store) = run(&csv, &options);

        assert!(report.aborted);
        assert!(report.imported.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(store.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_row_with_wrong_cell_count() {
        let csv = format!("{}Ada,ada@example.com\nGrace,grace@example.com,compiler1,\n", HEADER);
        let (report, _) = run(&csv, &ImportSettings::default());

        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.failures[0].line, 2);
        assert_eq!(report.failures[0].error.code(), ErrorCode::MalformedRow);
    }

    #[test]
    fn test_jsonl_records_are_validated() {
        let input = concat!(
            r#"{"name":"Ada","email":"ada@example.com","password":"analytical","initial_preferences":["news"]}"#,
            "\n\n",
            r#"{"name":"Bob","email":"Bob@Example.com","password":"password1"}"#,
            "\n",
            r#"{"name":"Cy","email":"cy@example.com","password":"short"}"#,
            "\n",
            "{not json\n",
        );
        let store = MemoryStore::new();
        let report = import_jsonl(
            input.as_bytes(),
            &EnrollmentSettings::default(),
            &ImportSettings::default(),
            &store,
        )
        .unwrap();

        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.imported[0].preferences, vec!["news"]);
        let failures: Vec<(u64, ErrorCode)> =
            report.failures.iter().map(|f| (f.line, f.error.code())).collect();
        assert_eq!(
            failures,
            vec![
                (3, ErrorCode::InvalidField),
                (4, ErrorCode::InvalidField),
                (5, ErrorCode::MalformedRow),
            ]
        );
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_import_file_reads_jsonl_by_extension() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("users.jsonl");
        std::fs::write(
            &input,
            r#"{"name":"Grace","email":"grace@example.com","password":"compiler1","initial_preferences":[]}"#,
        )
        .unwrap();

        let store = MemoryStore::new();
        let report = import_file(
            &input,
            &EnrollmentSettings::default(),
            &ImportSettings::default(),
            &store,
        )
        .unwrap();
        assert!(report.is_clean());
        assert!(store.find_by_email("grace@example.com").unwrap().is_some());
    }

    #[test]
    fn test_custom_delimiter() {
        let csv = "email;name;password;initial_preferences\nada@example.com;Ada;analytical;news,digest\n";
        let options = ImportSettings {
            delimiter: ";".to_string(),
            ..Default::default()
        };
        let (report, _) = run(csv, &options);
        assert!(report.is_clean());
        assert_eq!(report.imported[0].preferences, vec!["news", "digest"]);
    }

    #[test]
    fn test_missing_column_aborts() {
        let store = MemoryStore::new();
        let err = import_csv(
            "name,email\nAda,ada@example.com\n".as_bytes(),
            &EnrollmentSettings::default(),
            &ImportSettings::default(),
            &store,
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingField);
        assert!(err.to_string().contains("password"));
        assert!(store.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_import_file_into_jsonl() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("users.csv");
        std::fs::write(&csv_path, format!("{}Ada,ada@example.com,analytical,news\n", HEADER)).unwrap();

        let store = JsonlStore::new(dir.path().join("users.jsonl"));
        let report = import_file(
            &csv_path,
            &EnrollmentSettings::default(),
            &ImportSettings::default(),
            &store,
        )
        .unwrap();

        assert!(report.is_clean());
        assert_eq!(store.list_users().unwrap(), report.imported);
    }

    #[test]
    fn test_import_missing_file() {
        let err = import_file(
            Path::new("/nonexistent/users.csv"),
            &EnrollmentSettings::default(),
            &ImportSettings::default(),
            &MemoryStore::new(),
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IoRead);
    }
}
