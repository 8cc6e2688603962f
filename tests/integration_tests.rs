//! End-to-end enrollment scenarios
//!
//! Drives the binary through several commands sharing one users file.

mod common;

use common::{fixture_path, TestEnvironment};
use predicates::prelude::*;
use serde_json::Value;

fn listed_users(env: &TestEnvironment) -> Vec<Value> {
    let output = env.cmd().args(["users", "list", "--json"]).output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_import_then_enroll_then_list() {
    let env = TestEnvironment::new();

    env.cmd()
        .args(["enroll", "import"])
        .arg(fixture_path("users.csv"))
        .assert()
        .success();

    env.cmd()
        .args(["enroll", "interactive"])
        .write_stdin("Barbara Liskov\nbarbara@example.com\nsubstitution\noffers\n")
        .assert()
        .success();

    let users = listed_users(&env);
    let emails: Vec<&str> = users.iter().map(|u| u["email"].as_str().unwrap()).collect();
    assert_eq!(
        emails,
        vec![
            "ada@example.com",
            "grace@example.com",
            "linus@example.com",
            "barbara@example.com"
        ]
    );
    assert_eq!(users[0]["preferences"], serde_json::json!(["news", "digest"]));
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[test]
fn test_reimport_rejects_every_duplicate() {
    let env = TestEnvironment::new();
    let import = |code: i32| {
        env.cmd()
            .args(["enroll", "import"])
            .arg(fixture_path("users.csv"))
            .assert()
            .code(code)
    };

    import(0);
    import(50).stdout(predicate::str::contains("Imported 0 user(s), 3 row(s) rejected"));

    assert_eq!(listed_users(&env).len(), 3);
}

#[test]
fn test_stored_records_keep_salted_hashes() {
    let env = TestEnvironment::new();
    let answers = "Ada\nada@example.com\nanalytical\n\n";
    env.cmd().args(["enroll", "interactive"]).write_stdin(answers).assert().success();

    let line = env.stored_lines().pop().unwrap();
    let record: Value = serde_json::from_str(&line).unwrap();
    let hash = record["password_hash"].as_str().unwrap();
    let salt = record["salt"].as_str().unwrap();

    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(!salt.is_empty());
    assert!(!line.contains("analytical"));
}

#[test]
fn test_row_order_does_not_matter() {
    let env = TestEnvironment::new();
    let csv = env.write(
        "reordered.csv",
        "initial_preferences,password,extra,email,name\n\"news,digest\",analytical,x,ada@example.com,Ada\n",
    );

    env.cmd().args(["enroll", "import"]).arg(&csv).assert().success();

    let users = listed_users(&env);
    assert_eq!(users[0]["name"], "Ada");
    assert_eq!(users[0]["email"], "ada@example.com");
}
