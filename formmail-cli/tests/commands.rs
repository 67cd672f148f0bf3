//! Tests for the CLI commands
//!
//! Runs the commands against configuration and submission files in a
//! temporary directory.

use std::fs;
use std::path::PathBuf;

use formmail::forms::RejectReason;
use formmail_cli_lib::{outcome_json, Backend, CheckConfigCommand, ProcessCommand};
use tempfile::TempDir;

const NOW: i64 = 1_700_000_000;

const CONFIG: &str = r#"
[mail]
receiver = "office@example.com"
sender = "noreply@example.com"
subject = "Contact request"

[protection]
honeypot_fields = ["email_confirm"]
timestamp_field = "stamp"
timestamp_max_age_secs = 600

[[fields]]
name = "email"
label = "Email"
sanitizer = "email"
required = true

[[fields]]
name = "message"
label = "Message"
sanitizer = "textarea"
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_process_accepts_valid_submission() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "contact.toml", CONFIG);
    let input = write(
        &dir,
        "submission.txt",
        &format!("email=ada%40example.com&message=Hello&stamp={NOW}\n"),
    );

    let outcome = ProcessCommand::new(config, input)
        .now(Some(NOW))
        .run()
        .await
        .unwrap();

    let fields = outcome.as_ref().unwrap();
    assert_eq!(fields.value("email"), Some("ada@example.com"));

    let report = outcome_json(&outcome);
    assert_eq!(report["success"], true);
    assert_eq!(report["fields"]["message"]["value"], "Hello");
}

#[tokio::test]
async fn test_process_reports_honeypot() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "contact.toml", CONFIG);
    let input = write(
        &dir,
        "submission.txt",
        &format!("email=ada%40example.com&email_confirm=x&stamp={NOW}"),
    );

    let outcome = ProcessCommand::new(config, input)
        .now(Some(NOW))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.as_ref().unwrap_err().reason(), RejectReason::Honeypot);

    let report = outcome_json(&outcome);
    assert_eq!(report["success"], false);
    assert_eq!(report["reason"], "honeypot");
}

#[tokio::test]
async fn test_process_reports_missing_fields() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "contact.toml", CONFIG);
    let input = write(&dir, "submission.txt", &format!("message=Hi&stamp={NOW}"));

    let outcome = ProcessCommand::new(config, input)
        .now(Some(NOW))
        .run()
        .await
        .unwrap();

    let report = outcome_json(&outcome);
    assert_eq!(report["reason"], "required");
    assert_eq!(report["missing_fields"]["fields"][0], "email");
}

#[tokio::test]
async fn test_process_sends_through_console_backend() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "contact.toml", CONFIG);
    let input = write(
        &dir,
        "submission.txt",
        &format!("email=ada%40example.com&stamp={NOW}"),
    );

    let accepted = ProcessCommand::new(config, input)
        .send(true, Backend::Console)
        .now(Some(NOW))
        .execute()
        .await
        .unwrap();

    assert!(accepted);
}

#[tokio::test]
async fn test_process_missing_input_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "contact.toml", CONFIG);

    let result = ProcessCommand::new(config, dir.path().join("missing.txt"))
        .run()
        .await;

    assert!(result.is_err());
}

#[test]
fn test_check_config_lists_unknown_sanitizers() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "contact.toml",
        &format!("{CONFIG}\n[[fields]]\nname = \"phone\"\nsanitizer = \"phone\"\n"),
    );

    let (loaded, unknown) = CheckConfigCommand::new(config).run().unwrap();

    assert_eq!(loaded.fields.len(), 3);
    assert_eq!(unknown, vec!["phone (phone)"]);
}

#[test]
fn test_check_config_rejects_missing_receiver() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "contact.toml", "[mail]\nsubject = \"Hi\"\n");

    assert!(CheckConfigCommand::new(config).run().is_err());
}
