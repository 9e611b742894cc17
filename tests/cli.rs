//! Integration tests for the `recipient-link` binary.
//!
//! Each test spawns the built binary with a config written to a temp file
//! and checks stdout and the exit status. Logs go to stderr, so stdout holds
//! only command output.

use anyhow::Result;
use recipient_link::caps::extract_token;
use recipient_link::eligibility::AGE_WINDOW_MESSAGE;
use serde_json::{Value, json};
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

const WALLET: &str = "0xA1b2C3d4E5F67890abcdef1234567890ABCDEF12";
const SECRET: &str = "this-is-a-secure-production-key-2025";
const ALLOW_INSECURE_ENV: &str = "RECIPIENT_LINK_ALLOW_INSECURE_KEY";
const MISSING_CONFIG: &str = "/nonexistent/recipient-link.toml";

fn recipient_link() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_recipient-link"));
    cmd.env_remove(ALLOW_INSECURE_ENV)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn config_file(base_url: &str, secret: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[link]
base_url = "{base_url}"

[link.key]
id = 1
secret = "{secret}"
"#
    )?;
    Ok(file)
}

fn secure_config() -> Result<NamedTempFile> {
    config_file("https://delivery.example.com/", SECRET)
}

fn run(cmd: &mut Command) -> Result<Output> {
    Ok(cmd.output()?)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn issue(config: &NamedTempFile, order_id: u64) -> Result<String> {
    let output = run(recipient_link()
        .arg("--config")
        .arg(config.path())
        .args(["issue", "--order-id", &order_id.to_string(), "--wallet", WALLET]))?;
    assert!(output.status.success(), "{}", stderr(&output));
    Ok(stdout(&output).trim_end().to_string())
}

fn open(config: &NamedTempFile, link: &str) -> Result<Output> {
    run(recipient_link()
        .arg("--config")
        .arg(config.path())
        .args(["open", link]))
}

// =============================================================================
// issue / open
// =============================================================================

#[test]
fn test_issue_prints_only_the_link() -> Result<()> {
    let config = secure_config()?;
    let output = run(recipient_link()
        .arg("--config")
        .arg(config.path())
        .args(["issue", "--order-id", "7", "--wallet", WALLET]))?;

    assert!(output.status.success());
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 1, "{out}");
    assert!(out.starts_with("https://delivery.example.com/recipient/?key="), "{out}");
    Ok(())
}

#[test]
fn test_issue_rejects_bad_input() -> Result<()> {
    let config = secure_config()?;
    for args in [
        ["issue", "--order-id", "0", "--wallet", WALLET],
        ["issue", "--order-id", "7", "--wallet", "0x1234"],
    ] {
        let output = run(recipient_link().arg("--config").arg(config.path()).args(args))?;
        assert_eq!(output.status.code(), Some(1), "{args:?}");
        assert!(stdout(&output).is_empty());
    }
    Ok(())
}

#[test]
fn test_open_link_prints_payload() -> Result<()> {
    let config = secure_config()?;
    let link = issue(&config, 7)?;

    let output = open(&config, &link)?;
    assert!(output.status.success(), "{}", stderr(&output));
    let payload: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(payload, json!({ "orderId": 7, "walletAddress": WALLET }));
    Ok(())
}

#[test]
fn test_open_bare_token_skips_prefix_check() -> Result<()> {
    let config = secure_config()?;
    let link = issue(&config, 9)?;

    // As a link on another host it is refused...
    let foreign = link.replace("delivery.example.com", "evil.example.net");
    let output = open(&config, &foreign)?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());

    // ...but its token on its own is ours and opens.
    let token = extract_token(&foreign)?;
    let output = open(&config, token.as_str())?;
    assert!(output.status.success(), "{}", stderr(&output));
    let payload: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(payload["orderId"], 9);
    Ok(())
}

#[test]
fn test_open_rejects_garbage_token() -> Result<()> {
    let config = secure_config()?;
    let output = open(&config, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA")?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    Ok(())
}

// =============================================================================
// Configuration gate
// =============================================================================

#[test]
fn test_check_config_accepts_secure_config() -> Result<()> {
    let config = secure_config()?;
    let output = run(recipient_link().arg("--config").arg(config.path()).arg("check-config"))?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "configuration OK\n");
    Ok(())
}

#[test]
fn test_weak_secret_is_refused() -> Result<()> {
    let config = config_file("https://delivery.example.com/", "changeme")?;

    let output = run(recipient_link().arg("--config").arg(config.path()).arg("check-config"))?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    let err = stderr(&output);
    assert!(err.contains("Refusing to start"), "{err}");
    assert!(err.contains(ALLOW_INSECURE_ENV), "{err}");

    let output = run(recipient_link()
        .arg("--config")
        .arg(config.path())
        .args(["issue", "--order-id", "7", "--wallet", WALLET]))?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    Ok(())
}

#[test]
fn test_weak_secret_allowed_with_override() -> Result<()> {
    let config = config_file("https://delivery.example.com/", "changeme")?;

    let output = run(recipient_link()
        .env(ALLOW_INSECURE_ENV, "1")
        .arg("--config")
        .arg(config.path())
        .arg("check-config"))?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "configuration OK\n");
    assert!(stderr(&output).contains("INSECURE"));

    let output = run(recipient_link()
        .env(ALLOW_INSECURE_ENV, "1")
        .arg("--config")
        .arg(config.path())
        .args(["issue", "--order-id", "7", "--wallet", WALLET]))?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("https://delivery.example.com/recipient/?key="));
    Ok(())
}

#[test]
fn test_override_does_not_waive_other_errors() -> Result<()> {
    let config = config_file("ftp://delivery.example.com", "changeme")?;
    let output = run(recipient_link()
        .env(ALLOW_INSECURE_ENV, "1")
        .arg("--config")
        .arg(config.path())
        .arg("check-config"))?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    Ok(())
}

#[test]
fn test_link_commands_require_config() -> Result<()> {
    let commands: [&[&str]; 3] = [
        &["issue", "--order-id", "7", "--wallet", WALLET],
        &["open", "AAAA"],
        &["check-config"],
    ];
    for args in commands {
        let output = run(recipient_link().args(["--config", MISSING_CONFIG]).args(args))?;
        assert_eq!(output.status.code(), Some(1), "{args:?}");
        assert!(stdout(&output).is_empty());
        assert!(stderr(&output).contains("failed to read config file"), "{args:?}");
    }
    Ok(())
}

// =============================================================================
// check-age / validate-registration
// =============================================================================

#[test]
fn test_check_age_without_config() -> Result<()> {
    let output = run(recipient_link()
        .args(["--config", MISSING_CONFIG])
        .args(["check-age", "2015-01-01", "--now", "2025-01-01"]))?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "ok\n");
    Ok(())
}

#[test]
fn test_check_age_violations_exit_with_failure() -> Result<()> {
    let output = run(recipient_link().args(["check-age", "2015-01-02", "--now", "2025-01-01"]))?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), format!("maxDate: {AGE_WINDOW_MESSAGE}\n"));

    let output = run(recipient_link().args(["check-age", "1924-01-01", "--now", "2025-01-01"]))?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), format!("minDate: {AGE_WINDOW_MESSAGE}\n"));
    Ok(())
}

#[test]
fn test_check_age_rejects_unparseable_date() -> Result<()> {
    let output = run(recipient_link().args(["check-age", "invalid-date"]))?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("invalid birth date"));
    Ok(())
}

fn form(birth_date: &str) -> Value {
    json!({
        "walletAddress": WALLET,
        "name": "John Doe",
        "email": "john@example.com",
        "contact": "010-1234-7890",
        "birthDate": birth_date,
    })
}

#[test]
fn test_validate_registration_from_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{}", form("2000-01-01"))?;

    let output = run(recipient_link()
        .args(["--config", MISSING_CONFIG])
        .arg("validate-registration")
        .arg(file.path())
        .args(["--now", "2025-01-01"]))?;
    assert!(output.status.success(), "{}", stderr(&output));

    let registration: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(registration["walletAddress"], WALLET);
    assert_eq!(registration["birthDate"], "2000-01-01T00:00:00Z");
    Ok(())
}

#[test]
fn test_validate_registration_from_stdin_reports_violations() -> Result<()> {
    let mut child = recipient_link()
        .args(["validate-registration", "-", "--now", "2025-01-01"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(form("2015-01-02").to_string().as_bytes())?;
    let output = child.wait_with_output()?;

    assert_eq!(output.status.code(), Some(1));
    let violations: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(
        violations,
        json!([{ "property": "birthDate", "constraints": { "maxDate": AGE_WINDOW_MESSAGE } }])
    );
    Ok(())
}
