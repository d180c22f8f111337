use serde_json::{Value, json};
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "envpick-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn write(&self, name: &str, contents: &str) -> String {
        let path = self.path.join(name);
        fs::write(&path, contents).expect("fixture should be written");
        path.to_string_lossy().into_owned()
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_envpick<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_envpick");
    Command::new(bin)
        .args(args)
        .env_remove("ENVPICK_LOG")
        .output()
        .expect("envpick command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_exit_code(output: &Output, code: i32) {
    if output.status.code() != Some(code) {
        panic!(
            "expected exit code {code}, got {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_navigation(tmp: &TempDirGuard, ids: &[&str]) -> String {
    let environments: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    tmp.write(
        "navigation.json",
        &json!({ "environments": environments }).to_string(),
    )
}

#[test]
fn picker_url_prints_encoded_negotiation_url() {
    let output = run_envpick([
        "picker-url",
        "--service-id",
        "s1",
        "--url",
        "https://app.example.com/home",
    ]);
    assert_success(&output);
    assert_eq!(
        stdout_text(&output).trim(),
        "https://welcome.example.com/omnibar/welcome?hosted=1&svcid=s1&url=https%3A%2F%2Fapp.example.com%2Fhome"
    );
}

#[test]
fn picker_url_json_honors_config_file() {
    let tmp = TempDirGuard::new("picker-url-config");
    let config = tmp.write(
        "envpick.toml",
        "picker_url = \"https://picker.test/choose\"\nframe_title = \"Pick one\"\n",
    );

    let output = run_envpick([
        "--config",
        config.as_str(),
        "picker-url",
        "--service-id",
        "svc a",
        "--json",
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(
        payload["pickerUrl"],
        "https://picker.test/choose?hosted=1&svcid=svc%20a&url="
    );
    assert_eq!(payload["frameTitle"], "Pick one");
    assert_eq!(payload["request"]["serviceId"], "svc a");
}

#[test]
fn invalid_config_is_a_usage_error() {
    let tmp = TempDirGuard::new("bad-config");
    let config = tmp.write("envpick.toml", "picker_url = \"ftp://picker.test\"\n");

    let output = run_envpick(["--config", config.as_str(), "picker-url"]);
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("picker_url"));
}

#[test]
fn lookup_reads_offline_navigation() {
    let tmp = TempDirGuard::new("lookup");
    let navigation = write_navigation(&tmp, &["e1", "e2"]);

    let output = run_envpick([
        "lookup",
        "--service-id",
        "s1",
        "--navigation",
        navigation.as_str(),
        "--json",
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(
        payload["environments"],
        json!([{ "id": "e1" }, { "id": "e2" }])
    );
}

#[test]
fn resolve_without_a_source_is_a_usage_error() {
    let output = run_envpick(["resolve", "--service-id", "s1"]);
    assert_exit_code(&output, 2);
}

#[test]
fn resolve_selects_the_only_environment() {
    let tmp = TempDirGuard::new("resolve-single");
    let navigation = write_navigation(&tmp, &["only"]);

    let output = run_envpick([
        "resolve",
        "--service-id",
        "s1",
        "--navigation",
        navigation.as_str(),
        "--json",
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["outcome"], "resolved");
    assert_eq!(payload["request"]["environmentId"], "only");
    assert_eq!(payload["exchange"], json!([]));
}

#[test]
fn resolve_drives_the_picker_from_a_script() {
    let tmp = TempDirGuard::new("resolve-picker");
    let navigation = write_navigation(&tmp, &["e1", "e2"]);
    let script = tmp.write(
        "script.json",
        &json!([
            { "messageType": "ready" },
            { "messageType": "get-token", "tokenRequestId": 7 },
            { "messageType": "welcome-environment-selected", "envId": "e2" }
        ])
        .to_string(),
    );

    let output = run_envpick([
        "resolve",
        "--service-id",
        "s1",
        "--url",
        "https://app.example.com/home",
        "--navigation",
        navigation.as_str(),
        "--token",
        "tok",
        "--script",
        script.as_str(),
        "--json",
    ]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["outcome"], "resolved");
    assert_eq!(payload["request"]["environmentId"], "e2");
    assert_eq!(payload["request"]["serviceId"], "s1");

    let kinds: Vec<&str> = payload["exchange"]
        .as_array()
        .expect("exchange should be an array")
        .iter()
        .filter_map(|message| message["messageType"].as_str())
        .collect();
    assert_eq!(kinds, vec!["host-ready", "context-provide", "token"]);
    assert_eq!(payload["exchange"][2]["token"], "tok");
    assert_eq!(payload["exchange"][2]["tokenRequestId"], 7);
}

#[test]
fn resolve_reports_cancel_as_failure() {
    let tmp = TempDirGuard::new("resolve-cancel");
    let navigation = write_navigation(&tmp, &["e1", "e2"]);
    let script = tmp.write(
        "script.json",
        r#"[{"messageType":"ready"},{"messageType":"welcome-cancel"}]"#,
    );

    let output = run_envpick([
        "resolve",
        "--service-id",
        "s1",
        "--navigation",
        navigation.as_str(),
        "--script",
        script.as_str(),
        "--json",
    ]);
    assert_exit_code(&output, 1);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["outcome"], "rejected");
    assert_eq!(payload["reason"], "canceled");
}

#[test]
fn resolve_without_environments_redirects_to_error_page() {
    let tmp = TempDirGuard::new("resolve-empty");
    let navigation = write_navigation(&tmp, &[]);

    let output = run_envpick([
        "resolve",
        "--service-id",
        "s1",
        "--url",
        "https://app.example.com/home",
        "--navigation",
        navigation.as_str(),
        "--json",
    ]);
    assert_exit_code(&output, 3);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["outcome"], "redirected");
    assert_eq!(payload["code"], 2);
    assert_eq!(
        payload["errorUrl"],
        "https://welcome.example.com/errors/security?source=envpick&code=2&url=https%3A%2F%2Fapp.example.com%2Fhome"
    );
}

#[test]
fn resolve_passes_through_known_environment() {
    let output = run_envpick([
        "resolve",
        "--service-id",
        "s1",
        "--environment-id",
        "e7",
        "--token",
        "tok",
    ]);
    assert_success(&output);
    let stdout = stdout_text(&output);
    assert!(stdout.contains("Environment: e7"), "stdout:\n{stdout}");
}
