//! End-to-end tests for the `drone` binary against a mock daemon

use assert_cmd::prelude::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `drone` pointed at `server`, isolated from the caller's environment
fn drone(server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("drone").unwrap();
    cmd.env_remove("DRONE_HOST")
        .env_remove("DRONE_PORT")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .args(["--settings", "/nonexistent/drone/settings.toml"])
        .args(["-H", "127.0.0.1"])
        .args(["-p", &server.address().port().to_string()]);
    cmd
}

/// Run a blocking command without stalling the mock server
async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();
    output.assert()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_version_pretty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "haibu 0.9.7"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = drone(&server);
    cmd.arg("version");
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("service version:"))
        .stdout(predicate::str::contains("version: haibu 0.9.7"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_running_json_has_no_heading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drones/running"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"name": "hello", "host": "127.0.0.1", "port": 8001}])),
        )
        .mount(&server)
        .await;

    let mut cmd = drone(&server);
    cmd.args(["-o", "json", "running"]);
    let output = run(cmd).await.success().get_output().stdout.clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed[0]["name"], "hello");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apps_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hello": {
                "app": {"name": "hello", "user": "ops"},
                "drones": [{"name": "hello", "host": "127.0.0.1", "port": 8001}]
            }
        })))
        .mount(&server)
        .await;

    let mut cmd = drone(&server);
    cmd.args(["-o", "table", "apps"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("detailed info on apps:"))
        .stdout(predicate::str::contains("127.0.0.1:8001"))
        .stdout(predicate::str::contains("ops"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_unknown_app() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/drones/ghost/stop"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut cmd = drone(&server);
    cmd.args(["stop", "ghost"]);
    run(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("✗ Not found: /drones/ghost/stop"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_start_without_manifest() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = drone(&server);
    cmd.current_dir(dir.path()).arg("start");
    run(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("problem reading: ./config.json"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_posts_manifest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/drones/hello/update"))
        .and(body_json(json!({"update": {"name": "hello", "domain": "hello.local"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("app.json");
    std::fs::write(&manifest, r#"{"name":"hello","domain":"hello.local"}"#).unwrap();

    let mut cmd = drone(&server);
    cmd.arg("update").arg("-c").arg(&manifest);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("updated app: hello"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clean_aborts_without_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = drone(&server);
    cmd.args(["clean", "hello"]);
    run(cmd)
        .await
        .success()
        .stderr(predicate::str::contains("Aborted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deploy_uploads_tarball() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deploy/ops/hello"))
        .and(header("content-type", "application/x-gzip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"drone": {"name": "hello"}})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"name":"hello","user":"ops","repository":{"type":"local"}}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("server.js"), "console.log('hello')").unwrap();

    let mut cmd = drone(&server);
    cmd.current_dir(dir.path()).arg("deploy");
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("deployed app: hello"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(&requests[0].body[..2], &[0x1f_u8, 0x8b]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deploy_non_local_repository_warns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deploy/ops/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"drone": {"name": "hello"}})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"name":"hello","user":"ops","repository":{"type":"git","url":"https://example.com/hello.git"}}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("server.js"), "").unwrap();

    let mut cmd = drone(&server);
    cmd.current_dir(dir.path()).arg("deploy");
    run(cmd)
        .await
        .success()
        .stderr(predicate::str::contains("repository type is 'git'"))
        .stdout(predicate::str::contains("deployed app: hello"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_verbose_prints_resolved_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "haibu 0.9.7"})))
        .mount(&server)
        .await;
    let port = server.address().port().to_string();

    let mut cmd = drone(&server);
    cmd.args(["-v", "-c", "app.json", "version"]);
    run(cmd)
        .await
        .success()
        .stderr(predicate::str::contains("Resolved options"))
        .stderr(predicate::str::contains("host=127.0.0.1"))
        .stderr(predicate::str::contains(format!("port={}", port)))
        .stderr(predicate::str::contains("config=app.json"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pack_into_source_directory() {
    let server = MockServer::start().await;
    let src = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("server.js"), "console.log('hi')").unwrap();

    let mut cmd = drone(&server);
    cmd.current_dir(src.path()).args(["pack", "-f", "app.tar.gz"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("(1 files, 1 entries)"));

    let file = std::fs::File::open(src.path().join("app.tar.gz")).unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["server.js"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deploy_missing_directory() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), r#"{"name":"hello"}"#).unwrap();

    let mut cmd = drone(&server);
    cmd.current_dir(dir.path())
        .args(["deploy", "./missing", "--user", "ops"]);
    run(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("packaging failed"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pack_writes_archive() {
    let server = MockServer::start().await;
    let src = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("index.js"), "").unwrap();
    let out = tempfile::tempdir().unwrap();
    let file = out.path().join("app.tar.gz");

    let mut cmd = drone(&server);
    cmd.arg("pack").arg(src.path()).arg("-f").arg(&file);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Wrote"));

    assert!(file.is_file());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn test_connection_refused() {
    let mut cmd = Command::cargo_bin("drone").unwrap();
    cmd.env_remove("DRONE_HOST")
        .env_remove("DRONE_PORT")
        .args(["--settings", "/nonexistent/drone/settings.toml"])
        .args(["-H", "127.0.0.1", "-p", "9", "version"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("problem with request:"));
}

#[test]
fn test_unknown_command() {
    Command::cargo_bin("drone")
        .unwrap()
        .arg("launch")
        .assert()
        .code(2);
}
