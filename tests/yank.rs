use std::path::Path;

use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use tempfile::TempDir;

/// Write a config and credentials file pointing at `host`
fn setup(host: &str, platforms: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let credentials = dir.path().join("credentials.toml");

    std::fs::write(
        &credentials,
        "rubygems_api_key = \"default-key\"\n\n[api_keys]\nwork = \"work-key\"\n",
    )
    .unwrap();

    let mut config = format!(
        "host = \"{}\"\ncredentials = \"{}\"\n",
        host,
        credentials.display()
    );
    if let Some(platforms) = platforms {
        config.push_str(&format!("platforms = {platforms}\n"));
    }
    std::fs::write(dir.path().join("gemyank.conf"), config).unwrap();

    dir
}

fn gemyank(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gemyank").unwrap();
    cmd.env_remove("RUBYGEMS_HOST")
        .env_remove("GEM_HOST_API_KEY")
        .env_remove("GEMYANK_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("gemyank.conf"));
    cmd
}

#[test]
fn yank_deletes_version() {
    let mut server = Server::new();
    let mock = server
        .mock("DELETE", "/api/v1/gems/yank")
        .match_header("authorization", "default-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("gem_name".into(), "foo".into()),
            Matcher::UrlEncoded("version".into(), "1.2.3".into()),
        ]))
        .with_status(200)
        .with_body("Successfully deleted gem: foo (1.2.3)")
        .create();

    let dir = setup(&server.url(), None);

    gemyank(dir.path())
        .args(["yank", "foo", "-v", ">= 1.2.3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Yanking gem from"))
        .stdout(predicate::str::contains("Successfully deleted gem: foo (1.2.3)"));

    mock.assert();
}

#[test]
fn undo_unyanks_with_named_key() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/api/v1/gems/unyank")
        .match_header("authorization", "work-key")
        .match_body(Matcher::UrlEncoded("version".into(), "0.4.1".into()))
        .with_status(200)
        .with_body("Successfully unyanked")
        .create();

    let dir = setup(&server.url(), None);

    gemyank(dir.path())
        .args(["yank", "foo", "--version", "0.4.1", "--undo", "--key", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unyanking gem from"))
        .stdout(predicate::str::contains("Successfully unyanked"));

    mock.assert();
}

#[test]
fn platform_flag_sends_environment_platform() {
    let mut server = Server::new();
    let mock = server
        .mock("DELETE", "/api/v1/gems/yank")
        .match_body(Matcher::UrlEncoded("platform".into(), "x86_64-linux".into()))
        .with_status(200)
        .with_body("ok")
        .create();

    let dir = setup(&server.url(), Some("[\"ruby\", \"x86_64-linux\"]"));

    gemyank(dir.path())
        .args(["yank", "foo", "-v", "1.0", "-p", "java"])
        .assert()
        .success();

    mock.assert();
}

#[test]
fn server_error_body_is_printed() {
    let mut server = Server::new();
    let mock = server
        .mock("DELETE", "/api/v1/gems/yank")
        .with_status(403)
        .with_body("The version 1.0 has already been yanked.")
        .create();

    let dir = setup(&server.url(), None);

    gemyank(dir.path())
        .args(["yank", "foo", "-v", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The version 1.0 has already been yanked."));

    mock.assert();
}

#[test]
fn missing_version_prints_usage() {
    let mut server = Server::new();
    let mock = server.mock("DELETE", Matcher::Any).expect(0).create();

    let dir = setup(&server.url(), None);

    gemyank(dir.path())
        .args(["yank", "foo"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("A version argument is required"))
        .stdout(predicate::str::contains(
            "GEM -v VERSION [-p PLATFORM] [--undo] [--key KEY_NAME]",
        ));

    mock.assert();
}

#[test]
fn missing_gem_name_fails() {
    let server = Server::new();
    let dir = setup(&server.url(), None);

    gemyank(dir.path())
        .args(["yank", "-v", "1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please specify a gem name"));
}

#[test]
fn unreachable_host_fails() {
    let dir = setup("http://127.0.0.1:1", None);

    gemyank(dir.path())
        .args(["yank", "foo", "-v", "1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR:"));
}
