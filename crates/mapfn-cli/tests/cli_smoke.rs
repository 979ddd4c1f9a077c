use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(rel: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join(rel);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn stdout_json(output: std::process::Output) -> Value {
    assert!(output.status.success(), "command failed: {output:?}");
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn cli_renders_fixture_page() {
    let exe = assert_cmd::cargo_bin!("mapfn-cli");
    let output = Command::new(exe)
        .args([
            "render",
            "--page",
            "Moscow",
            fixture("view/basic.wiki").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run mapfn-cli");
    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(html.contains("id=\"gmfn_canvas0\""));
    assert!(html.contains("data-gmfn=\"{&quot;lat&quot;:&quot;55.7522&quot;"));
    assert!(html.contains("<div class=\"thumbcaption\">Moscow</div>"));
}

#[test]
fn cli_render_is_lenient_unless_strict() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let page = tmp.path().join("bad.wiki");
    fs::write(&page, "{{#googlemap:lat=95|lng=10}}").expect("write page");

    let exe = assert_cmd::cargo_bin!("mapfn-cli");
    let output = Command::new(exe)
        .args(["render", page.to_string_lossy().as_ref()])
        .output()
        .expect("run mapfn-cli");
    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(html.contains("<strong class=\"error\">"));
    assert!(html.contains("Invalid or omitted value of latitude: 95"));

    Command::new(exe)
        .args(["render", "--strict", page.to_string_lossy().as_ref()])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn cli_state_reports_errors_per_tag() {
    let exe = assert_cmd::cargo_bin!("mapfn-cli");
    let output = Command::new(exe)
        .args([
            "state",
            "--pretty",
            fixture("errors/first_error_wins.wiki")
                .to_string_lossy()
                .as_ref(),
        ])
        .output()
        .expect("run mapfn-cli");
    let value = stdout_json(output);
    let tags = value.as_array().expect("array of tags");
    assert!(!tags.is_empty());
    assert_eq!(
        tags[0]["error"],
        "Invalid or omitted value of latitude: 91"
    );
    assert!(tags[0].get("state").is_none());
    assert_eq!(tags[1]["error"], "Invalid or unsupported unit of width: 10ft");
    assert_eq!(tags[5]["state"]["zoom"], 15);
}

#[test]
fn cli_scan_reads_rendered_html_from_stdin() {
    let exe = assert_cmd::cargo_bin!("mapfn-cli");
    let rendered = Command::new(exe)
        .args(["render", fixture("edit/editor.wiki").to_string_lossy().as_ref()])
        .output()
        .expect("run mapfn-cli");
    assert!(rendered.status.success());

    let tmp = tempfile::tempdir().expect("tempdir");
    let html_path = tmp.path().join("page.html");
    fs::write(&html_path, &rendered.stdout).expect("write html");

    let output = Command::new(exe)
        .arg("scan")
        .arg("-")
        .stdin(fs::File::open(&html_path).expect("open html"))
        .output()
        .expect("run mapfn-cli");
    let value = stdout_json(output);
    assert_eq!(value["bundle"], "edit");
    assert_eq!(value["maps"][0]["index"], 0);
    assert_eq!(value["maps"][0]["state"]["searchbox"], 1);
    assert_eq!(value["maps"][0]["align"], "right");
}

#[test]
fn cli_preview_prints_the_tag_preview_of_edit_maps() {
    let exe = assert_cmd::cargo_bin!("mapfn-cli");
    let output = Command::new(exe)
        .args(["preview", fixture("edit/editor.wiki").to_string_lossy().as_ref()])
        .output()
        .expect("run mapfn-cli");
    let value = stdout_json(output);
    let map = &value[0];
    assert_eq!(map["mode"], "edit");
    assert_eq!(map["editor"], "viewing");
    assert_eq!(map["search_box"], true);
    let preview = map["preview"].as_str().expect("preview text");
    assert!(preview.starts_with(
        "{{#googlemap:lat=59.9386|lng=30.3141|zoom=11|align=right|width=800px|height=600px|searchbox=1|edit=1\n|caption=Saint Petersburg & Neva"
    ));
    assert!(preview.ends_with("\n}}"));
}

#[test]
fn cli_rejects_unknown_flags_with_usage() {
    let exe = assert_cmd::cargo_bin!("mapfn-cli");
    let output = Command::new(exe)
        .args(["render", "--format", "svg"])
        .output()
        .expect("run mapfn-cli");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("USAGE:"));
}

#[test]
fn cli_reports_missing_input_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let missing = tmp.path().join("missing.wiki");
    let exe = assert_cmd::cargo_bin!("mapfn-cli");
    Command::new(exe)
        .args(["state", missing.to_string_lossy().as_ref()])
        .assert()
        .failure()
        .code(1);
}
