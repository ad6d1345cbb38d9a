use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const XML: &str = "<config><debug>false</debug><recipients><name>A</name><name>B</name></recipients></config>";

fn xcfg() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("xcfg")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_get_text_property() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Config.txt");
    fs::write(&path, "# comment\ndebug=false\ntimeout=30\n")?;

    xcfg()?
        .args(["get"])
        .arg(&path)
        .arg("TIMEOUT")
        .assert()
        .success()
        .stdout("30\n");
    Ok(())
}

#[test]
fn test_get_missing_key_fails() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Config.txt");
    fs::write(&path, "a=1\n")?;

    xcfg()?
        .arg("get")
        .arg(&path)
        .arg("b")
        .assert()
        .failure()
        .stderr(predicate::str::contains("b is not set"));
    Ok(())
}

#[test]
fn test_malformed_text_reports_line() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Config.txt");
    fs::write(&path, "a=1\nbadline\n")?;

    xcfg()?
        .arg("list")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
    Ok(())
}

#[test]
fn test_set_then_list_with_delimiter() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.cfg");

    xcfg()?
        .args(["set", "--delimiter", ":"])
        .arg(&path)
        .args(["host", "example.org"])
        .assert()
        .success();
    xcfg()?
        .args(["set", "--delimiter", ":"])
        .arg(&path)
        .args(["port", "80"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&path)?, "host:example.org\nport:80\n");
    xcfg()?
        .args(["list", "--delimiter", ":"])
        .arg(&path)
        .assert()
        .success()
        .stdout("host:example.org\nport:80\n");
    Ok(())
}

#[test]
fn test_xml_set_and_delete() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Config.xml");
    fs::write(&path, XML)?;

    xcfg()?
        .arg("set")
        .arg(&path)
        .args(["debug", "true"])
        .assert()
        .success();
    xcfg()?
        .arg("delete")
        .arg(&path)
        .arg("NAME")
        .args(["--parent", "recipients"])
        .assert()
        .success();

    let text = fs::read_to_string(&path)?;
    assert!(text.contains("<debug>true</debug>"));
    assert!(!text.contains("<name>A</name>"));
    assert!(text.contains("<name>B</name>"));
    Ok(())
}

#[test]
fn test_find_prints_node() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Config.xml");
    fs::write(&path, XML)?;

    xcfg()?
        .arg("find")
        .arg(&path)
        .arg("recipients")
        .assert()
        .success()
        .stdout("<recipients>\n\t<name>A</name>\n\t<name>B</name>\n</recipients>\n");
    Ok(())
}

#[test]
fn test_fmt_compact_to_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("in.xml");
    let out = dir.path().join("out.xml");
    fs::write(&path, "<config>\n  <a>1</a>\n  <empty/>\n</config>\n")?;

    xcfg()?
        .arg("fmt")
        .arg(&path)
        .arg("--compact")
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&out)?,
        r#"<?xml version="1.0" encoding="utf-8" ?><config><a>1</a></config>"#
    );
    Ok(())
}

#[test]
fn test_fmt_rejects_text_files() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Config.txt");
    fs::write(&path, "a=1\n")?;

    xcfg()?
        .arg("fmt")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an XML file"));
    Ok(())
}
