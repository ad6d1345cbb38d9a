use std::fs;
use std::path::PathBuf;

use xcfg::{config_enum, Config, ConfigExt, ErrorKind, TextConfig};

type TestResult = Result<(), Box<dyn std::error::Error>>;

config_enum! {
    enum Schedule { Daily, Hourly }
}

fn fixture(contents: &str) -> std::io::Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Config.txt");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

#[test]
fn test_end_to_end_scenario() -> TestResult {
    let (_dir, path) = fixture("# comment\ndebug=false\ntimeout=30\n")?;
    let mut config = TextConfig::open(&path)?;

    assert!(!config.get_as::<bool>("debug")?);
    assert_eq!(config.get_as::<i32>("timeout")?, 30);
    assert_eq!(config.get("missing")?, None);
    assert_eq!(config.get_as_or::<i32>("missing", 5)?, 5);

    config.set("timeout", "60")?;
    assert_eq!(
        fs::read_to_string(&path)?,
        "# comment\ndebug=false\ntimeout=60\n"
    );
    Ok(())
}

#[test]
fn test_set_is_idempotent_upsert() -> TestResult {
    let (_dir, path) = fixture("a=1\n")?;
    let mut config = TextConfig::open(&path)?;

    config.set("k", "v1")?;
    let before = fs::read_to_string(&path)?.lines().count();
    config.set("k", "v2")?;
    let text = fs::read_to_string(&path)?;

    assert_eq!(text.lines().count(), before);
    let k_lines: Vec<&str> = text.lines().filter(|l| l.starts_with("k=")).collect();
    assert_eq!(k_lines, ["k=v2"]);
    Ok(())
}

#[test]
fn test_fail_fast_names_line_and_path() -> TestResult {
    let (_dir, path) = fixture("# header\n\nname=demo\nbadline\nlater=1\n")?;
    let err = TextConfig::open(&path).err().ok_or("expected an error")?;
    assert!(err.is_malformed());
    match err.kind() {
        ErrorKind::MalformedConfig {
            path: bad_path,
            line,
            ..
        } => {
            assert_eq!(bad_path, &path);
            assert_eq!(*line, 3);
        }
        other => return Err(format!("unexpected kind {other:?}").into()),
    }
    Ok(())
}

#[test]
fn test_missing_key_and_bad_conversion() -> TestResult {
    let (_dir, path) = fixture("count=many\n")?;
    let config = TextConfig::open(&path)?;

    let missing = config.get_as::<u32>("absent").map_err(|e| e.kind().clone());
    assert_eq!(
        missing,
        Err(ErrorKind::KeyNotFound {
            key: "absent".to_string()
        })
    );

    let bad = config.get_as_or::<u32>("count", 1).map_err(|e| e.kind().clone());
    assert!(matches!(bad, Err(ErrorKind::Conversion { target: "u32", .. })));
    Ok(())
}

#[test]
fn test_enum_values() -> TestResult {
    let (_dir, path) = fixture("schedule=hourly\n")?;
    let config = TextConfig::open(&path)?;

    assert_eq!(config.get_enum::<Schedule>("schedule", true)?, Schedule::Hourly);
    assert!(config.get_enum::<Schedule>("schedule", false).is_err());
    assert_eq!(
        config.get_enum_or("other", Schedule::Daily, true)?,
        Schedule::Daily
    );
    Ok(())
}

#[test]
fn test_every_call_reads_the_file() -> TestResult {
    let (_dir, path) = fixture("mode=a\n")?;
    let config = TextConfig::open(&path)?;
    fs::write(&path, "mode=b\n")?;
    assert_eq!(config.get_or("mode", "none")?, "b");
    Ok(())
}

#[test]
fn test_through_trait_object() -> TestResult {
    let (_dir, path) = fixture("")?;
    let mut config: Box<dyn Config> = Box::new(TextConfig::open(&path)?);
    config.set("path", "/var/data")?;
    config.set_debug(true)?;
    assert!(config.debug());
    assert_eq!(config.get_as::<PathBuf>("path")?, PathBuf::from("/var/data"));
    assert_eq!(config.properties()?.len(), 2);
    config.save()?;
    assert_eq!(fs::read_to_string(&path)?, "path=/var/data\ndebug=true\n");
    Ok(())
}
