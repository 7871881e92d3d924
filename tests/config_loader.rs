// tests/config_loader.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;

use csspipe::config::{load_and_validate, load_from_path, load_or_default};
use csspipe::errors::CssPipeError;
use csspipe::types::TriggerWhileRunningBehaviour;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn loads_a_full_config_relative_to_its_directory() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let path = dir.path().join("csspipe.toml");
    fs::write(
        &path,
        r#"
[build]
source = "styles/main.css"
out_dir = "public"
browsers = ["> 1%", "last 2 versions"]
import_paths = ["vendor"]
preserve_custom_properties = false

[watch]
watch = ["styles/**/*.css"]
exclude = ["styles/vendor/**"]
track_imports = true
use_hash = true
debounce_ms = 10
triggered_while_running_behaviour = "drop"
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.root(), dir.path());
    assert_eq!(cfg.source_path(), dir.path().join("styles/main.css"));
    assert_eq!(cfg.output_path(), dir.path().join("public/main.css"));
    assert_eq!(
        cfg.minified_output_path(),
        Some(dir.path().join("public/main.min.css"))
    );
    assert_eq!(cfg.import_paths(), vec![dir.path().join("vendor")]);
    assert!(!cfg.build_section().preserve_custom_properties);

    let watch = cfg.watch_section();
    assert!(watch.track_imports);
    assert!(watch.use_hash);
    assert_eq!(watch.debounce_ms, 10);
    assert_eq!(
        watch.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Drop
    );
    Ok(())
}

#[test]
fn empty_file_means_defaults() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("csspipe.toml");
    fs::write(&path, "")?;

    let raw = load_from_path(&path)?;
    assert_eq!(raw.build.browsers, vec!["last 3 versions".to_string()]);
    assert_eq!(raw.watch.watch, vec!["src/*.css".to_string()]);
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("csspipe.toml");
    fs::write(&path, "[build]\nsauce = \"src/index.css\"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, CssPipeError::TomlError(_)), "{err}");
    Ok(())
}

#[test]
fn bad_behaviour_value_is_rejected() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("csspipe.toml");
    fs::write(&path, "[watch]\ntriggered_while_running_behaviour = \"cancel\"\n")?;

    assert!(load_and_validate(&path).is_err());
    Ok(())
}

#[test]
fn invalid_browser_query_is_a_browserslist_error() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("csspipe.toml");
    fs::write(&path, "[build]\nbrowsers = [\"nosuchbrowser 99\"]\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, CssPipeError::Browserslist(_)), "{err}");
    Ok(())
}

#[test]
fn explicit_missing_config_is_an_error() -> TestResult {
    let dir = tempdir()?;
    let missing = dir.path().join("nope.toml");

    let err = load_or_default(Some(&missing)).unwrap_err();
    assert!(matches!(err, CssPipeError::ConfigError(_)), "{err}");
    Ok(())
}
