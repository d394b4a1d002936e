//! Full runs through the CLI library entry points

use std::fs;

use darmogen::{init_config, run_generate};
use darmogen_core::config::DEFAULT_CONFIG_FILE;
use darmogen_core::{DarmogenConfig, NoProgress};
use darmogen_test_fixtures::{FixtureType, TestFixtures};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_run_generate_from_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut fixtures = TestFixtures::new();
    let root = fixtures.setup(FixtureType::Blog);

    fs::write(
        root.join(DEFAULT_CONFIG_FILE),
        r#"
[parser]
cwd = "src"
root = "."
identifier = { decorator = "Entity" }

[parser.aliases]
src = "{cwd}"

[generator]
out = "lib/models"
imports = ["./model.dart"]
file_suffix = ".model.dart"
"#,
    )?;

    let config = DarmogenConfig::from_file(&root.join(DEFAULT_CONFIG_FILE))?;
    let outcome = run_generate(&config, &NoProgress).await?;

    assert!(outcome.is_clean());
    assert_eq!(outcome.parse.files, 5);
    assert_eq!(outcome.generation.written.len(), 5);

    let user = fs::read_to_string(root.join("lib/models/user/user.model.dart"))?;
    assert!(user.starts_with(
        "import '../model.dart';\nimport 'profile.model.dart';\nimport '../post/post.model.dart';\n"
    ));
    Ok(())
}

#[tokio::test]
async fn test_run_reports_failed_sources() -> Result<(), Box<dyn std::error::Error>> {
    let mut fixtures = TestFixtures::new();
    fixtures.setup(FixtureType::Broken);

    let config = DarmogenConfig {
        parser: fixtures.parser_config(),
        generator: fixtures.generator_config(),
    };
    let outcome = run_generate(&config, &NoProgress).await?;

    assert!(!outcome.is_clean());
    assert_eq!(outcome.failure_count(), 1);
    assert!(fixtures.out_dir().join("tag/tag.dart").is_file());
    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let path = init_config(dir.path(), false)?;
    assert_eq!(fs::read_to_string(&path)?, DarmogenConfig::starter());
    assert!(init_config(dir.path(), false).is_err());
    assert!(init_config(dir.path(), true).is_ok());

    DarmogenConfig::from_file(&path)?;
    Ok(())
}
