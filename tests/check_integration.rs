use serde_json::{Value, json};
use std::path::Path;
use std::process::{Command, Output};

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn run(cwd: &Path, args: &[&str]) -> anyhow::Result<Output> {
    let bin = env!("CARGO_BIN_EXE_class-leak");
    Ok(Command::new(bin)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .args(args)
        .output()?)
}

fn run_json(cwd: &Path, args: &[&str]) -> anyhow::Result<(Value, Vec<u8>)> {
    let out = run(cwd, args)?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok((serde_json::from_slice(&out.stdout)?, out.stdout))
}

fn seed_project(root: &Path) -> anyhow::Result<()> {
    write_file(
        &root.join("src/Entity/Foo.php"),
        r#"<?php

declare(strict_types=1);

namespace App\Entity;

use Doctrine\ORM\Mapping as ORM;

/**
 * @ORM\Entity
 */
class Foo
{
    /** @ORM\Column */
    private string $name;
}
"#,
    )?;
    write_file(
        &root.join("src/Bar.php"),
        r#"<?php

namespace App;

/** @Serializer\ExclusionPolicy("all") */
final class Bar implements BarInterface
{
}
"#,
    )?;
    write_file(
        &root.join("src/BazTrait.php"),
        r#"<?php

namespace App;

/** @Entity */
trait BazTrait
{
}
"#,
    )?;
    write_file(
        &root.join("src/Api/Book.php"),
        r#"<?php

namespace App\Api;

use ApiPlatform\Metadata\ApiResource;

#[ApiResource]
final class Book
{
}
"#,
    )?;
    write_file(
        &root.join("src/Pair.php"),
        r#"<?php

namespace App;

#[AsMessage]
class Sent
{
}

class Quiet extends Sent
{
}
"#,
    )?;
    write_file(&root.join("src/notes.txt"), "@Entity class Ignored {}")?;
    Ok(())
}

#[test]
fn check_reports_leaks_in_stable_order() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    seed_project(dir.path())?;

    let (report, first_bytes) = run_json(dir.path(), &["check", "src"])?;
    assert_eq!(
        report,
        json!([
            { "file_path": "src/Api/Book.php", "class": "App\\Api\\Book", "attributes": ["ApiResource"] },
            { "file_path": "src/Entity/Foo.php", "class": "App\\Entity\\Foo", "attributes": [] },
            { "file_path": "src/Pair.php", "class": "App\\Sent", "attributes": ["AsMessage"] },
        ])
    );

    let (_, second_bytes) = run_json(dir.path(), &["-j", "1", "src"])?;
    assert_eq!(first_bytes, second_bytes);
    Ok(())
}

#[test]
fn check_applies_skip_options() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    seed_project(dir.path())?;

    let (report, _) = run_json(
        dir.path(),
        &[
            "check",
            "src",
            "--skip-type",
            "App\\Entity\\*",
            "--skip-attribute",
            "AsMessage",
        ],
    )?;
    let classes: Vec<&str> = report
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["class"].as_str().unwrap())
        .collect();
    assert_eq!(classes, vec!["App\\Api\\Book"]);
    Ok(())
}

#[test]
fn missing_root_fails_the_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let out = run(dir.path(), &["check", "does-not-exist"])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("root path is not accessible"));
    Ok(())
}

#[test]
fn fail_on_leaks_sets_exit_status() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    seed_project(dir.path())?;

    let out = run(dir.path(), &["check", "src", "--fail-on-leaks"])?;
    assert_eq!(out.status.code(), Some(2));

    let out = run(dir.path(), &["check", "src/Bar.php", "--fail-on-leaks"])?;
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(serde_json::from_slice::<Value>(&out.stdout)?, json!([]));
    Ok(())
}

#[test]
fn text_format_writes_summary_to_output_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    seed_project(dir.path())?;

    let out = run(
        dir.path(),
        &["check", "src", "--format", "text", "--output", "out/report.txt"],
    )?;
    assert!(out.status.success());
    let text = std::fs::read_to_string(dir.path().join("out/report.txt"))?;
    assert!(text.contains("src/Entity/Foo.php  App\\Entity\\Foo\n"));
    assert!(text.contains("leaks: 3\n"));
    assert!(text.contains("fingerprint: "));
    Ok(())
}
