mod common;

use anyhow::Result;
use common::{read, write_file};
use std::process::Command;
use tempfile::TempDir;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_reorder-initializers"))
}

#[test]
fn test_cli_help() {
    let output = binary().arg("--help").output().expect("Failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("member declaration order"));
    assert!(stdout.contains("--dry-run"));
    assert!(stdout.contains("--build-path"));
}

#[test]
fn test_cli_requires_paths() {
    let output = binary().output().expect("Failed to run binary");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_rewrites_directory_and_prints_json() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = write_file(
        temp_dir.path(),
        "src/t.cpp",
        "struct T {\n  int a;\n  int b;\n  T() : b(2), a(1) {}\n};\n",
    );
    write_file(temp_dir.path(), "src/notes.txt", "T() : b(2), a(1) {}");

    let output = binary()
        .current_dir(temp_dir.path())
        .args(["--json", "src"])
        .output()?;

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(summary["total_edits"], 1);
    assert_eq!(summary["files_written"], 1);
    assert_eq!(summary["files"].as_array().map(|f| f.len()), Some(1));
    assert!(read(&path).contains("T() : a(1),\nb(2){}"));
    Ok(())
}

#[test]
fn test_cli_dry_run_leaves_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let source = "struct T {\n  int a;\n  int b;\n  T() : b(2), a(1) {}\n};\n";
    let path = write_file(temp_dir.path(), "t.cc", source);

    let output = binary()
        .current_dir(temp_dir.path())
        .args(["--dry-run", "t.cc"])
        .output()?;

    assert!(output.status.success());
    assert_eq!(read(&path), source);
    Ok(())
}

#[test]
fn test_cli_parse_failure_exit_status() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_file(temp_dir.path(), "bad.cpp", "struct T { int a; };\nint broken( {\n");

    let output = binary()
        .current_dir(temp_dir.path())
        .arg("bad.cpp")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.cpp"));
    Ok(())
}

#[test]
fn test_cli_passes_compiler_include_args() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_file(
        temp_dir.path(),
        "include/v.h",
        "struct V {\n  int x;\n  int y;\n  V();\n};\n",
    );
    let main = write_file(
        temp_dir.path(),
        "v.cpp",
        "#include \"v.h\"\nV::V() : y(1), x(0) {}\n",
    );

    let output = binary()
        .current_dir(temp_dir.path())
        .args(["v.cpp", "--", "-Iinclude", "-std=c++17"])
        .output()?;

    assert!(output.status.success());
    assert!(read(&main).contains("V::V() : x(0),\ny(1){}"));
    Ok(())
}

#[test]
fn test_cli_reads_project_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_file(
        temp_dir.path(),
        ".reorder-initializers.yml",
        "includeDirs: [headers]\nexclude: [\"gen/**\"]\n",
    );
    write_file(
        temp_dir.path(),
        "headers/w.h",
        "struct W {\n  int p;\n  int q;\n  W();\n};\n",
    );
    let main = write_file(
        temp_dir.path(),
        "src/w.cpp",
        "#include \"w.h\"\nW::W() : q(1), p(0) {}\n",
    );
    let generated_source = "struct G { int a; int b; G() : b(1), a(0) {} };\n";
    let generated = write_file(temp_dir.path(), "gen/g.cpp", generated_source);

    let output = binary().current_dir(temp_dir.path()).arg(".").output()?;

    assert!(output.status.success());
    assert!(read(&main).contains("W::W() : p(0),\nq(1){}"));
    assert_eq!(read(&generated), generated_source);
    Ok(())
}
