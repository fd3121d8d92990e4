//! Integration tests for the command-line commands.
//!
//! Commands are run through their `run_*` functions with explicit paths and
//! the rendered output is checked.

use conftier::ConfigPaths;
use conftier::cli::init::{InitProjectArgs, InitUserArgs, run_init_project, run_init_user};
use conftier::cli::set::{SetArgs, run_set};
use conftier::cli::show::{GetArgs, ShowArgs, run_get, run_show};
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, ConfigPaths) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let project = temp.path().join("project");
    fs::create_dir_all(&project).unwrap();
    let paths = ConfigPaths::with_dirs("demo", &temp.path().join("home"), Some(project));
    (temp, paths)
}

fn set(key: &str, value: &str, project: bool) -> SetArgs {
    SetArgs {
        name: "demo".to_string(),
        key: key.to_string(),
        value: value.to_string(),
        project,
    }
}

fn get(key: &str) -> GetArgs {
    GetArgs {
        name: "demo".to_string(),
        key: key.to_string(),
    }
}

#[test]
fn test_init_then_show() {
    let (_temp, paths) = setup();

    let message = run_init_user(
        &InitUserArgs {
            name: "demo".to_string(),
        },
        paths.clone(),
    )
    .unwrap();
    assert!(message.contains("Created config file"));

    let message = run_init_project(
        &InitProjectArgs {
            name: "demo".to_string(),
            path: None,
        },
        paths.clone(),
    )
    .unwrap();
    assert!(message.contains(".demo"));
    assert!(paths.project_exists());

    let out = run_show(
        &ShowArgs {
            name: "demo".to_string(),
        },
        paths,
    )
    .unwrap();
    assert!(out.contains("(empty)"));
    assert!(out.contains("Effective (default):"));
}

#[test]
fn test_set_and_get_with_precedence() {
    let (_temp, paths) = setup();

    run_set(&set("server.port", "8080", false), paths.clone()).unwrap();
    run_set(&set("server.debug", "TRUE", false), paths.clone()).unwrap();
    run_set(&set("server.port", "9090", true), paths.clone()).unwrap();

    assert_eq!(run_get(&get("server.port"), paths.clone()).unwrap(), "9090");
    assert_eq!(run_get(&get("server.debug"), paths.clone()).unwrap(), "true");

    let user = fs::read_to_string(&paths.user_config).unwrap();
    assert!(user.contains("port: 8080"));
    assert!(user.contains("debug: true"));

    let out = run_show(
        &ShowArgs {
            name: "demo".to_string(),
        },
        paths,
    )
    .unwrap();
    assert!(out.contains("Effective (default < user < project):"));
    assert!(out.contains("port: 9090"));
}

#[test]
fn test_set_keeps_strings_and_floats() {
    let (_temp, paths) = setup();

    run_set(&set("ratio", "0.25", false), paths.clone()).unwrap();
    run_set(&set("label", "hello world", false), paths.clone()).unwrap();

    assert_eq!(run_get(&get("ratio"), paths.clone()).unwrap(), "0.25");
    assert_eq!(run_get(&get("label"), paths).unwrap(), "hello world");
}

#[test]
fn test_get_unknown_key() {
    let (_temp, paths) = setup();
    run_set(&set("present", "1", false), paths.clone()).unwrap();

    let err = run_get(&get("present.deeper"), paths).unwrap_err();
    assert!(err.to_string().contains("present.deeper"));
}
