//! Integration tests for the pw CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STORY: &str = r#"{
    "title": "Harbor Test",
    "nodes": {
        "dock": {
            "title": "Dock",
            "text": "Gulls wheel overhead.",
            "choices": [
                {"text": "Walk to the square", "target": "square",
                 "effects": [{"type": "add_item", "value": "rope"}]},
                {"text": "Leave", "target": "quiet_end"}
            ]
        },
        "square": {
            "title": "Square",
            "text": "A fountain murmurs.",
            "choices": [
                {"text": "Remember the grove", "target": "dock", "action": "rest",
                 "effects": [{"type": "unlock_start", "value": "grove"}]}
            ]
        },
        "grove": {
            "title": "Grove",
            "text": "Moss underfoot.",
            "choices": [{"text": "Back to the water", "target": "dock"}]
        }
    },
    "starts": [
        {"id": "docks", "node": "dock", "title": "The Docks"},
        {"id": "grove", "node": "grove", "title": "The Grove",
         "locked": true, "locked_title": "A Hidden Path"}
    ],
    "endings": {"quiet_end": "A Quiet Life"}
}"#;

/// A temp directory holding `story.json`.
fn test_story() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("story.json"), STORY).unwrap();
    dir
}

fn pw() -> Command {
    Command::cargo_bin("pw").unwrap()
}

fn path_arg(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

fn paths(dir: &TempDir) -> (PathBuf, PathBuf, PathBuf) {
    (
        dir.path().join("story.json"),
        dir.path().join("profile.json"),
        dir.path().join("saves"),
    )
}

fn play(dir: &TempDir, extra: &[&str], input: &str) -> assert_cmd::assert::Assert {
    let (story, profile, saves) = paths(dir);
    let mut cmd = pw();
    cmd.arg("play")
        .arg(path_arg(&story))
        .args(["--profile", &path_arg(&profile)])
        .args(["--saves", &path_arg(&saves)])
        .args(extra)
        .write_stdin(input);
    cmd.assert()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_valid_story() {
    let dir = test_story();
    let (story, _, _) = paths(&dir);
    pw().args(["check", &path_arg(&story)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Harbor Test")
                .and(predicate::str::contains("3 nodes"))
                .and(predicate::str::contains("2 starts")),
        );
}

#[test]
fn check_reports_unknown_target() {
    let dir = TempDir::new().unwrap();
    let story = dir.path().join("story.json");
    fs::write(
        &story,
        r#"{"nodes": {"a": {"choices": [{"text": "go", "target": "nowhere"}]}},
            "starts": [{"node": "a"}]}"#,
    )
    .unwrap();

    pw().args(["check", &path_arg(&story)])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("nowhere").and(predicate::str::contains("1 reference problem")),
        );
}

#[test]
fn check_fails_on_malformed_story() {
    let dir = TempDir::new().unwrap();
    let story = dir.path().join("story.json");
    fs::write(&story, "{ this is not json").unwrap();

    pw().args(["check", &path_arg(&story)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load story"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_reaches_an_ending_and_records_it() {
    let dir = test_story();
    play(&dir, &[], "2\n")
        .success()
        .stdout(
            predicate::str::contains("Dock")
                .and(predicate::str::contains("1. Walk to the square"))
                .and(predicate::str::contains("Ending reached: A Quiet Life")),
        );

    let profile = fs::read_to_string(dir.path().join("profile.json")).unwrap();
    assert!(profile.contains("A Quiet Life"));
}

#[test]
fn play_applies_effects_and_autosaves() {
    let dir = test_story();
    play(&dir, &[], "1\nq\n")
        .success()
        .stdout(predicate::str::contains("[+] rope x1 (now 1)").and(predicate::str::contains("Square")));

    let autosave = fs::read_to_string(dir.path().join("saves/autosave/save.json")).unwrap();
    assert!(autosave.contains("\"current_node\": \"square\""));
    assert!(autosave.contains("\"version\": 2"));
}

#[test]
fn play_rejects_out_of_range_choice() {
    let dir = test_story();
    play(&dir, &[], "9\nnope\nq\n")
        .success()
        .stdout(
            predicate::str::contains("Pick a number from 1 to 2")
                .and(predicate::str::contains("Unknown command 'nope'")),
        );
}

#[test]
fn quick_save_then_resume_from_slot() {
    let dir = test_story();
    play(&dir, &[], "1\ns\nq\n")
        .success()
        .stdout(predicate::str::contains("Saved."));
    assert!(dir.path().join("saves/quick/save.json").exists());

    play(&dir, &["--load", "quick"], "q\n")
        .success()
        .stdout(
            predicate::str::contains("A fountain murmurs.")
                .and(predicate::str::contains("1. Remember the grove")),
        );
}

#[test]
fn resuming_after_the_story_changed_warns() {
    let dir = test_story();
    play(&dir, &[], "1\ns\nq\n").success();

    let story = dir.path().join("story.json");
    let edited = STORY.replace("A fountain murmurs.", "The fountain is dry.");
    fs::write(&story, edited).unwrap();

    play(&dir, &["--load", "quick"], "q\n")
        .success()
        .stdout(
            predicate::str::contains("different version of the story")
                .and(predicate::str::contains("The fountain is dry.")),
        );
}

#[test]
fn unknown_target_is_reported_and_play_continues() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("story.json"),
        r#"{"nodes": {"a": {"title": "Hall", "choices": [
                {"text": "Through the arch", "target": "nowhere"},
                {"text": "Leave", "target": "out"}
            ]}},
            "starts": [{"node": "a"}],
            "endings": {"out": "Outside"}}"#,
    )
    .unwrap();

    play(&dir, &[], "1\n2\n")
        .success()
        .stdout(
            predicate::str::contains("[?] node 'nowhere' does not exist")
                .and(predicate::str::contains("Ending reached: Outside")),
        );
}

#[test]
fn quick_load_without_save_reports_failure() {
    let dir = test_story();
    play(&dir, &[], "l\nq\n")
        .success()
        .stdout(predicate::str::contains("Load failed"));
}

#[test]
fn locked_start_is_refused_until_unlocked() {
    let dir = test_story();
    play(&dir, &["--start", "grove"], "")
        .failure()
        .stderr(predicate::str::contains("start 'grove' is locked"));

    play(&dir, &[], "1\n1\nq\n")
        .success()
        .stdout(predicate::str::contains("Origin unlocked: The Grove"));

    play(&dir, &["--start", "grove"], "q\n")
        .success()
        .stdout(predicate::str::contains("Moss underfoot."));
}

#[test]
fn config_file_changes_tick_costs() {
    let dir = test_story();
    let config = dir.path().join("engine.json");
    fs::write(&config, r#"{"tick_costs": {"move": 10}, "starting_hp": 3}"#).unwrap();

    play(&dir, &["--config", &path_arg(&config)], "1\nq\n").success();

    let autosave = fs::read_to_string(dir.path().join("saves/autosave/save.json")).unwrap();
    assert!(autosave.contains("\"tick_counter\": 10"));
    assert!(autosave.contains("\"hp\": 3"));
}

// ---------------------------------------------------------------------------
// starts / profile
// ---------------------------------------------------------------------------

#[test]
fn starts_shows_lock_state() {
    let dir = test_story();
    let (story, profile, _) = paths(&dir);
    pw().args(["starts", &path_arg(&story), "--profile", &path_arg(&profile)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("The Docks")
                .and(predicate::str::contains("A Hidden Path (locked)"))
                .and(predicate::str::contains("The Grove").not()),
        );
}

#[test]
fn profile_lists_progress() {
    let dir = test_story();
    let (_, profile, _) = paths(&dir);
    pw().args(["profile", "--profile", &path_arg(&profile)])
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"));

    play(&dir, &[], "1\n1\n2\n").success();

    pw().args(["profile", "--profile", &path_arg(&profile)])
        .assert()
        .success()
        .stdout(predicate::str::contains("grove").and(predicate::str::contains("A Quiet Life")));
}
