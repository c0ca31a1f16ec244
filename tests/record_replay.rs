//! Cassette replay integration tests, zero network I/O.
//!
//! Every test sets `ROOMCRAFT_REPLAY` to a cassette file so the binary never
//! contacts the live API.

use assert_cmd::Command;
use base64::Engine;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

/// A JFIF header; enough for format sniffing on upload.
const JPEG_HEADER: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01];

fn cmd(cassette: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("roomcraft");
    cmd.env("ROOMCRAFT_REPLAY", cassette.to_str().unwrap())
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("ROOMCRAFT_REC")
        .env("ROOMCRAFT_CONFIG", "/nonexistent/roomcraft/config.toml");
    cmd
}

/// Absolute path to the `test_fixtures` directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

/// Fresh scratch directory holding a `living-room.jpg` upload.
fn workspace(name: &str) -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("roomcraft_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let image = dir.join("living-room.jpg");
    std::fs::write(&image, JPEG_HEADER).unwrap();
    (dir, image)
}

#[test]
fn scripted_redesign_saves_rendering() {
    let (dir, image) = workspace("happy");
    let out = dir.join("redesign.jpg");

    cmd(&fixtures_dir().join("redesign.cassette.yaml"))
        .args(["-m", "make it airy", "--visualize", "-o", out.to_str().unwrap()])
        .arg(&image)
        .assert()
        .success()
        .stdout(predicate::str::contains("Designer: **Room Analysis:**"))
        .stdout(predicate::str::contains("- Style: Rustic farmhouse"))
        .stdout(predicate::str::contains("How would you like to redesign it?"))
        .stdout(predicate::str::contains("You: make it airy"))
        .stdout(predicate::str::contains("1. www.rattan.example <https://www.rattan.example/chairs>"))
        .stdout(predicate::str::contains("2. Linen sofa guide <https://linen.example/sofas>"))
        .stderr(predicate::str::contains("Saved:"));

    let data = std::fs::read(&out).unwrap();
    assert_eq!(&data[..3], &[0xFF, 0xD8, 0xFF], "rendering should be the replayed JPEG");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn auto_filename_uses_image_stem() {
    let (dir, image) = workspace("autofile");

    cmd(&fixtures_dir().join("redesign.cassette.yaml"))
        .args(["-m", "make it airy", "--visualize"])
        .arg(&image)
        .current_dir(&dir)
        .assert()
        .success();

    let names: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n != "living-room.jpg")
        .collect();
    assert_eq!(names.len(), 1, "exactly one rendering should be created: {names:?}");
    assert!(names[0].starts_with("living-room-redesign-"), "got: {}", names[0]);
    assert!(names[0].ends_with(".jpg"), "got: {}", names[0]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn data_uri_upload_is_accepted() {
    let (dir, _) = workspace("data_uri");
    let out = dir.join("from-uri.jpg");

    cmd(&fixtures_dir().join("redesign.cassette.yaml"))
        .args(["-m", "make it airy", "--visualize", "-o", out.to_str().unwrap()])
        .arg("data:image/jpeg;base64,/9j/4AAQSkZJRgAB")
        .assert()
        .success()
        .stderr(predicate::str::contains("Room: inline image"));

    assert!(out.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn analysis_failure_reports_error() {
    let (dir, image) = workspace("analysis_failure");

    cmd(&fixtures_dir().join("analysis_failure.cassette.yaml"))
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Failed to analyze the image. Please try again."))
        .stdout(predicate::str::contains("Room Analysis").not());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn chat_failure_appends_fallback_reply() {
    let (dir, image) = workspace("chat_failure");

    cmd(&fixtures_dir().join("chat_failure.cassette.yaml"))
        .args(["-m", "make it airy"])
        .arg(&image)
        .assert()
        .failure()
        .stdout(predicate::str::contains("You: make it airy"))
        .stdout(predicate::str::contains(
            "Designer: Sorry, I encountered an error. Could you try rephrasing your request?",
        ))
        .stderr(predicate::str::contains(
            "Error: Failed to get a response from the design assistant.",
        ));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn visualize_before_any_request_is_rejected() {
    let (dir, image) = workspace("early_visualize");

    cmd(&fixtures_dir().join("chat_failure.cassette.yaml"))
        .arg("--visualize")
        .arg(&image)
        .current_dir(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to visualize yet"));

    let files = std::fs::read_dir(&dir).unwrap().count();
    assert_eq!(files, 1, "no rendering should be written");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unreadable_image_reports_analysis_error() {
    let (dir, _) = workspace("unreadable");
    let missing = dir.join("nope.jpg");

    cmd(&fixtures_dir().join("redesign.cassette.yaml"))
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to analyze the image"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn save_analysis_writes_text() {
    let (dir, image) = workspace("save_analysis");
    let analysis = dir.join("analysis.md");

    cmd(&fixtures_dir().join("chat_failure.cassette.yaml"))
        .args(["--save-analysis", analysis.to_str().unwrap()])
        .arg(&image)
        .assert()
        .success()
        .stderr(predicate::str::contains("Analysis saved:"));

    let text = std::fs::read_to_string(&analysis).unwrap();
    assert_eq!(text, "**Room Analysis:**\n- Style: Mid-century modern\n");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unwritable_analysis_path_fails_the_run() {
    let (dir, image) = workspace("save_analysis_unwritable");
    let analysis = dir.join("missing-dir").join("analysis.md");

    cmd(&fixtures_dir().join("chat_failure.cassette.yaml"))
        .args(["--save-analysis", analysis.to_str().unwrap()])
        .arg(&image)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Room Analysis"))
        .stderr(predicate::str::contains("Error: I/O error"));

    assert!(!analysis.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn interactive_session_reads_stdin() {
    let (dir, image) = workspace("interactive");
    let out = dir.join("saved-again.jpg");

    cmd(&fixtures_dir().join("redesign.cassette.yaml"))
        .arg("-i")
        .arg(&image)
        .current_dir(&dir)
        .write_stdin(format!("make it airy\n/visualize\n/save {}\n/quit\n", out.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("You: make it airy"))
        .stderr(predicate::str::contains("Saved:"));

    assert!(out.exists(), "/save should write the rendering");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn format_png_converts_rendering() {
    // Real 1x1 JPEG so the conversion path has something to decode
    let jpeg_bytes = {
        let img = image::DynamicImage::new_rgb8(1, 1);
        let mut buf = std::io::Cursor::new(Vec::<u8>::new());
        img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
        buf.into_inner()
    };
    let b64 = base64::engine::general_purpose::STANDARD.encode(&jpeg_bytes);

    let fixture = std::fs::read_to_string(fixtures_dir().join("redesign.cassette.yaml")).unwrap();
    let cassette_content = fixture.replace("data: \"/9j/4AAQSkZJRgAB\"", &format!("data: \"{b64}\""));
    assert_ne!(cassette_content, fixture);

    let (dir, image) = workspace("convert");
    let cassette_path = dir.join("convert.cassette.yaml");
    std::fs::write(&cassette_path, &cassette_content).unwrap();
    let out = dir.join("redesign.png");

    cmd(&cassette_path)
        .args(["-m", "make it airy", "--visualize", "--format", "png", "-o", out.to_str().unwrap()])
        .arg(&image)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved:"));

    let data = std::fs::read(&out).unwrap();
    assert_eq!(
        &data[..8],
        &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        "Output should be a valid PNG file"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
