use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;
use tempfile::TempDir;

fn handfont() -> Command {
    Command::cargo_bin("handfont").unwrap()
}

fn save_drawing(dir: &Path, name: &str, ink: impl Fn(i32, i32) -> bool) -> PathBuf {
    let img = GrayImage::from_fn(120, 120, |x, y| {
        Luma([if ink(x as i32, y as i32) { 0 } else { 255 }])
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn disc(dir: &Path) -> PathBuf {
    save_drawing(dir, "disc.png", |x, y| (x - 60).pow(2) + (y - 60).pow(2) <= 40 * 40)
}

fn bar(dir: &Path) -> PathBuf {
    save_drawing(dir, "bar.png", |x, y| (50..70).contains(&x) && (10..110).contains(&y))
}

#[test]
fn help_lists_subcommands() {
    handfont()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("phrase"))
        .stdout(predicate::str::contains("draw"))
        .stdout(predicate::str::contains("glyph"))
        .stdout(predicate::str::contains("build"));
}

#[test]
fn glyph_prints_outline_json() {
    let dir = TempDir::new().unwrap();
    let image = disc(dir.path());
    let out = handfont()
        .args(["glyph", "--char", "O", "--image"])
        .arg(&image)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["paths"].as_array().unwrap().len(), 1);
    assert_eq!(json["paths"][0]["is_hole"], false);
    assert!(json["advance_width"].as_u64().unwrap() > 0);
    assert!(json["lsb"].is_u64());
}

#[test]
fn glyph_rejects_non_letters() {
    let dir = TempDir::new().unwrap();
    let image = disc(dir.path());
    handfont()
        .args(["glyph", "--char", "ab", "--image"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("single letter"));
}

#[test]
fn draw_writes_both_font_files() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("fonts");
    let o = disc(dir.path());
    let l = bar(dir.path());
    handfont()
        .args(["draw", "--family", "Pen Test", "--out-dir"])
        .arg(&out_dir)
        .arg("--glyph")
        .arg(format!("o={}", o.display()))
        .arg("--glyph")
        .arg(format!("l={}", l.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("characters: lo (2)"));

    let ttf = std::fs::read(out_dir.join("PenTest-Regular.ttf")).unwrap();
    let woff2 = std::fs::read(out_dir.join("PenTest-Regular.woff2")).unwrap();
    assert_eq!(&ttf[..4], &[0, 1, 0, 0]);
    assert_eq!(&woff2[..4], b"wOF2");
}

#[test]
fn draw_rejects_malformed_glyph_argument() {
    let dir = TempDir::new().unwrap();
    handfont()
        .args(["draw", "--glyph", "no-equals-sign", "--out-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected CHAR=PATH"));
}

#[test]
fn build_assembles_outline_json() {
    let dir = TempDir::new().unwrap();
    let glyphs = dir.path().join("glyphs.json");
    std::fs::write(
        &glyphs,
        r#"{
            "i": {
                "paths": [{ "points": [[40, -200], [40, 800], [240, 800], [240, -200]], "is_hole": false }],
                "advance_width": 280,
                "lsb": 40
            }
        }"#,
    )
    .unwrap();
    handfont()
        .args(["build", "--glyphs"])
        .arg(&glyphs)
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("MyHandwriting-Regular.ttf"));
    assert!(dir.path().join("MyHandwriting-Regular.woff2").exists());
}

#[test]
fn build_with_no_glyphs_fails_with_cause() {
    let dir = TempDir::new().unwrap();
    let glyphs = dir.path().join("empty.json");
    std::fs::write(&glyphs, "{}").unwrap();
    handfont()
        .args(["build", "--glyphs"])
        .arg(&glyphs)
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("font generation failed"))
        .stderr(predicate::str::contains("caused by"));
}

#[test]
fn config_file_sets_the_output_name() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("handfont.json");
    std::fs::write(&config, r#"{ "font": { "family_name": "Ledger", "style_name": "Bold" } }"#)
        .unwrap();
    let o = disc(dir.path());
    handfont()
        .arg("--config")
        .arg(&config)
        .args(["draw", "--out-dir"])
        .arg(dir.path())
        .arg("--glyph")
        .arg(format!("o={}", o.display()))
        .assert()
        .success();
    assert!(dir.path().join("Ledger-Bold.ttf").exists());
}

#[test]
fn unreadable_photo_reports_invalid_image() {
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("photo.png");
    std::fs::write(&photo, b"definitely not a png").unwrap();
    handfont()
        .args(["phrase", "--phrase", "hello", "--image"])
        .arg(&photo)
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid image"));
}
