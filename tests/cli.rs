use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::*;
use serde_json::Value;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

/// 两张图片：a 中有两个人，b 中有 a 里的第一个人
#[fixture]
fn dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("a.json")
        .write_str(
            r#"{
                "image_ref": "a.jpg",
                "detected_at": "2024-10-01T08:00:00Z",
                "embeddings": [[0.0, 0.0], [5.0, 5.0]],
                "boxes": [
                    {"top": 10, "right": 40, "bottom": 40, "left": 10},
                    {"top": 50, "right": 90, "bottom": 90, "left": 50}
                ]
            }"#,
        )
        .unwrap();
    dir.child("b.json")
        .write_str(
            r#"{
                "image_ref": "b.jpg",
                "detected_at": "2024-10-01T09:00:00Z",
                "embeddings": [[0.1, 0.0]]
            }"#,
        )
        .unwrap();
    dir.child("broken.json").write_str("{ not json").unwrap();
    dir.child("notes.txt").write_str("ignored").unwrap();
    dir
}

fn faces_json(conf_dir: &TempDir) -> Result<Vec<Value>> {
    let output = Command::cargo_bin("presence")?
        .arg("-c")
        .arg(conf_dir.path())
        .args(["faces", "--output-format", "json"])
        .output()?;
    assert!(output.status.success());
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[rstest]
fn run_and_report(dataset: TempDir) -> Result<()> {
    let conf_dir = TempDir::new()?;

    cargo_run!("presence", "-c", conf_dir.path(), "run", dataset.path())
        .success()
        .stderr(predicate::str::contains("broken.json"));
    conf_dir.child("presence.db").assert(predicate::path::exists());

    cargo_run!("presence", "-c", conf_dir.path(), "faces")
        .success()
        .stdout(predicate::str::is_match(r"(?m)^1\t2024-10-01T08:00:00\+00:00\t2024-10-01T09:00:00\+00:00\t2$")?)
        .stdout(predicate::str::is_match(r"(?m)^2\t.*\t1$")?);

    cargo_run!("presence", "-c", conf_dir.path(), "faces", "--id", "1")
        .success()
        .stdout(predicate::str::contains("a.jpg"))
        .stdout(predicate::str::contains("b.jpg"));

    cargo_run!("presence", "-c", conf_dir.path(), "images")
        .success()
        .stdout(predicate::str::is_match(r"(?m)^2\t.*\ta\.jpg$")?)
        .stdout(predicate::str::is_match(r"(?m)^1\t.*\tb\.jpg$")?);

    Ok(())
}

#[rstest]
#[case::loose("0.6", 2)]
#[case::strict("0.05", 3)]
#[case::zero("0", 3)]
fn run_threshold(dataset: TempDir, #[case] threshold: &str, #[case] faces: usize) -> Result<()> {
    let conf_dir = TempDir::new()?;

    cargo_run!("presence", "-c", conf_dir.path(), "run", "-t", threshold, dataset.path()).success();
    assert_eq!(faces_json(&conf_dir)?.len(), faces);

    Ok(())
}

#[rstest]
fn run_twice_reuses_faces(dataset: TempDir) -> Result<()> {
    let conf_dir = TempDir::new()?;

    cargo_run!("presence", "-c", conf_dir.path(), "run", dataset.child("a.json").path()).success();
    cargo_run!("presence", "-c", conf_dir.path(), "run", dataset.child("b.json").path()).success();

    let faces = faces_json(&conf_dir)?;
    assert_eq!(faces.len(), 2);
    assert_eq!(faces[0]["face_id"], 1);
    assert_eq!(faces[0]["sightings"], 2);

    // 重复处理同一张图片只会覆盖人脸数量
    cargo_run!("presence", "-c", conf_dir.path(), "run", dataset.child("a.json").path()).success();
    let output = Command::cargo_bin("presence")?
        .arg("-c")
        .arg(conf_dir.path())
        .args(["images", "--output-format", "json"])
        .output()?;
    let images: Vec<Value> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(images.len(), 2);

    Ok(())
}

#[rstest]
fn run_without_database(dataset: TempDir) -> Result<()> {
    let conf_dir = TempDir::new()?;

    cargo_run!("presence", "-c", conf_dir.path(), "run", "--no-db", dataset.path())
        .success()
        .stderr(predicate::str::contains("temp:1"));
    conf_dir.child("presence.db").assert(predicate::path::missing());

    cargo_run!("presence", "-c", conf_dir.path(), "faces")
        .failure()
        .stderr(predicate::str::contains("presence.db"));

    Ok(())
}

#[test]
fn invalid_arguments() -> Result<()> {
    let conf_dir = TempDir::new()?;

    cargo_run!("presence", "-c", conf_dir.path(), "run", "-t", "-0.5", conf_dir.path()).failure();
    cargo_run!("presence", "-c", conf_dir.path(), "run", conf_dir.path().join("missing")).failure();

    Ok(())
}
