use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tempfile::tempdir;

fn run_viewer(args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_gallery_viewer"))
        .arg("--headless")
        .args(args)
        .output()
        .context("executing gallery_viewer")?;
    assert!(
        output.status.success(),
        "gallery_viewer exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(output)
}

fn read_layout(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).context("parsing layout JSON")
}

fn write_config(dir: &Path, seed: u64) -> Result<String> {
    let config = json!({
        "scene": { "seed": seed, "plane_count": 4 },
        "hover": { "feedback": "wireframe" },
        "media": [
            { "identifier": "rainy", "preview": "loops/loop_rainy.ogv", "full": "full/rainy_full.ogv" },
            { "identifier": "boy", "preview": "loops/loop_boy_portrait.ogv", "full": "full/boy_full.ogv" }
        ]
    });
    let path = dir.join(format!("gallery-{seed}.json"));
    fs::write(&path, serde_json::to_vec_pretty(&config)?)?;
    Ok(path.to_string_lossy().into_owned())
}

#[test]
fn headless_layout_reflects_config() -> Result<()> {
    let dir = tempdir()?;
    let config = write_config(dir.path(), 11)?;
    let layout_path = dir.path().join("layout.json");

    run_viewer(&[
        "--config",
        &config,
        "--dump-layout",
        layout_path.to_str().context("layout path is not UTF-8")?,
    ])?;

    let layout = read_layout(&layout_path)?;
    assert_eq!(layout["hover_feedback"], "wireframe");
    let items = layout["items"].as_array().context("items array")?;
    assert_eq!(items.len(), 4);

    let identifiers: Vec<&str> = items
        .iter()
        .map(|item| item["media_identifier"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(identifiers, vec!["rainy", "boy", "rainy", "boy"]);

    for item in items {
        assert_eq!(item["playback_state"], "Initial");
        assert_eq!(item["bound_variant"], "preview");
        let home: Vec<f64> = serde_json::from_value(item["home_position"].clone())?;
        assert!(home.iter().all(|v| v.abs() <= 1.5), "home {home:?}");
        let axis: Vec<f64> = serde_json::from_value(item["rotation_axis"].clone())?;
        let length = axis.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((length - 1.0).abs() < 1e-4, "axis {axis:?}");
        let speed = item["rotation_speed"].as_f64().context("speed")?;
        assert!((0.005 - 1e-6..=0.007 + 1e-6).contains(&speed), "speed {speed}");
    }
    let portrait: Vec<f64> = serde_json::from_value(items[1]["size"].clone())?;
    assert!(portrait[0] < portrait[1], "portrait plane should be taller: {portrait:?}");
    Ok(())
}

#[test]
fn same_seed_reproduces_layout() -> Result<()> {
    let dir = tempdir()?;
    let config = write_config(dir.path(), 5)?;
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    for path in [&first, &second] {
        run_viewer(&[
            "--config",
            &config,
            "--dump-layout",
            path.to_str().context("layout path is not UTF-8")?,
        ])?;
    }
    assert_eq!(read_layout(&first)?, read_layout(&second)?);
    Ok(())
}

#[test]
fn media_root_scan_feeds_the_gallery() -> Result<()> {
    let dir = tempdir()?;
    let media = dir.path().join("media");
    fs::create_dir_all(&media)?;
    for name in ["loop_tide.ogv", "tide_full.ogv", "loop_orphan.ogv"] {
        fs::write(media.join(name), b"")?;
    }
    let layout_path = dir.path().join("layout.json");
    let frame_path = dir.path().join("frame.png");

    let output = run_viewer(&[
        "--media-root",
        media.to_str().context("media path is not UTF-8")?,
        "--seed",
        "1",
        "--dump-layout",
        layout_path.to_str().context("layout path is not UTF-8")?,
        "--dump-frame",
        frame_path.to_str().context("frame path is not UTF-8")?,
    ])?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("1 paired subject(s), 1 preview-only"),
        "catalog summary missing: {stdout}"
    );

    let layout = read_layout(&layout_path)?;
    let items = layout["items"].as_array().context("items array")?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["media_identifier"], "tide");
    let source = items[0]["source"].as_str().context("bound source")?;
    assert!(source.ends_with("loop_tide.ogv"), "source {source}");

    // The placeholder files hold no video, so no frame gets written.
    assert!(!frame_path.exists());
    Ok(())
}

#[test]
fn empty_gallery_still_starts() -> Result<()> {
    let dir = tempdir()?;
    let layout_path = dir.path().join("layout.json");
    run_viewer(&[
        "--dump-layout",
        layout_path.to_str().context("layout path is not UTF-8")?,
    ])?;
    let layout = read_layout(&layout_path)?;
    assert_eq!(layout["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(layout["viewport"], json!([1280.0, 720.0]));
    Ok(())
}
