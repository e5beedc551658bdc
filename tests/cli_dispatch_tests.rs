use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_frostguide")
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("frostguide-{name}-{stamp}.{ext}"))
}

fn frostguide() -> Command {
    let mut command = Command::new(bin());
    command.env_remove("FROSTGUIDE_TRACKS_DIR");
    command
}

#[test]
fn cost_command_dispatches_and_emits_json() {
    let output = frostguide()
        .args(["cost", "hero_gear_enhancement", "0", "100", "4"])
        .output()
        .expect("cost should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("cost should emit json");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["total"]["enhancement_xp"], 293_280);
}

#[test]
fn cost_command_table_view() {
    let output = frostguide()
        .args(["cost", "war_academy", "FC1", "FC2", "--table"])
        .output()
        .expect("cost should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("war_academy: FC1 -> FC2 (5 steps, x1)"));
    assert!(stdout.contains("resource\tper_unit\ttotal"));
    assert!(stdout.contains("build_time\t"));
}

#[test]
fn cost_command_reports_empty_range() {
    let output = frostguide()
        .args(["cost", "hero_gear_enhancement", "50", "50"])
        .output()
        .expect("cost should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("cost should emit json");
    assert_eq!(payload["status"], "empty");
}

#[test]
fn cost_command_fails_on_invalid_level() {
    let output = frostguide()
        .args(["cost", "chief_charm", "0", "17-5"])
        .output()
        .expect("cost should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid level '17-5'"));
}

#[test]
fn cost_command_returns_usage_without_levels() {
    let output = frostguide()
        .args(["cost", "chief_charm"])
        .output()
        .expect("cost should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: frostguide cost"));
}

#[test]
fn levels_command_lists_identifiers() {
    let output = frostguide()
        .args(["levels", "chief_charm"])
        .output()
        .expect("levels should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let levels: Vec<_> = stdout.lines().collect();
    assert_eq!(levels.len(), 53);
    assert_eq!(levels[0], "0");
    assert_eq!(levels[5], "4-1");
    assert_eq!(levels[52], "16-0");
}

#[test]
fn tracks_command_emits_json_array() {
    let output = frostguide().arg("tracks").output().expect("tracks should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("tracks should emit json");
    assert_eq!(payload.as_array().map(Vec::len), Some(6));
}

#[test]
fn export_command_writes_csv_file() {
    let path = unique_temp_path("export", "csv");
    let output = frostguide()
        .args(["export", "hero_gear_mastery", path.to_string_lossy().as_ref()])
        .output()
        .expect("export should run");

    assert_eq!(output.status.code(), Some(0));
    let csv = fs::read_to_string(&path).expect("export should write the file");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("index,level,category,essence_stones,mythic_gear,bonus")
    );
    assert_eq!(lines.count(), 20);

    let _ = fs::remove_file(path);
}

#[test]
fn validate_command_passes_on_shipped_data() {
    let output = frostguide()
        .arg("validate")
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation passed"));
}

#[test]
fn validate_command_returns_non_zero_on_invalid_data() {
    let dir = unique_temp_path("invalid-tracks", "d");
    fs::create_dir_all(&dir).expect("fixture dir should be created");
    fs::write(
        dir.join("broken.yaml"),
        "id: broken\nname: Broken\nkind: gear\naddressing: { scheme: integer }\nmax_quantity: 0\nsteps: []\n",
    )
    .expect("fixture should be written");

    let output = frostguide()
        .args(["validate", dir.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn unknown_command_prints_usage() {
    let output = frostguide().arg("fly").output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: frostguide"));
}
