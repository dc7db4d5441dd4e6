use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "stagedist-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

const OUTPUTS: [&str; 3] = [
    "config_block_floor_distribution.csv",
    "config_obj_in_block_distribution.csv",
    "config_floor_in_block_distribution.csv",
];

fn write_inputs(dir: &Path, obj_in_block: &str) {
    std::fs::create_dir_all(dir).expect("create fixture dir");
    std::fs::write(
        dir.join("config_base.json"),
        r#"{"stageMaxLT":{"value":{"x":0,"y":0}},"stageMaxRB":{"value":{"x":9,"y":9}}}"#,
    )
    .expect("write stage config");
    std::fs::write(
        dir.join("config_block_floor_map.csv"),
        "rangeType,point1X,point1Y,point2X,point2Y,distance,floorNone,floorWater,floorMagma,blockL1,blockL2,blockL3,blockL4\n\
         range,,,,,,ratio,,,,,,\n\
         distance,5,5,0,0,2,1,0,0,1,1,0,0\n\
         rect,0,0,9,9,0,2,1,0,1,0,0,0\n",
    )
    .expect("write block floor");
    std::fs::write(dir.join("config_obj_in_block.csv"), obj_in_block).expect("write objects");
    std::fs::write(
        dir.join("config_floor_in_block_map.csv"),
        "h\nh\nrect,0,0,9,9,0,1,1,1\n",
    )
    .expect("write floors");
}

const OBJECTS: &str = "h\nh\nrect,0,0,9,9,0,10,,3,1,1,-1,20,4,2,-1,2,50\n";

fn run_cli(dir: &Path, out_dir: &Path, extra: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_stagedist");
    Command::new(exe)
        .arg(dir.join("config_block_floor_map.csv"))
        .arg(dir.join("config_obj_in_block.csv"))
        .arg(dir.join("config_floor_in_block_map.csv"))
        .arg("--stage-config")
        .arg(dir.join("config_base.json"))
        .arg("--out-dir")
        .arg(out_dir)
        .args(extra)
        .output()
        .expect("run cli")
}

fn digest_outputs(out_dir: &Path) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for name in OUTPUTS {
        hasher.update(std::fs::read(out_dir.join(name)).expect("read output"));
    }
    hasher.finalize().to_vec()
}

#[test]
fn cli_writes_three_distribution_files() {
    let dir = temp_path("ok");
    write_inputs(&dir, OBJECTS);
    let out_dir = dir.join("out");
    let output = run_cli(&dir, &out_dir, &["--report", "json"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let block = std::fs::read_to_string(out_dir.join(OUTPUTS[0])).expect("read block floor");
    let mut lines = block.lines();
    assert!(
        lines
            .next()
            .is_some_and(|header| header.starts_with("rangeType, point1X, point1Y"))
    );
    // diamond of radius 2 around (5,5), then the rest of the 10x10 stage
    assert_eq!(lines.next(), Some("distance,5,5,0,0,2,13,5,0,0,4,4,0,0"));
    assert_eq!(lines.next(), Some("rect,0,0,9,9,0,87,45,21,0,21,0,0,0"));

    let objects = std::fs::read_to_string(out_dir.join(OUTPUTS[1])).expect("read objects");
    assert!(objects.lines().next().is_some_and(|h| h.contains("jewels, obj1")));
    assert!(objects.contains("rect,0,0,9,9,0,29,2,3,1,5,4,2,2"));

    let floors = std::fs::read_to_string(out_dir.join(OUTPUTS[2])).expect("read floors");
    assert!(floors.contains("rect,0,0,9,9,0,29,11,9,9"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"claimed_points\": 100"));
}

#[test]
fn cli_runs_are_byte_identical() {
    let dir = temp_path("repeat");
    write_inputs(&dir, OBJECTS);
    let first = dir.join("first");
    let second = dir.join("second");
    assert!(run_cli(&dir, &first, &[]).status.success());
    assert!(run_cli(&dir, &second, &[]).status.success());
    assert_eq!(digest_outputs(&first), digest_outputs(&second));
}

#[test]
fn cli_malformed_row_writes_nothing() {
    let dir = temp_path("malformed");
    write_inputs(&dir, "h\nh\nrect,0,0,9,9,0,10,,3,1,1\n");
    let out_dir = dir.join("out");
    let output = run_cli(&dir, &out_dir, &[]);
    assert!(!output.status.success());
    for name in OUTPUTS {
        assert!(!out_dir.join(name).exists(), "{name} should not exist");
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("obj_in_block"));
}

#[test]
fn cli_missing_stage_config_fails() {
    let dir = temp_path("no-stage");
    write_inputs(&dir, OBJECTS);
    std::fs::remove_file(dir.join("config_base.json")).expect("remove stage config");
    let output = run_cli(&dir, &dir.join("out"), &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("config_base.json"));
}

#[test]
fn cli_rejects_legacy_with_allocation() {
    let dir = temp_path("conflict");
    write_inputs(&dir, OBJECTS);
    let output = run_cli(
        &dir,
        &dir.join("out"),
        &["--legacy", "--allocation", "round-nearest"],
    );
    assert!(!output.status.success());
}
