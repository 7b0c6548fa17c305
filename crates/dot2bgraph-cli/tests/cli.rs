use assert_cmd::Command;
use std::io::Read;

#[test]
fn empty_digraph_produces_one_block() {
    let mut cmd = Command::cargo_bin("dot2bgraph").unwrap();
    let assert = cmd.write_stdin("digraph X {}").assert().success();
    let output = &assert.get_output().stdout;
    let json: serde_json::Value = serde_json::from_slice(output).unwrap();
    assert_eq!(json["blocks"].as_array().unwrap().len(), 1);
    assert_eq!(json["width"], 1);
    assert_eq!(json["height"], 1);
}

#[test]
fn cross_subgraph_edge_still_lays_out() {
    let mut cmd = Command::cargo_bin("dot2bgraph").unwrap();
    cmd.write_stdin("digraph X { a -> b; subgraph cluster_A { a; } }").assert().success();
}

#[test]
fn malformed_dot_exits_nonzero_with_error_message() {
    let mut cmd = Command::cargo_bin("dot2bgraph").unwrap();
    let assert = cmd.write_stdin("digraph X { a -> ").assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("Error"));
}

#[test]
fn padding_flags_widen_output() {
    let mut default_cmd = Command::cargo_bin("dot2bgraph").unwrap();
    let default_out = default_cmd.write_stdin("digraph X { a; }").assert().success();
    let default_json: serde_json::Value =
        serde_json::from_slice(&default_out.get_output().stdout).unwrap();

    let mut padded_cmd = Command::cargo_bin("dot2bgraph").unwrap();
    let padded_out =
        padded_cmd.args(["--padding-outer", "5"]).write_stdin("digraph X { a; }").assert().success();
    let padded_json: serde_json::Value =
        serde_json::from_slice(&padded_out.get_output().stdout).unwrap();

    assert!(padded_json["width"].as_i64().unwrap() > default_json["width"].as_i64().unwrap());
}

#[test]
fn output_flag_writes_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("out.json");

    let mut cmd = Command::cargo_bin("dot2bgraph").unwrap();
    cmd.args(["-o", out_path.to_str().unwrap()]).write_stdin("digraph X { a -> b; }").assert().success();

    let mut contents = String::new();
    std::fs::File::open(&out_path).unwrap().read_to_string(&mut contents).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["blocks"].as_array().unwrap().len(), 2);
}
