use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hepplot"))
}

fn repo_root() -> PathBuf {
    // crates/hp-cli -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").canonicalize().unwrap()
}

fn fixture_path(name: &str) -> PathBuf {
    repo_root().join("tests/fixtures").join(name)
}

fn tmp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("hepplot_cli_{}_{}_{}", std::process::id(), nanos, name));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn stdout_json(out: &Output) -> serde_json::Value {
    assert!(out.status.success(), "stderr:\n{}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice(&out.stdout).expect("stdout should be JSON")
}

#[test]
fn plot_writes_requested_formats() {
    let dir = tmp_path("plot");
    let out = run(&[
        "plot",
        "--input",
        fixture_path("plot_inputs.json").to_str().unwrap(),
        "--config",
        fixture_path("viz_signif.yaml").to_str().unwrap(),
        "--name",
        "mjj",
        "--plotdir",
        dir.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr:\n{}", String::from_utf8_lossy(&out.stderr));

    let svg_path = dir.join("mjj_Internal.svg");
    let json_path = dir.join("mjj_Internal.json");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("mjj_Internal.svg"));
    assert!(!dir.join("mjj_Internal.pdf").exists());

    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains("Signal region"));
    assert!(svg.contains("#cc0000"));

    let art: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(art["schema_version"], "hepplotting_comparison_v1");
    assert_eq!(art["ratio"]["kind"], "signif");
    // stack is drawn bottom-up: last listed background first
    assert_eq!(art["stack"][0]["name"], "wjets");
    assert_eq!(art["legend"]["entries"][0]["label"], "Data (101)");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn plot_rejects_bad_ratio_type() {
    let cfg = tmp_path("bad.yaml");
    let plotdir = tmp_path("bad_out");
    std::fs::write(&cfg, "comparison:\n  ratio_type: SoverBee\n").unwrap();
    let out = run(&[
        "plot",
        "--input",
        fixture_path("plot_inputs.json").to_str().unwrap(),
        "--config",
        cfg.to_str().unwrap(),
        "--name",
        "x",
        "--plotdir",
        plotdir.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("SoverBee"), "stderr:\n{stderr}");
    assert!(!plotdir.exists());
    let _ = std::fs::remove_file(&cfg);
}

#[test]
fn plot_without_signal_fails_before_writing() {
    let input = tmp_path("nosig.json");
    let mut inputs: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(fixture_path("plot_inputs.json")).unwrap())
            .unwrap();
    inputs["signals"] = serde_json::json!([]);
    std::fs::write(&input, inputs.to_string()).unwrap();
    let cfg = tmp_path("soverb.yaml");
    std::fs::write(&cfg, "comparison:\n  ratio_type: SoverB\n").unwrap();
    let plotdir = tmp_path("nosig_out");

    let out = run(&[
        "plot",
        "--input",
        input.to_str().unwrap(),
        "--config",
        cfg.to_str().unwrap(),
        "--name",
        "x",
        "--plotdir",
        plotdir.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no signal is specified"), "stderr:\n{stderr}");
    assert!(!plotdir.exists());
    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&cfg);
}

#[test]
fn sum_adds_errors_in_quadrature() {
    let out = run(&["sum", "--input", fixture_path("histograms.json").to_str().unwrap()]);
    let v = stdout_json(&out);
    assert_eq!(v["name"], "tot");
    let contents: Vec<f64> =
        v["contents"].as_array().unwrap().iter().map(|x| x.as_f64().unwrap()).collect();
    assert_eq!(contents, [0.0, 1.0, 13.0, 25.0, 0.0]);
    let err3 = v["errors"][3].as_f64().unwrap();
    assert!((err3 - 5.0).abs() < 1e-12);
}

#[test]
fn syst_inflates_errors() {
    let out = run(&[
        "syst",
        "--input",
        fixture_path("histogram_mev.json").to_str().unwrap(),
        "--fraction",
        "0.5",
    ]);
    let v = stdout_json(&out);
    assert_eq!(v["name"], "mjj_syst");
    // bin 2: sqrt(2^2 + (7*0.5)^2)
    let err2 = v["errors"][2].as_f64().unwrap();
    assert!((err2 - (4.0_f64 + 12.25).sqrt()).abs() < 1e-12);
}

#[test]
fn rescale_folds_overflow_to_file() {
    let output = tmp_path("rescaled.json");
    let out = run(&[
        "rescale",
        "--input",
        fixture_path("histogram_mev.json").to_str().unwrap(),
        "--scale",
        "0.001",
        "--add-overflow",
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr:\n{}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(v["name"], "mjj_goodbin");
    assert_eq!(v["bin_edges"][3].as_f64().unwrap(), 3.0);
    assert_eq!(v["contents"][3].as_f64().unwrap(), 5.0);
    assert_eq!(v["contents"][4].as_f64().unwrap(), 0.0);
    assert!((v["errors"][3].as_f64().unwrap() - 2f64.sqrt()).abs() < 1e-12);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn rescale_rejects_non_positive_scale() {
    let out = run(&[
        "rescale",
        "--input",
        fixture_path("histogram_mev.json").to_str().unwrap(),
        "--scale",
        "0",
    ]);
    assert!(!out.status.success());
}

#[test]
fn demo_writes_all_outputs() {
    let dir = tmp_path("demo");
    let out = run(&["demo", "--plotdir", dir.to_str().unwrap(), "--seed", "11"]);
    assert!(out.status.success(), "stderr:\n{}", String::from_utf8_lossy(&out.stderr));
    for ext in ["pdf", "png", "svg", "json"] {
        let p = dir.join(format!("Example_plot_Internal.{ext}"));
        assert!(p.exists(), "missing {}", p.display());
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_crate_version() {
    let out = run(&["version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("hepplot "));
}
