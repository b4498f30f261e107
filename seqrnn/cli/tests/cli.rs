use std::process::Command;

use rand::rngs::StdRng;
use rand::SeedableRng;
use seqrnn_tasks::{Checkpoint, ExperimentConfig, RecurrentModel, RunDirs, RunId};

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_seqrnn"))
}

// ── help ───────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let out = bin().arg("--help").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("seqrnn"));
    assert!(stdout.contains("sample"));
    assert!(stdout.contains("run-id"));
    assert!(stdout.contains("evaluate"));
}

#[test]
fn test_evaluate_help_shows_flags() {
    let out = bin().args(["evaluate", "--help"]).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--eval-steps"));
    assert!(stdout.contains("--checkpoint"));
    assert!(stdout.contains("--T"));
    assert!(stdout.contains("--weight_decay"));
}

// ── sample ─────────────────────────────────────────────────────────

#[test]
fn test_sample_copy_json() {
    let out = bin()
        .args(["sample", "--task", "copy", "--T", "5", "--c-length", "2", "--batch", "3", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let batch: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let samples = batch["samples"].as_array().unwrap();
    assert_eq!(samples.len(), 3);
    for s in samples {
        let input = s["input"].as_array().unwrap();
        let target = s["target"].as_array().unwrap();
        assert_eq!(input.len(), 9);
        assert_eq!(input[6], 9);
        assert_eq!(&target[7..], &input[..2]);
    }
}

#[test]
fn test_sample_denoise_text() {
    let out = bin()
        .args(["sample", "--task", "denoise", "--T", "3", "--c-length", "2", "--batch", "1"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Task:          denoise"));
    assert!(stdout.contains("Seq length:    7"));
    assert!(stdout.contains("Recall window: [5, 7)"));
    assert!(stdout.contains("[0] input:"));
}

#[test]
fn test_sample_same_seed_same_output() {
    let run = || {
        bin()
            .args(["sample", "--task", "copy", "--T", "10", "--random-seed", "7", "--json"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_invalid_label_count_fails() {
    let out = bin()
        .args(["sample", "--task", "copy", "--labels", "9"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("labels"), "{stderr}");
}

#[test]
fn test_bad_bool_is_usage_error() {
    let out = bin()
        .args(["sample", "--task", "copy", "--onehot", "maybe"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("boolean value expected"));
}

#[test]
fn test_unknown_task_is_usage_error() {
    let out = bin().args(["sample", "--task", "adding"]).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}

// ── run-id ─────────────────────────────────────────────────────────

#[test]
fn test_run_id_defaults() {
    let out = bin().args(["run-id", "--task", "copy"]).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Experiment:    copytask"));
    assert!(stdout.contains(
        "Key:           HS_128_NL_modrelu_lr_0.0002_BS_10_rinit_henaff_iinit_xavier_decay_0_alpha_0.99"
    ));
    assert!(stdout.contains("Seed:          400"));
    assert!(stdout.contains("Steps:         1500"));
}

#[test]
fn test_run_id_variable_onehot() {
    let out = bin()
        .args(["run-id", "--task", "copy", "--vari", "yes", "--onehot", "y"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Experiment:    varicopytask"));
    assert!(stdout.contains("Key:           onehot/HS_128"));
    assert!(stdout.contains("Steps:         200000"));
}

#[test]
fn test_run_id_create_writes_hparams() {
    let root = tempfile::tempdir().unwrap();
    let out = bin()
        .args(["run-id", "--task", "denoise", "--create", "--root"])
        .arg(root.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    let config = ExperimentConfig::denoise_defaults();
    let dirs = RunDirs::new(root.path(), &RunId::from_config(&config));
    let hparams = std::fs::read_to_string(dirs.saves.join("hparams.txt")).unwrap();
    assert!(hparams.contains("task: denoise"));
    assert!(hparams.contains("labels: 9"));
}

// ── evaluate ───────────────────────────────────────────────────────

fn small_eval_args() -> Vec<&'static str> {
    vec!["evaluate", "--task", "denoise", "--T", "5", "--c-length", "2", "--nhid", "8", "--batch", "2"]
}

#[test]
fn test_evaluate_fresh_model() {
    let root = tempfile::tempdir().unwrap();
    let out = bin()
        .args(small_eval_args())
        .args(["--eval-steps", "3", "--root"])
        .arg(root.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("recurrent_weight   [8 x 8]"));
    assert!(stdout.contains("Batches:       3"));
    assert!(stdout.contains("Mean loss:"));
    assert!(stdout.contains("Mean accuracy:"));
}

#[test]
fn test_evaluate_loads_latest_checkpoint() {
    let root = tempfile::tempdir().unwrap();
    let config = ExperimentConfig {
        t: 5,
        c_length: 2,
        hidden_size: 8,
        batch: 2,
        ..ExperimentConfig::denoise_defaults()
    };
    let dirs = RunDirs::new(root.path(), &RunId::from_config(&config));
    let mut rng = StdRng::seed_from_u64(1);
    let model = RecurrentModel::new(&mut rng, &config.model_spec().unwrap()).unwrap();
    Checkpoint::from_model(&model, serde_json::Value::Null, 42)
        .save(dirs.saves.join(Checkpoint::file_name("RNN", 42)))
        .unwrap();

    let out = bin()
        .args(small_eval_args())
        .args(["--eval-steps", "1", "--checkpoint", "latest", "--root"])
        .arg(root.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("RNN_42.ckpt.json (step 42)"));
}

#[test]
fn test_evaluate_missing_checkpoint_fails() {
    let root = tempfile::tempdir().unwrap();
    let out = bin()
        .args(small_eval_args())
        .args(["--checkpoint", "latest", "--root"])
        .arg(root.path())
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no checkpoint found"), "{stderr}");
}

#[test]
fn test_evaluate_cuda_unavailable() {
    let root = tempfile::tempdir().unwrap();
    let out = bin()
        .args(small_eval_args())
        .args(["--cuda", "yes", "--root"])
        .arg(root.path())
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Device unavailable"), "{stderr}");
}
