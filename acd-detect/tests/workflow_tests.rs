//! Identification workflow integration tests
//!
//! Exercises the workflow against a scripted oracle with real scratch and
//! caller folders on disk.

mod helpers;

use acd_detect::models::{
    IdentificationStatus, RawMatch, IDENTIFICATION_FAILED_MESSAGE, MISSING_KEY_MESSAGE,
    NOT_FOUND_MESSAGE,
};
use acd_detect::services::ConfidenceTier;
use helpers::{dir_entries, sample_rows, unconfigured_workflow, workflow, Script, ScriptedOracle};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_not_found_deletes_scratch_file() {
    let scratch = TempDir::new().unwrap();
    let oracle = ScriptedOracle::rows(Vec::new());
    let wf = workflow(scratch.path(), oracle.clone());

    let result = wf.identify_upload(b"audio", "clip.mp3").await.unwrap();

    assert_eq!(result.status(), IdentificationStatus::NotFound);
    assert_eq!(result.message(), Some(NOT_FOUND_MESSAGE));
    assert_eq!(result.file(), "clip.mp3");
    assert!(result.matches().is_empty());
    assert!(result.top_match().is_none());

    // The oracle saw a real file, which is gone afterwards
    let seen = oracle.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].1, "scratch file should exist during the oracle call");
    assert!(!seen[0].0.exists());
    assert!(dir_entries(scratch.path()).is_empty());
}

#[tokio::test]
async fn test_oracle_failure_reports_error_and_cleans_up() {
    let scratch = TempDir::new().unwrap();
    let oracle = ScriptedOracle::failing("connection reset by peer");
    let wf = workflow(scratch.path(), oracle.clone());

    let result = wf.identify_upload(b"audio", "clip.flac").await.unwrap();

    assert_eq!(result.status(), IdentificationStatus::Error);
    let message = result.error_message().unwrap();
    assert!(!message.is_empty());
    assert!(message.contains("connection reset by peer"));
    assert_eq!(result.file(), "clip.flac");
    assert!(dir_entries(scratch.path()).is_empty());
}

#[tokio::test]
async fn test_blank_oracle_failure_still_has_message() {
    let scratch = TempDir::new().unwrap();
    let wf = workflow(scratch.path(), ScriptedOracle::failing(""));

    let result = wf.identify_upload(b"audio", "clip.flac").await.unwrap();

    assert_eq!(result.status(), IdentificationStatus::Error);
    assert_eq!(result.error_message(), Some(IDENTIFICATION_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_top_match_skips_incomplete_first_candidate() {
    let scratch = TempDir::new().unwrap();
    let wf = workflow(scratch.path(), ScriptedOracle::rows(sample_rows()));

    let result = wf.identify_upload(b"audio", "clip.ogg").await.unwrap();

    assert_eq!(result.status(), IdentificationStatus::Found);

    let ids: Vec<_> = result.matches().iter().map(|m| m.recording_id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2"]);

    let tiers: Vec<_> = result.matches().iter().map(|m| m.confidence).collect();
    assert_eq!(tiers, vec![ConfidenceTier::High, ConfidenceTier::Medium]);

    let top = result.top_match().unwrap();
    assert_eq!(top.recording_id, "r2");
    assert_eq!(top.title.as_deref(), Some("Title B"));
    assert_eq!(top.artist.as_deref(), Some("Artist B"));
}

#[tokio::test]
async fn test_matches_keep_oracle_order_not_score_order() {
    let scratch = TempDir::new().unwrap();
    let rows = vec![
        RawMatch::new(0.3, "low", Some("T"), Some("A")),
        RawMatch::new(0.95, "high", Some("T"), Some("A")),
    ];
    let wf = workflow(scratch.path(), ScriptedOracle::rows(rows));

    let result = wf.identify_upload(b"audio", "clip.wav").await.unwrap();

    assert_eq!(result.matches()[0].recording_id, "low");
    assert_eq!(result.top_match().unwrap().recording_id, "low");
}

#[tokio::test]
async fn test_tier_uses_unrounded_score() {
    let scratch = TempDir::new().unwrap();
    let rows = vec![RawMatch::new(0.4996, "r1", Some("T"), Some("A"))];
    let wf = workflow(scratch.path(), ScriptedOracle::rows(rows));

    let result = wf.identify_upload(b"audio", "clip.wav").await.unwrap();
    let candidate = &result.matches()[0];

    assert_eq!(candidate.match_score, 0.5);
    assert_eq!(candidate.confidence, ConfidenceTier::Low);
}

#[tokio::test]
async fn test_caller_file_outside_scratch_is_never_deleted() {
    let scratch = TempDir::new().unwrap();
    let library = TempDir::new().unwrap();
    let original = library.path().join("master.wav");
    std::fs::write(&original, b"precious").unwrap();

    for script in [
        Script::Rows(sample_rows()),
        Script::Rows(Vec::new()),
        Script::Fail("bad audio".to_string()),
    ] {
        let wf = workflow(scratch.path(), ScriptedOracle::new(script));
        let _ = wf.identify(&original).await;
        assert_eq!(std::fs::read(&original).unwrap(), b"precious");
    }

    let wf = unconfigured_workflow(scratch.path(), ScriptedOracle::rows(Vec::new()));
    let _ = wf.identify(&original).await;
    assert!(original.exists());
}

#[tokio::test]
async fn test_sibling_folder_with_shared_prefix_is_not_scratch() {
    let base = TempDir::new().unwrap();
    let scratch_root = base.path().join("scratch");
    let sibling = base.path().join("scratch-archive");
    std::fs::create_dir_all(&sibling).unwrap();
    let original = sibling.join("keep.mp3");
    std::fs::write(&original, b"x").unwrap();

    let wf = workflow(&scratch_root, ScriptedOracle::rows(Vec::new()));
    let _ = wf.identify(&original).await;

    assert!(original.exists());
}

#[tokio::test]
async fn test_unconfigured_short_circuits_without_oracle_call() {
    let scratch = TempDir::new().unwrap();
    let oracle = ScriptedOracle::rows(sample_rows());
    let wf = unconfigured_workflow(scratch.path(), oracle.clone());

    assert!(!wf.configured());

    let result = wf.identify_upload(b"audio", "clip.mp3").await.unwrap();

    assert_eq!(result.status(), IdentificationStatus::Error);
    assert_eq!(result.error_message(), Some(MISSING_KEY_MESSAGE));
    assert_eq!(oracle.calls(), 0);
    assert!(dir_entries(scratch.path()).is_empty());
}

#[tokio::test]
async fn test_configured_reports_credential() {
    let scratch = TempDir::new().unwrap();
    let wf = workflow(scratch.path(), ScriptedOracle::rows(Vec::new()));
    assert!(wf.configured());
}

#[tokio::test]
async fn test_missing_path_reports_oracle_failure() {
    let scratch = TempDir::new().unwrap();
    let wf = workflow(scratch.path(), ScriptedOracle::failing("No such file"));

    let result = wf.identify(&scratch.path().join("ghost.mp3")).await;

    assert_eq!(result.status(), IdentificationStatus::Error);
    assert_eq!(result.file(), "ghost.mp3");
}

#[tokio::test]
async fn test_identify_is_idempotent_for_stable_input() {
    let scratch = TempDir::new().unwrap();
    let library = TempDir::new().unwrap();
    let input = library.path().join("clip.m4a");
    std::fs::write(&input, b"audio").unwrap();

    let wf = workflow(scratch.path(), ScriptedOracle::rows(sample_rows()));

    let first = wf.identify(&input).await;
    let second = wf.identify(&input).await;

    assert_eq!(first, second);
    assert!(input.exists());
}

#[tokio::test]
async fn test_direct_identify_of_scratch_path_cleans_up() {
    let scratch = TempDir::new().unwrap();
    let wf = workflow(scratch.path(), ScriptedOracle::rows(sample_rows()));

    let upload = wf.scratch().materialize(b"audio", "clip.aac").await.unwrap();
    let path = upload.path().to_path_buf();
    assert!(path.exists());

    let result = wf.identify(&path).await;

    assert_eq!(result.status(), IdentificationStatus::Found);
    assert!(result.file().starts_with("audio_"));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_cancelled_uploads_leave_no_scratch_files() {
    let scratch = TempDir::new().unwrap();
    let wf = workflow(scratch.path(), ScriptedOracle::rows(sample_rows()));
    let bytes = vec![0u8; 64 * 1024 * 1024];

    for _ in 0..5 {
        let _ = tokio::time::timeout(
            Duration::from_millis(2),
            wf.identify_upload(&bytes, "clip.mp3"),
        )
        .await;
    }

    assert!(dir_entries(scratch.path()).is_empty());
}

#[tokio::test]
async fn test_concurrent_uploads_are_independent() {
    let scratch = TempDir::new().unwrap();
    let oracle = ScriptedOracle::rows(sample_rows());
    let wf = Arc::new(workflow(scratch.path(), oracle.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let wf = wf.clone();
        handles.push(tokio::spawn(async move {
            wf.identify_upload(b"audio", &format!("clip{}.mp3", i)).await.unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        assert_eq!(result.status(), IdentificationStatus::Found);
        assert_eq!(result.file(), format!("clip{}.mp3", i));
    }

    let seen = oracle.seen();
    assert_eq!(seen.len(), 8);
    let mut paths: Vec<_> = seen.iter().map(|(p, _)| p.clone()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 8, "each call gets its own scratch file");
    assert!(dir_entries(scratch.path()).is_empty());
}

#[tokio::test]
async fn test_oracle_panic_becomes_error_result() {
    let scratch = TempDir::new().unwrap();
    let wf = workflow(scratch.path(), ScriptedOracle::new(Script::Panic));

    let upload = wf.scratch().materialize(b"audio", "clip.wma").await.unwrap();
    let path = upload.path().to_path_buf();

    let result = wf.identify(&path).await;

    assert_eq!(result.status(), IdentificationStatus::Error);
    assert!(result.error_message().unwrap().contains("oracle exploded"));
    assert!(!path.exists());

    let result = wf.identify_upload(b"audio", "clip.wma").await.unwrap();
    assert_eq!(result.status(), IdentificationStatus::Error);
    assert!(dir_entries(scratch.path()).is_empty());
}
