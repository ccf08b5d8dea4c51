//! Shared test helpers: scripted oracle and workflow builders

#![allow(dead_code)]

use acd_detect::config::DetectorConfig;
use acd_detect::models::RawMatch;
use acd_detect::services::{FingerprintOracle, IdentificationWorkflow, OracleError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the scripted oracle does on every call
#[derive(Debug, Clone)]
pub enum Script {
    Rows(Vec<RawMatch>),
    Fail(String),
    Panic,
}

/// Oracle returning a fixed outcome and recording what it saw
pub struct ScriptedOracle {
    script: Script,
    calls: AtomicUsize,
    /// (path, existed during the call)
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl ScriptedOracle {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn rows(rows: Vec<RawMatch>) -> Arc<Self> {
        Self::new(Script::Rows(rows))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(Script::Fail(message.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FingerprintOracle for ScriptedOracle {
    async fn lookup(&self, _credential: &str, path: &Path) -> Result<Vec<RawMatch>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((path.to_path_buf(), path.exists()));

        match &self.script {
            Script::Rows(rows) => Ok(rows.clone()),
            Script::Fail(message) => Err(OracleError::Other(message.clone())),
            Script::Panic => panic!("oracle exploded"),
        }
    }
}

/// Workflow with a test credential
pub fn workflow(scratch_root: &Path, oracle: Arc<ScriptedOracle>) -> IdentificationWorkflow {
    IdentificationWorkflow::new(
        DetectorConfig::new(Some("test-key".to_string()), scratch_root),
        oracle,
    )
    .unwrap()
}

/// Workflow without a credential
pub fn unconfigured_workflow(
    scratch_root: &Path,
    oracle: Arc<ScriptedOracle>,
) -> IdentificationWorkflow {
    IdentificationWorkflow::new(DetectorConfig::new(None, scratch_root), oracle).unwrap()
}

/// Files currently in a folder
pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}

pub fn sample_rows() -> Vec<RawMatch> {
    vec![
        RawMatch::new(0.9, "r1", Some(""), Some("Artist A")),
        RawMatch::new(0.6, "r2", Some("Title B"), Some("Artist B")),
    ]
}
