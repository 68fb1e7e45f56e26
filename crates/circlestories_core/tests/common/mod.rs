#![allow(dead_code)]

use circlestories_core::{EngineConfig, StoryEngine};
use std::ops::Deref;
use tempfile::TempDir;

/// Engine over a throwaway database file; the file is removed on drop.
pub struct TestEngine {
    engine: StoryEngine,
    _dir: TempDir,
}

impl Deref for TestEngine {
    type Target = StoryEngine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

pub fn engine() -> TestEngine {
    engine_with_busy_timeout_ms(EngineConfig::default().busy_timeout_ms)
}

pub fn engine_with_busy_timeout_ms(busy_timeout_ms: u64) -> TestEngine {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        busy_timeout_ms,
        ..EngineConfig::with_db_path(dir.path().join("circlestories.db"))
    };
    let engine = StoryEngine::open(&config).unwrap();
    TestEngine { engine, _dir: dir }
}

pub fn texts(blocks: &[circlestories_core::Block]) -> Vec<&str> {
    blocks.iter().map(|block| block.text.as_str()).collect()
}
