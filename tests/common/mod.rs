//! Common test utilities
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use taskr::runner::{Console, Context, Executor, SharedBuffer, Verbosity};
use taskr::script::Parser;
use tempfile::TempDir;

/// Create a temporary directory with a Taskrfile
pub fn create_test_script(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let script_path = temp_dir.path().join("Taskrfile");
    fs::write(&script_path, content).unwrap();
    (temp_dir, script_path)
}

/// Executor over `source` that runs in `dir` and records its output
pub struct Harness {
    pub executor: Executor,
    pub out: SharedBuffer,
    pub err: SharedBuffer,
}

impl Harness {
    pub fn new(source: &str, dir: &Path) -> Self {
        Self::with_context(source, Context::new().with_working_dir(dir.to_path_buf()))
    }

    pub fn with_context(source: &str, ctx: Context) -> Self {
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();
        let ctx = ctx
            .with_verbosity(Verbosity::Normal)
            .with_console(Console::capture(out.clone(), err.clone()));
        Harness {
            executor: Executor::with_context(Parser::parse(source), ctx),
            out,
            err,
        }
    }
}
