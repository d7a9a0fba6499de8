//! Debug artifacts: every prompt sent to the oracle and every answer it gave.
//! Written for humans; nothing reads them back.

use chrono::Local;
use scry_common::history::SelectorAnswer;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn prompts_dir(&self) -> PathBuf {
        self.root.join("prompts")
    }

    pub fn answers_dir(&self) -> PathBuf {
        self.root.join("answers")
    }

    pub async fn save_prompt(&self, prompt: &str) -> io::Result<PathBuf> {
        write_stamped(&self.prompts_dir(), prompt).await
    }

    pub async fn save_answer(&self, answer: &SelectorAnswer) -> io::Result<PathBuf> {
        let json = serde_json::to_string_pretty(answer)?;
        write_stamped(&self.answers_dir(), &json).await
    }
}

/// Human-readable file stem, e.g. `Sat Oct 17 2026 14.03.22.123`.
pub fn file_stamp() -> String {
    Local::now().format("%a %b %d %Y %H.%M.%S.%3f").to_string()
}

async fn write_stamped(dir: &Path, content: &str) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.md", file_stamp()));
    tokio::fs::write(&path, content).await?;
    Ok(path)
}
