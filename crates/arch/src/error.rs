use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchError {
    #[error("invalid root: {} is not a directory", path.display())]
    InvalidRoot { path: PathBuf },
    #[error("failed to write {}: {source}", path.display())]
    SerializationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parser error: {0}")]
    Parser(#[from] syntax::ParseError),
}

pub type Result<T> = std::result::Result<T, ArchError>;

/// 被跳过的文件 (非致命, 分析结束后作为警告输出)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSkipped {
    pub path: PathBuf,
    pub reason: String,
}

impl FileSkipped {
    pub fn new(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for FileSkipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skipped {}: {}", self.path.display(), self.reason)
    }
}
