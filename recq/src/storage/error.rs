//! 存储相关错误类型

use thiserror::Error;

/// 宏文件读写错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// 文件读写失败
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    /// 序列化失败
    #[error("Failed to encode macro: {0}")]
    Encode(String),

    /// 空宏不保存
    #[error("Nothing to save")]
    EmptyMacro,
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// 存储模块的结果类型
pub type StorageResult<T> = Result<T, StorageError>;
