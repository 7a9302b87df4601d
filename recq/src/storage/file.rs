//! 宏文件读写

use std::path::{Path, PathBuf};

use super::error::{StorageError, StorageResult};
use super::format;
use crate::recording::Macro;

/// 宏文件扩展名
pub const MACRO_EXTENSION: &str = "recq";

/// 补全 `.recq` 扩展名
///
/// 已经以 `.recq` 结尾的路径原样返回
pub fn with_macro_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == MACRO_EXTENSION) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(MACRO_EXTENSION);
        PathBuf::from(name)
    }
}

/// 保存宏，返回实际写入的路径
///
/// # Errors
///
/// 空宏不保存；编码或写入失败时返回错误
pub fn save_macro(path: &Path, recording: &Macro) -> StorageResult<PathBuf> {
    if recording.is_empty() {
        return Err(StorageError::EmptyMacro);
    }

    let path = with_macro_extension(path);
    let bytes = format::serialize(recording)?;
    std::fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;

    tracing::info!(path = %path.display(), events = recording.len(), "Macro saved");
    Ok(path)
}

/// 读取宏文件
///
/// # Errors
///
/// 只有读文件失败时返回错误；内容无法解析时得到空宏
pub fn read_macro(path: &Path) -> StorageResult<Macro> {
    let bytes = std::fs::read(path).map_err(|e| StorageError::io(path, e))?;
    Ok(format::deserialize(&bytes))
}

/// 读取宏文件，任何失败都得到空宏
///
/// 调用方无法区分"读取失败"和"文件中没有事件"
pub fn load_macro(path: &Path) -> Macro {
    match read_macro(path) {
        Ok(recording) => {
            tracing::info!(path = %path.display(), events = recording.len(), "Macro loaded");
            recording
        }
        Err(e) => {
            tracing::warn!(error = %e, "Macro load failed");
            Macro::new()
        }
    }
}
