//! 宏存储模块
//!
//! # 模块结构
//!
//! - `format` - 文件格式的编码与两阶段解码
//! - `file` - `.recq` 文件的保存与读取
//! - `error` - 存储相关错误类型

mod error;
mod file;
mod format;

pub use error::{StorageError, StorageResult};
pub use file::{load_macro, read_macro, save_macro, with_macro_extension, MACRO_EXTENSION};
pub use format::{deserialize, serialize, FORMAT_TAG};
