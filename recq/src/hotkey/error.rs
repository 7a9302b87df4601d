//! 热键相关错误类型

use thiserror::Error;

/// 热键相关错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HotkeyError {
    /// 组合为空
    #[error("Hotkey combination is empty")]
    Empty,

    /// 按键数量超过上限
    #[error("Hotkey combination has {0} keys, at most {max} allowed", max = super::MAX_CHORD_KEYS)]
    TooManyKeys(usize),

    /// 组合内有重复按键
    #[error("Key {0} appears more than once in the combination")]
    DuplicateKey(u32),

    /// 原始键盘输入不可用
    #[error("Keyboard listener unavailable: {0}")]
    ListenerUnavailable(String),
}

/// 热键模块的结果类型
pub type HotkeyResult<T> = Result<T, HotkeyError>;
