//! 全局错误处理模块
//!
//! 提供统一的应用错误类型和用户友好的错误消息
//!
//! # 功能
//!
//! - 统一的 `AppError` 类型，聚合所有模块错误
//! - 用户友好的错误消息
//! - 错误代码用于表示层处理
//! - 错误恢复建议
//!
//! 后台任务从不因错误终止进程：错误被转换为一行状态文本
//! （[`AppError::status_line`]）发送给表示层，然后任务结束。
//!
//! # 使用示例
//!
//! ```
//! use recq_lib::host::HostError;
//! use recq_lib::utils::error::{AppError, ErrorCode};
//!
//! let err = AppError::from(HostError::Unavailable("X11 display required".to_string()));
//! assert_eq!(err.code(), ErrorCode::HostUnavailable);
//! assert!(err.is_recoverable());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::HostError;
use crate::hotkey::HotkeyError;
use crate::state::{ConfigError, StateError};
use crate::storage::StorageError;

/// 应用错误类型
///
/// 聚合所有模块的错误类型，提供统一的错误处理接口
#[derive(Error, Debug)]
pub enum AppError {
    /// 宿主输入错误
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// 宏文件错误
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 热键错误
    #[error("Hotkey error: {0}")]
    Hotkey(#[from] HotkeyError),

    /// 状态错误
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 错误代码
///
/// 用于表示层识别和处理特定错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 宿主错误
    /// 原始输入或注入能力不可用
    HostUnavailable,
    /// 几何查询失败
    HostQueryFailed,
    /// 事件注入失败
    HostInjectionFailed,

    // 存储错误
    /// 宏文件读写失败
    StorageIo,
    /// 宏编码失败
    StorageEncode,
    /// 没有可保存的事件
    StorageEmpty,

    // 配置错误
    /// 配置读写失败
    ConfigIo,
    /// 配置格式错误
    ConfigInvalid,

    // 热键错误
    /// 热键组合无效
    HotkeyInvalid,
    /// 键盘监听不可用
    HotkeyUnavailable,

    // 通用错误
    /// 当前状态不允许此操作
    InvalidState,
    /// 内部错误
    InternalError,
}

/// 错误上下文信息
///
/// 提供用户友好的错误信息和恢复建议
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// 错误代码
    pub code: ErrorCode,
    /// 用户友好的错误消息
    pub message: String,
    /// 详细错误信息（用于日志）
    pub detail: Option<String>,
    /// 恢复建议
    pub recovery_hint: Option<String>,
    /// 是否可恢复
    pub recoverable: bool,
}

impl ErrorContext {
    /// 创建新的错误上下文
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
            recovery_hint: None,
            recoverable: true,
        }
    }

    /// 设置详细信息
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// 设置恢复建议
    pub fn with_recovery_hint(mut self, hint: impl Into<String>) -> Self {
        self.recovery_hint = Some(hint.into());
        self
    }

    /// 标记为不可恢复
    pub fn not_recoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Host(HostError::Unavailable(_)) => ErrorCode::HostUnavailable,
            AppError::Host(HostError::QueryFailed(_)) => ErrorCode::HostQueryFailed,
            AppError::Host(HostError::InjectionFailed(_)) => ErrorCode::HostInjectionFailed,

            AppError::Storage(StorageError::Io { .. }) => ErrorCode::StorageIo,
            AppError::Storage(StorageError::Encode(_)) => ErrorCode::StorageEncode,
            AppError::Storage(StorageError::EmptyMacro) => ErrorCode::StorageEmpty,

            AppError::Config(ConfigError::Io(_)) => ErrorCode::ConfigIo,
            AppError::Config(ConfigError::Json(_)) => ErrorCode::ConfigInvalid,

            AppError::Hotkey(HotkeyError::ListenerUnavailable(_)) => ErrorCode::HotkeyUnavailable,
            AppError::Hotkey(_) => ErrorCode::HotkeyInvalid,

            AppError::State(_) => ErrorCode::InvalidState,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// 获取用户友好的错误消息
    ///
    /// 返回适合直接显示给用户的错误消息
    pub fn user_message(&self) -> String {
        match self {
            AppError::Host(HostError::Unavailable(_)) => {
                "无法访问输入设备，当前环境不支持录制和回放".to_string()
            }
            AppError::Host(HostError::QueryFailed(_)) => "无法获取指针或显示器信息".to_string(),
            AppError::Host(HostError::InjectionFailed(_)) => "输入事件注入失败".to_string(),

            AppError::Storage(StorageError::Io { .. }) => "无法读写宏文件".to_string(),
            AppError::Storage(StorageError::Encode(_)) => "宏文件编码失败".to_string(),
            AppError::Storage(StorageError::EmptyMacro) => "没有可保存的录制".to_string(),

            AppError::Config(ConfigError::Io(_)) => "无法读写配置文件".to_string(),
            AppError::Config(ConfigError::Json(_)) => "配置文件格式错误".to_string(),

            AppError::Hotkey(HotkeyError::ListenerUnavailable(_)) => {
                "无法监听键盘，全局热键不可用".to_string()
            }
            AppError::Hotkey(_) => "热键组合无效".to_string(),

            AppError::State(_) => "当前状态下无法执行此操作".to_string(),
            AppError::Internal(msg) => format!("内部错误: {}", msg),
        }
    }

    /// 发送给表示层的状态文本
    pub fn status_line(&self) -> String {
        match self {
            AppError::Host(HostError::Unavailable(reason)) => {
                format!("Input capture unavailable: {}", reason)
            }
            AppError::Hotkey(HotkeyError::ListenerUnavailable(reason)) => {
                format!("Hotkeys unavailable: {}", reason)
            }
            AppError::Storage(StorageError::Io { .. } | StorageError::Encode(_)) => {
                "Save failed".to_string()
            }
            AppError::Storage(e @ StorageError::EmptyMacro) => e.to_string(),
            other => other.to_string(),
        }
    }

    /// 获取完整的错误上下文
    pub fn context(&self) -> ErrorContext {
        let mut ctx =
            ErrorContext::new(self.code(), self.user_message()).with_detail(self.to_string());

        ctx.recovery_hint = self.recovery_hint();

        if !self.is_recoverable() {
            ctx = ctx.not_recoverable();
        }

        ctx
    }

    /// 获取恢复建议
    pub fn recovery_hint(&self) -> Option<String> {
        match self {
            AppError::Host(HostError::Unavailable(_))
            | AppError::Hotkey(HotkeyError::ListenerUnavailable(_)) => {
                Some("请在 X11 会话中运行（Wayland 不允许监听全局输入）".to_string())
            }
            AppError::Storage(StorageError::Io { .. }) => {
                Some("请检查文件路径和目录权限".to_string())
            }
            AppError::Hotkey(HotkeyError::DuplicateKey(_) | HotkeyError::TooManyKeys(_)) => {
                Some("最多使用 3 个不同的按键".to_string())
            }
            _ => None,
        }
    }

    /// 检查错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Internal(_))
    }
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;
