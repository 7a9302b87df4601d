//! 平台检测
//!
//! 桌面后端依赖 X11 的原始输入与 XTest 注入能力。
//! 在打开连接之前先检测当前平台和显示服务器，不满足条件时直接报告不可用。

use serde::{Deserialize, Serialize};

/// 平台类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Windows
    Windows,
    /// macOS
    MacOS,
    /// Linux
    Linux,
    /// 未知平台
    Unknown,
}

impl Platform {
    /// 获取当前平台
    pub fn current() -> Self {
        #[cfg(target_os = "windows")]
        return Platform::Windows;

        #[cfg(target_os = "macos")]
        return Platform::MacOS;

        #[cfg(target_os = "linux")]
        return Platform::Linux;

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        return Platform::Unknown;
    }

    /// 获取平台名称
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOS => "macOS",
            Platform::Linux => "Linux",
            Platform::Unknown => "Unknown",
        }
    }
}

/// 显示服务器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayServer {
    /// X11 显示服务器
    X11,
    /// Wayland 合成器
    Wayland,
    /// 未知或未检测到
    Unknown,
}

impl DisplayServer {
    /// 获取显示服务器名称
    pub fn name(&self) -> &'static str {
        match self {
            DisplayServer::X11 => "X11",
            DisplayServer::Wayland => "Wayland",
            DisplayServer::Unknown => "Unknown",
        }
    }

    /// 是否支持全局原始输入监听和合成注入
    ///
    /// Wayland 出于安全限制不允许普通客户端监听全局输入
    pub fn supports_raw_input(&self) -> bool {
        matches!(self, DisplayServer::X11)
    }
}

/// 检测当前显示服务器
///
/// # 检测逻辑
///
/// 1. 检查 `XDG_SESSION_TYPE` 环境变量
/// 2. 检查 `DISPLAY` 环境变量（XWayland 下也会设置，但此时会话类型已判定为 Wayland）
/// 3. 检查 `WAYLAND_DISPLAY` 环境变量
pub fn detect_display_server() -> DisplayServer {
    detect_from(|name| std::env::var(name).ok())
}

fn detect_from(var: impl Fn(&str) -> Option<String>) -> DisplayServer {
    if let Some(session_type) = var("XDG_SESSION_TYPE") {
        match session_type.to_lowercase().as_str() {
            "wayland" => return DisplayServer::Wayland,
            "x11" => return DisplayServer::X11,
            _ => {}
        }
    }

    if var("DISPLAY").is_some_and(|d| !d.is_empty()) {
        return DisplayServer::X11;
    }

    if var("WAYLAND_DISPLAY").is_some() {
        return DisplayServer::Wayland;
    }

    DisplayServer::Unknown
}
