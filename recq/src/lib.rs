//! recq 核心库
//!
//! 录制指针、按钮和按键输入，按显示器相对坐标回放，并识别全局组合热键。
//! 窗口、按钮和文件对话框属于外部表示层，表示层只通过
//! [`session::MacroSession`] 调用本库并接收 [`session::SessionEvent`]。

/// Monotonic epoch and cancellable waits
pub mod clock;

/// Host input surfaces (geometry, injection, raw input)
pub mod host;

/// Hotkey chords: matching, detection and capture
pub mod hotkey;

/// Key names
pub mod keys;

/// Monitor lookup and monitor-relative coordinates
pub mod monitor;

/// Playback scheduler
pub mod playback;

/// Event recording
pub mod recording;

/// Session facade for the presentation layer
pub mod session;

/// Session state machine and config store
pub mod state;

/// Macro file format
pub mod storage;

/// Background task plumbing
pub mod task;

/// Utility modules
pub mod utils;
