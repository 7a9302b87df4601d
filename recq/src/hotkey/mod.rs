//! 热键模块
//!
//! 不依赖窗口焦点的全局热键：由最多 3 个同时按住的按键组成的组合
//!
//! # 功能
//!
//! - 开始/停止录制、开始回放、停止回放三个槽位
//! - 检测任务维护按住集合并发送快照，[`ChordTrigger`] 做边沿触发
//! - 捕获任务在用户定义新组合时收集按键
//!
//! # 使用方法
//!
//! ```ignore
//! use recq_lib::hotkey::{spawn_chord_detector, ChordTrigger, HotkeyConfig};
//!
//! let detector = spawn_chord_detector(backend, tx);
//! let mut trigger = ChordTrigger::new();
//!
//! // 表示层收到 SessionEvent::HeldKeys { keys } 后
//! if let Some(slot) = trigger.update(&keys, &config) {
//!     // 执行槽位对应的动作
//! }
//! ```

mod capture;
mod combo;
mod config;
mod detector;
mod error;
mod trigger;

pub use capture::{spawn_capture_worker, CaptureStep, ChordCapture};
pub use combo::{HotkeyCombo, MAX_CHORD_KEYS};
pub use config::{ChordSlot, HotkeyConfig, CAPTURE_IDLE_TIMEOUT};
pub use detector::{spawn_chord_detector, HeldKeys};
pub use error::{HotkeyError, HotkeyResult};
pub use trigger::ChordTrigger;
