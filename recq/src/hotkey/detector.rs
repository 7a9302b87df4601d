//! 热键组合检测
//!
//! 检测任务独占按住集合，每次集合变化时发送一份排序后的快照。
//! 是否触发由消费方通过 [`ChordTrigger`](super::ChordTrigger) 做边沿判断。

use std::collections::BTreeSet;

use super::error::HotkeyError;
use crate::host::{RawInput, RawInputMask, SharedBackend};
use crate::recording::POLL_INTERVAL;
use crate::session::{send_status, SessionEvent, SessionEventSender, StatusSource};
use crate::task::TaskHandle;
use crate::utils::AppError;

/// 当前按住的按键集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    keys: BTreeSet<u32>,
}

impl HeldKeys {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用一次按下/释放，返回集合是否发生变化
    ///
    /// 按键自动重复产生的重复按下不会改变集合
    pub fn apply(&mut self, code: u32, pressed: bool) -> bool {
        if pressed {
            self.keys.insert(code)
        } else {
            self.keys.remove(&code)
        }
    }

    /// 排序后的快照
    pub fn snapshot(&self) -> Vec<u32> {
        self.keys.iter().copied().collect()
    }

    /// 是否按住了某个键
    pub fn contains(&self, code: u32) -> bool {
        self.keys.contains(&code)
    }

    /// 按住的按键数
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// 是否没有按住任何键
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// 启动热键检测任务
///
/// 键盘监听不可用时发送状态文本并退出
pub fn spawn_chord_detector(backend: SharedBackend, tx: SessionEventSender) -> TaskHandle<()> {
    TaskHandle::spawn("chord-detector", move |cancel| {
        let mut source = match backend.open_raw_input(RawInputMask::KEYS) {
            Ok(source) => source,
            Err(e) => {
                let err = AppError::from(HotkeyError::ListenerUnavailable(e.to_string()));
                send_status(&tx, StatusSource::Hotkeys, err.status_line());
                return;
            }
        };
        tracing::info!("Hotkey listener started");

        let mut held = HeldKeys::new();
        while !cancel.is_cancelled() {
            match source.poll() {
                Ok(Some(RawInput::Key { code, pressed })) => {
                    if held.apply(code, pressed) {
                        let keys = held.snapshot();
                        tracing::trace!(keys = ?keys, "Held keys changed");
                        if tx.send(SessionEvent::HeldKeys { keys }).is_err() {
                            break;
                        }
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let err = AppError::from(HotkeyError::ListenerUnavailable(e.to_string()));
                    send_status(&tx, StatusSource::Hotkeys, err.status_line());
                    break;
                }
            }
        }

        tracing::info!("Hotkey listener stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_reports_changes() {
        let mut held = HeldKeys::new();

        assert!(held.apply(38, true));
        assert!(!held.apply(38, true));
        assert!(held.apply(37, true));
        assert_eq!(held.snapshot(), vec![37, 38]);

        assert!(held.apply(38, false));
        assert!(!held.apply(38, false));
        assert_eq!(held.snapshot(), vec![37]);
        assert!(held.contains(37));
        assert_eq!(held.len(), 1);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mut held = HeldKeys::new();
        for code in [95, 9, 50] {
            held.apply(code, true);
        }
        assert_eq!(held.snapshot(), vec![9, 50, 95]);
    }
}
