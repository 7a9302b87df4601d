//! 热键捕获
//!
//! 用户定义新组合期间使用的短期按键监听：
//!
//! - 已在序列中的按键忽略，序列满 3 个后不再追加
//! - 除开始录制槽位外，最后一次按键后 1 秒无新按键即自动完成
//! - 重新进入捕获时，未重置的满 3 键草稿被丢弃

use std::time::Instant;

use super::combo::{HotkeyCombo, MAX_CHORD_KEYS};
use super::config::ChordSlot;
use super::error::{HotkeyError, HotkeyResult};
use crate::host::{RawInput, RawInputMask, SharedBackend};
use crate::keys;
use crate::recording::POLL_INTERVAL;
use crate::session::{send_status, SessionEvent, SessionEventSender, StatusSource};
use crate::task::TaskHandle;
use crate::utils::AppError;

/// 一次按键的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    /// 已追加到序列
    Appended,
    /// 重复按键、序列已满或已完成
    Ignored,
}

/// 捕获草稿
#[derive(Debug, Clone)]
pub struct ChordCapture {
    slot: ChordSlot,
    keys: Vec<u32>,
    last_key_at: Option<Instant>,
    finalized: bool,
}

impl ChordCapture {
    /// 为某个槽位创建空草稿
    pub fn new(slot: ChordSlot) -> Self {
        Self {
            slot,
            keys: Vec::with_capacity(MAX_CHORD_KEYS),
            last_key_at: None,
            finalized: false,
        }
    }

    /// 目标槽位
    pub fn slot(&self) -> ChordSlot {
        self.slot
    }

    /// 已捕获的按键
    pub fn keys(&self) -> &[u32] {
        &self.keys
    }

    /// 显示名
    pub fn display_name(&self) -> String {
        keys::display_name(&self.keys)
    }

    /// 是否已满
    pub fn is_full(&self) -> bool {
        self.keys.len() >= MAX_CHORD_KEYS
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 是否已自动完成
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// 处理一次按下
    pub fn press(&mut self, code: u32, now: Instant) -> CaptureStep {
        if self.finalized || self.is_full() || self.keys.contains(&code) {
            return CaptureStep::Ignored;
        }
        self.keys.push(code);
        self.last_key_at = Some(now);
        CaptureStep::Appended
    }

    /// 空闲时间是否已超过槽位的超时
    pub fn idle_expired(&self, now: Instant) -> bool {
        if self.finalized || self.keys.is_empty() {
            return false;
        }
        match (self.slot.idle_timeout(), self.last_key_at) {
            (Some(timeout), Some(last)) => now.saturating_duration_since(last) >= timeout,
            _ => false,
        }
    }

    /// 标记为已完成
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// 清空草稿
    pub fn reset(&mut self) {
        self.keys.clear();
        self.last_key_at = None;
        self.finalized = false;
    }

    /// 重新进入捕获
    ///
    /// 满 3 键的草稿或属于其他槽位的草稿被丢弃，未满的草稿保留
    pub fn reenter(&mut self, slot: ChordSlot) {
        if self.is_full() || self.slot != slot {
            self.reset();
        }
        self.slot = slot;
        self.last_key_at = None;
        self.finalized = false;
    }

    /// 转换为热键组合
    pub fn to_combo(&self) -> HotkeyResult<HotkeyCombo> {
        HotkeyCombo::try_new(self.keys.clone())
    }
}

/// 启动捕获任务
///
/// 草稿在任务结束时交还给调用方。自动完成时发送
/// [`SessionEvent::CaptureFinished`] 并退出。
pub fn spawn_capture_worker(
    backend: SharedBackend,
    mut draft: ChordCapture,
    tx: SessionEventSender,
) -> TaskHandle<ChordCapture> {
    TaskHandle::spawn("chord-capture", move |cancel| {
        let mut source = match backend.open_raw_input(RawInputMask::KEYS) {
            Ok(source) => source,
            Err(e) => {
                let err = AppError::from(HotkeyError::ListenerUnavailable(e.to_string()));
                send_status(&tx, StatusSource::Capture, err.status_line());
                return draft;
            }
        };
        tracing::debug!(slot = draft.slot().name(), "Chord capture started");

        while !cancel.is_cancelled() {
            if draft.idle_expired(Instant::now()) {
                draft.finalize();
                tracing::debug!(
                    slot = draft.slot().name(),
                    keys = ?draft.keys(),
                    "Chord capture finalized"
                );
                let _ = tx.send(SessionEvent::CaptureFinished {
                    slot: draft.slot(),
                    keys: draft.keys().to_vec(),
                    display: draft.display_name(),
                });
                break;
            }

            match source.poll() {
                Ok(Some(RawInput::Key {
                    code,
                    pressed: true,
                })) => {
                    if draft.press(code, Instant::now()) == CaptureStep::Appended {
                        let _ = tx.send(SessionEvent::CaptureProgress {
                            slot: draft.slot(),
                            keys: draft.keys().to_vec(),
                            display: draft.display_name(),
                        });
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let err = AppError::from(HotkeyError::ListenerUnavailable(e.to_string()));
                    send_status(&tx, StatusSource::Capture, err.status_line());
                    break;
                }
            }
        }

        draft
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_duplicates_ignored_and_limit() {
        let now = Instant::now();
        let mut draft = ChordCapture::new(ChordSlot::StopPlayback);

        assert_eq!(draft.press(37, now), CaptureStep::Appended);
        assert_eq!(draft.press(37, now), CaptureStep::Ignored);
        assert_eq!(draft.press(64, now), CaptureStep::Appended);
        assert_eq!(draft.press(45, now), CaptureStep::Appended);
        assert_eq!(draft.press(46, now), CaptureStep::Ignored);

        assert_eq!(draft.keys(), &[37, 64, 45]);
        assert_eq!(draft.display_name(), "Ctrl+Alt+K");
        assert!(draft.is_full());
    }

    #[test]
    fn test_idle_timeout() {
        let start = Instant::now();
        let mut draft = ChordCapture::new(ChordSlot::StartPlayback);
        assert!(!draft.idle_expired(start + Duration::from_secs(5)));

        draft.press(38, start);
        assert!(!draft.idle_expired(start + Duration::from_millis(999)));
        assert!(draft.idle_expired(start + Duration::from_secs(1)));

        draft.finalize();
        assert!(!draft.idle_expired(start + Duration::from_secs(2)));
        assert_eq!(draft.press(39, start), CaptureStep::Ignored);
    }

    #[test]
    fn test_start_recording_has_no_timeout() {
        let start = Instant::now();
        let mut draft = ChordCapture::new(ChordSlot::StartRecording);
        draft.press(38, start);
        assert!(!draft.idle_expired(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_reenter_discards_full_draft() {
        let now = Instant::now();
        let mut draft = ChordCapture::new(ChordSlot::StartRecording);
        for code in [37, 64, 45] {
            draft.press(code, now);
        }

        draft.reenter(ChordSlot::StartRecording);
        assert!(draft.is_empty());
    }

    #[test]
    fn test_reenter_keeps_partial_draft() {
        let now = Instant::now();
        let mut draft = ChordCapture::new(ChordSlot::StartRecording);
        draft.press(37, now);

        draft.reenter(ChordSlot::StartRecording);
        assert_eq!(draft.keys(), &[37]);

        draft.reenter(ChordSlot::StopPlayback);
        assert!(draft.is_empty());
        assert_eq!(draft.slot(), ChordSlot::StopPlayback);
    }

    #[test]
    fn test_to_combo() {
        let now = Instant::now();
        let mut draft = ChordCapture::new(ChordSlot::StopPlayback);
        assert!(draft.to_combo().is_err());

        draft.press(37, now);
        draft.press(9, now);
        let combo = draft.to_combo().unwrap();
        assert_eq!(combo.display_name(), "Ctrl+Esc");
    }
}
