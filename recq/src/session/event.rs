//! 会话通知
//!
//! 后台任务通过无界通道把通知单向发送给表示层。
//! 同一任务发出的通知保持顺序，不同任务之间不保证先后。

use serde::Serialize;
use tokio::sync::mpsc;

use crate::hotkey::ChordSlot;
use crate::playback::PlaybackOutcome;

/// 状态消息的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSource {
    Recorder,
    Player,
    Hotkeys,
    Capture,
    Storage,
}

/// 发送给表示层的会话通知
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionEvent {
    /// 状态文本
    Status {
        source: StatusSource,
        message: String,
    },

    /// 录制结束，`summary` 形如 "Recorded N events"
    RecordingFinished { summary: String, events: usize },

    /// 回放结束（正常完成、被停止或不可用）
    PlaybackFinished { outcome: PlaybackOutcome },

    /// 当前按住的按键（已排序）
    HeldKeys { keys: Vec<u32> },

    /// 某个热键组合被触发
    ChordTriggered { slot: ChordSlot },

    /// 热键捕获过程中的按键反馈
    CaptureProgress {
        slot: ChordSlot,
        keys: Vec<u32>,
        display: String,
    },

    /// 热键捕获空闲超时，自动完成
    CaptureFinished {
        slot: ChordSlot,
        keys: Vec<u32>,
        display: String,
    },
}

/// 会话通知发送器
pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;

/// 记录并发送状态文本
///
/// 接收方已关闭时静默丢弃
pub(crate) fn send_status(
    tx: &SessionEventSender,
    source: StatusSource,
    message: impl Into<String>,
) {
    let message = message.into();
    tracing::info!(source = ?source, status = %message, "Status");
    let _ = tx.send(SessionEvent::Status { source, message });
}
