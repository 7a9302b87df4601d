//! 事件录制器
//!
//! 把原始输入通知规范化为带时间戳的 [`Event`]：
//!
//! - 指针移动：查询绝对位置，位置未变化时丢弃（合并同一像素上的多次移动）
//! - 按钮：查询绝对位置，记录事件并维护"按住的按钮"集合
//! - 按键：直接记录，不带坐标
//!
//! 停止时为仍处于按下状态的按钮补发释放事件，保证每次按下都有对应的释放。

use std::collections::BTreeSet;
use std::time::Duration;

use super::event::{Event, Macro};
use crate::clock::Epoch;
use crate::host::{Geometry, RawInput, RawInputMask, SharedBackend};
use crate::monitor::{MonitorAnchor, MonitorLocator};
use crate::session::{send_status, SessionEvent, SessionEventSender, StatusSource};
use crate::task::TaskHandle;
use crate::utils::AppError;

/// 没有待处理输入时的休眠间隔
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 录制会话
///
/// 持有自己的事件缓冲区，结束时整体交出
pub struct Recorder {
    geometry: Box<dyn Geometry>,
    epoch: Epoch,
    recording: Macro,
    last_position: Option<(i32, i32)>,
    held_buttons: BTreeSet<u32>,
}

impl Recorder {
    /// 以当前时刻为纪元开始录制
    pub fn new(geometry: Box<dyn Geometry>) -> Self {
        Self {
            geometry,
            epoch: Epoch::now(),
            recording: Macro::new(),
            last_position: None,
            held_buttons: BTreeSet::new(),
        }
    }

    /// 已录制的事件数
    pub fn len(&self) -> usize {
        self.recording.len()
    }

    /// 是否尚未录制任何事件
    pub fn is_empty(&self) -> bool {
        self.recording.is_empty()
    }

    /// 当前按住的按钮
    pub fn held_buttons(&self) -> impl Iterator<Item = u32> + '_ {
        self.held_buttons.iter().copied()
    }

    /// 处理一条原始输入通知
    pub fn handle(&mut self, input: RawInput) {
        let t_ms = self.epoch.elapsed_ms();

        match input {
            RawInput::Motion => {
                let Some((x, y)) = self.pointer() else {
                    return;
                };
                if self.last_position == Some((x, y)) {
                    return;
                }
                let anchor = self.anchor_for(x, y);
                tracing::trace!(t_ms, x, y, "Motion recorded");
                self.recording.push(Event::MouseMove { t_ms, x, y, anchor });
                self.last_position = Some((x, y));
            }

            RawInput::Button { id, pressed } => {
                let Some((x, y)) = self.pointer() else {
                    return;
                };
                if pressed {
                    self.held_buttons.insert(id);
                } else {
                    self.held_buttons.remove(&id);
                }
                let anchor = self.anchor_for(x, y);
                tracing::trace!(t_ms, button = id, pressed, x, y, "Button recorded");
                self.recording.push(Event::MouseButton {
                    t_ms,
                    x,
                    y,
                    button: id,
                    pressed,
                    anchor,
                });
            }

            RawInput::Key { code, pressed } => {
                tracing::trace!(t_ms, keycode = code, pressed, "Key recorded");
                self.recording.push(Event::Key {
                    t_ms,
                    keycode: code,
                    pressed,
                });
            }
        }
    }

    /// 结束录制
    ///
    /// 在当前位置和当前时刻为每个仍按住的按钮补一条释放事件
    pub fn finish(mut self) -> Macro {
        if !self.held_buttons.is_empty() {
            let t_ms = self.epoch.elapsed_ms();
            let (x, y) = self
                .pointer()
                .or(self.last_position)
                .unwrap_or_default();
            let anchor = self.anchor_for(x, y);

            let held = std::mem::take(&mut self.held_buttons);
            tracing::debug!(buttons = ?held, "Synthesizing releases for held buttons");
            for button in held {
                self.recording.push(Event::MouseButton {
                    t_ms,
                    x,
                    y,
                    button,
                    pressed: false,
                    anchor: anchor.clone(),
                });
            }
        }

        self.recording
    }

    fn pointer(&mut self) -> Option<(i32, i32)> {
        match self.geometry.pointer_position() {
            Ok(position) => Some(position),
            Err(e) => {
                tracing::warn!(error = %e, "Pointer query failed, dropping notification");
                None
            }
        }
    }

    fn anchor_for(&mut self, x: i32, y: i32) -> Option<MonitorAnchor> {
        MonitorLocator::new(self.geometry.as_mut()).anchor_for(x, y)
    }
}

/// 启动录制任务
///
/// 任务在自己的线程里打开几何查询和原始输入连接；任一不可用时
/// 发送状态文本并返回 `None`。正常停止后返回录制结果。
pub fn spawn_recorder(backend: SharedBackend, tx: SessionEventSender) -> TaskHandle<Option<Macro>> {
    TaskHandle::spawn("recorder", move |cancel| {
        let opened = backend.open_geometry().and_then(|geometry| {
            backend
                .open_raw_input(RawInputMask::ALL)
                .map(|source| (geometry, source))
        });
        let (geometry, mut source) = match opened {
            Ok(pair) => pair,
            Err(e) => {
                send_status(&tx, StatusSource::Recorder, AppError::from(e).status_line());
                return None;
            }
        };
        tracing::info!("Input capture opened");

        let mut recorder = Recorder::new(geometry);
        send_status(&tx, StatusSource::Recorder, "Recording...");

        while !cancel.is_cancelled() {
            match source.poll() {
                Ok(Some(input)) => recorder.handle(input),
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    tracing::warn!(error = %e, "Input capture lost during recording");
                    send_status(&tx, StatusSource::Recorder, AppError::from(e).status_line());
                    break;
                }
            }
        }

        let recording = recorder.finish();
        send_status(&tx, StatusSource::Recorder, "Stopped.");

        let summary = format!("Recorded {} events", recording.len());
        tracing::info!(events = recording.len(), "Recording finished");
        let _ = tx.send(SessionEvent::RecordingFinished {
            summary,
            events: recording.len(),
        });

        Some(recording)
    })
}
