//! 回放调度器
//!
//! 每轮循环重新取纪元，事件在 `纪元 + t_ms / speed` 时刻触发，绝不提前。
//!
//! - 指针移动：锚点指向的显示器仍存在时按当前位置重新映射，否则用录制时的绝对坐标
//! - 按钮：坐标解析同上，重新映射时先移动指针；按下后若下一条不是对应释放，
//!   等待 `auto_release_delay` 后自动释放，否则等待 `tap_delay`
//! - 按键：直接注入
//!
//! 取消在每次等待前、每条事件前和每轮之间检查。无论如何结束，
//! 最后都会释放 `safety_buttons` 范围内的全部按钮。

use serde::Serialize;

use super::options::PlaybackOptions;
use crate::clock::{sleep_for, wait_until, Epoch};
use crate::host::{Geometry, HostResult, Injector};
use crate::monitor::{MonitorAnchor, MonitorLocator, ResolvedPoint};
use crate::recording::{Event, Macro};
use crate::task::CancelToken;

/// 回放结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "lowercase")]
pub enum PlaybackOutcome {
    /// 所有循环正常完成
    Finished,
    /// 被取消
    Stopped,
    /// 宏为空，未执行
    Empty,
    /// 注入能力不可用
    Unavailable(String),
}

impl PlaybackOutcome {
    /// 对应的状态文本
    pub fn status_line(&self) -> String {
        match self {
            Self::Finished => "Playback finished.".to_string(),
            Self::Stopped => "Playback stopped.".to_string(),
            Self::Empty => "No events to play".to_string(),
            Self::Unavailable(reason) => reason.clone(),
        }
    }
}

/// 回放器
pub struct Player {
    injector: Box<dyn Injector>,
    geometry: Option<Box<dyn Geometry>>,
    options: PlaybackOptions,
}

impl Player {
    /// 创建回放器
    ///
    /// 没有几何查询连接时所有坐标都按录制时的绝对值注入
    pub fn new(
        injector: Box<dyn Injector>,
        geometry: Option<Box<dyn Geometry>>,
        options: PlaybackOptions,
    ) -> Self {
        Self {
            injector,
            geometry,
            options,
        }
    }

    /// 回放参数
    pub fn options(&self) -> &PlaybackOptions {
        &self.options
    }

    /// 回放宏直到完成或被取消
    pub fn run(&mut self, recording: &Macro, cancel: &CancelToken) -> PlaybackOutcome {
        if recording.is_empty() {
            return PlaybackOutcome::Empty;
        }

        tracing::info!(
            events = recording.len(),
            speed = self.options.speed,
            loops = %self.options.loops,
            "Playback started"
        );

        let outcome = self.play_loops(recording, cancel);
        self.release_all();

        tracing::info!(outcome = ?outcome, "Playback ended");
        outcome
    }

    fn play_loops(&mut self, recording: &Macro, cancel: &CancelToken) -> PlaybackOutcome {
        let events = recording.events();
        let mut iteration: u32 = 0;

        while self.options.loops.allows(iteration) {
            if cancel.is_cancelled() {
                return PlaybackOutcome::Stopped;
            }

            let epoch = Epoch::now();
            tracing::debug!(iteration, "Loop iteration started");

            for (index, event) in events.iter().enumerate() {
                if cancel.is_cancelled() {
                    return PlaybackOutcome::Stopped;
                }
                if !wait_until(epoch.deadline(event.t_ms(), self.options.speed), cancel) {
                    return PlaybackOutcome::Stopped;
                }
                self.fire(event, &events[index + 1..], cancel);
            }

            iteration = iteration.saturating_add(1);
        }

        PlaybackOutcome::Finished
    }

    fn fire(&mut self, event: &Event, rest: &[Event], cancel: &CancelToken) {
        match event {
            Event::MouseMove { x, y, anchor, .. } => {
                let target = self.resolve(*x, *y, anchor.as_ref());
                self.inject("move", |injector| injector.move_to(target.x, target.y));
            }

            Event::MouseButton {
                x,
                y,
                button,
                pressed,
                anchor,
                ..
            } => {
                let target = self.resolve(*x, *y, anchor.as_ref());
                if target.remapped {
                    self.inject("move", |injector| injector.move_to(target.x, target.y));
                }
                let (button, pressed) = (*button, *pressed);
                self.inject("button", |injector| injector.button(button, pressed));

                if pressed {
                    match pending_release(rest, button) {
                        Some(0) => {
                            sleep_for(self.options.tap_delay, cancel);
                        }
                        Some(_) => {}
                        None => {
                            // 取消时也要补发释放
                            sleep_for(self.options.auto_release_delay, cancel);
                            tracing::debug!(button, "Auto-releasing unmatched press");
                            self.inject("button", |injector| injector.button(button, false));
                        }
                    }
                }
            }

            Event::Key {
                keycode, pressed, ..
            } => {
                let (keycode, pressed) = (*keycode, *pressed);
                self.inject("key", |injector| injector.key(keycode, pressed));
            }
        }
    }

    fn resolve(&mut self, x: i32, y: i32, anchor: Option<&MonitorAnchor>) -> ResolvedPoint {
        match self.geometry.as_deref_mut() {
            Some(geometry) => MonitorLocator::new(geometry).resolve(x, y, anchor),
            None => ResolvedPoint {
                x,
                y,
                remapped: false,
            },
        }
    }

    fn inject<F>(&mut self, what: &'static str, action: F)
    where
        F: FnOnce(&mut dyn Injector) -> HostResult<()>,
    {
        if let Err(e) = action(self.injector.as_mut()) {
            tracing::warn!(kind = what, error = %e, "Injection failed");
        }
    }

    fn release_all(&mut self) {
        for button in self.options.safety_buttons.clone() {
            self.inject("button", |injector| injector.button(button, false));
        }
    }
}

/// 同一按钮的下一条按钮事件是释放时，返回它在 `rest` 中的位置
///
/// 拖动（按下、若干移动、释放）不会被自动释放打断
fn pending_release(rest: &[Event], button: u32) -> Option<usize> {
    rest.iter()
        .enumerate()
        .find_map(|(offset, event)| match event {
            Event::MouseButton {
                button: id,
                pressed,
                ..
            } if *id == button => Some((!pressed).then_some(offset)),
            _ => None,
        })
        .flatten()
}
