//! 回放模块
//!
//! # 模块结构
//!
//! - `options` - 速度、循环次数和延迟参数
//! - `scheduler` - 回放调度器
//! - `watcher` - 停止键监视任务
//!
//! [`spawn_player`] 在独立线程中运行回放，同时启动停止键监视，
//! 回放结束后一并停止监视。

mod options;
mod scheduler;
mod watcher;

use std::sync::Arc;

pub use options::{
    LoopCount, PlaybackOptions, AUTO_RELEASE_DELAY, DEFAULT_STOP_KEYS, MAX_SPEED, MIN_SPEED,
    TAP_DELAY,
};
pub use scheduler::{PlaybackOutcome, Player};
pub use watcher::spawn_stop_watcher;

use crate::host::SharedBackend;
use crate::recording::Macro;
use crate::session::{send_status, SessionEvent, SessionEventSender, StatusSource};
use crate::task::TaskHandle;
use crate::utils::AppError;

/// 启动回放任务
///
/// 注入连接不可用时报告状态并以 [`PlaybackOutcome::Unavailable`] 结束；
/// 几何查询不可用时退化为只使用绝对坐标。
pub fn spawn_player(
    backend: SharedBackend,
    recording: Arc<Macro>,
    options: PlaybackOptions,
    tx: SessionEventSender,
) -> TaskHandle<PlaybackOutcome> {
    TaskHandle::spawn("player", move |cancel| {
        let finish = |outcome: PlaybackOutcome| {
            send_status(&tx, StatusSource::Player, outcome.status_line());
            let _ = tx.send(SessionEvent::PlaybackFinished {
                outcome: outcome.clone(),
            });
            outcome
        };

        if recording.is_empty() {
            return finish(PlaybackOutcome::Empty);
        }

        let injector = match backend.open_injector() {
            Ok(injector) => injector,
            Err(e) => return finish(PlaybackOutcome::Unavailable(AppError::from(e).status_line())),
        };
        let geometry = match backend.open_geometry() {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                tracing::warn!(error = %e, "Geometry unavailable, replaying absolute coordinates");
                None
            }
        };

        let watcher = (!options.stop_keys.is_empty()).then(|| {
            spawn_stop_watcher(
                Arc::clone(&backend),
                options.stop_keys.clone(),
                cancel.clone(),
            )
        });

        send_status(&tx, StatusSource::Player, options.status_line());
        let mut player = Player::new(injector, geometry, options);
        let outcome = player.run(&recording, &cancel);

        if let Some(watcher) = watcher {
            watcher.stop();
        }

        finish(outcome)
    })
}
