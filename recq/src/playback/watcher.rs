//! 停止键监视
//!
//! 回放期间监听原始按键，任一停止键按下时取消回放。

use crate::host::{RawInput, RawInputMask, SharedBackend};
use crate::recording::POLL_INTERVAL;
use crate::task::{CancelToken, TaskHandle};

/// 启动停止键监视任务
///
/// `target` 是回放任务的取消令牌。监视任务在自身被停止、`target`
/// 已取消或按下停止键后退出；返回值表示是否由停止键触发。
pub fn spawn_stop_watcher(
    backend: SharedBackend,
    stop_keys: Vec<u32>,
    target: CancelToken,
) -> TaskHandle<bool> {
    TaskHandle::spawn("stop-watcher", move |cancel| {
        let mut source = match backend.open_raw_input(RawInputMask::KEYS) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(error = %e, "Stop key watcher unavailable");
                return false;
            }
        };

        while !cancel.is_cancelled() && !target.is_cancelled() {
            match source.poll() {
                Ok(Some(RawInput::Key {
                    code,
                    pressed: true,
                })) if stop_keys.contains(&code) => {
                    tracing::info!(keycode = code, "Stop key pressed, cancelling playback");
                    target.cancel();
                    return true;
                }
                Ok(Some(_)) => {}
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    tracing::warn!(error = %e, "Stop key watcher lost its listener");
                    break;
                }
            }
        }

        false
    })
}
