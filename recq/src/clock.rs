//! 时钟模块
//!
//! 提供单调毫秒时间戳和可取消的截止时间等待
//!
//! 录制和回放都以"纪元"（epoch）为时间原点：
//! 录制时事件时间戳是相对录制开始的毫秒数，
//! 回放时每轮循环重新取一次纪元，按 `t_ms / speed` 计算触发时刻。

use std::time::{Duration, Instant};

use crate::task::CancelToken;

/// 等待时的最大单次休眠粒度
///
/// 取消请求的响应延迟受此值约束
pub const WAIT_SLICE_MS: u64 = 10;

/// 时间纪元
#[derive(Debug, Clone, Copy)]
pub struct Epoch {
    start: Instant,
}

impl Epoch {
    /// 以当前时刻创建纪元
    pub fn now() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// 纪元起点
    pub fn instant(&self) -> Instant {
        self.start
    }

    /// 自纪元起经过的毫秒数
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// 计算相对纪元 `t_ms` 毫秒、按 `speed` 缩放后的绝对时刻
    ///
    /// `speed` 必须为正数
    pub fn deadline(&self, t_ms: u64, speed: f64) -> Instant {
        let scaled = t_ms as f64 / speed;
        self.start + Duration::from_secs_f64(scaled.max(0.0) / 1000.0)
    }
}

impl Default for Epoch {
    fn default() -> Self {
        Self::now()
    }
}

/// 等待直到 `deadline`，期间按 [`WAIT_SLICE_MS`] 粒度检查取消
///
/// 不会提前返回：只有当前时刻达到截止时间后才返回 `true`。
/// 如果等待过程中收到取消请求则返回 `false`。
pub fn wait_until(deadline: Instant, cancel: &CancelToken) -> bool {
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        let remaining = deadline - now;
        std::thread::sleep(remaining.min(Duration::from_millis(WAIT_SLICE_MS)));
    }
}

/// 可取消的固定时长休眠
pub fn sleep_for(duration: Duration, cancel: &CancelToken) -> bool {
    wait_until(Instant::now() + duration, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_scales_by_speed() {
        let epoch = Epoch::now();
        let at_double = epoch.deadline(1000, 2.0);
        assert_eq!(at_double - epoch.instant(), Duration::from_millis(500));

        let at_half = epoch.deadline(100, 0.5);
        assert_eq!(at_half - epoch.instant(), Duration::from_millis(200));
    }

    #[test]
    fn test_wait_until_never_early() {
        let cancel = CancelToken::new();
        let deadline = Instant::now() + Duration::from_millis(35);
        assert!(wait_until(deadline, &cancel));
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_wait_until_cancelled() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let started = Instant::now();
        assert!(!wait_until(started + Duration::from_secs(5), &cancel));
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_elapsed_monotonic() {
        let epoch = Epoch::now();
        let a = epoch.elapsed_ms();
        std::thread::sleep(Duration::from_millis(5));
        let b = epoch.elapsed_ms();
        assert!(b >= a);
    }
}
