//! 回放参数

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 最小回放速度
pub const MIN_SPEED: f64 = 0.1;
/// 最大回放速度
pub const MAX_SPEED: f64 = 5.0;
/// 按下后没有紧跟释放时，自动释放前的等待时间
pub const AUTO_RELEASE_DELAY: Duration = Duration::from_millis(30);
/// 按下后紧跟释放时的可见点击间隔
pub const TAP_DELAY: Duration = Duration::from_millis(15);
/// 左右 Ctrl（X11 按键码）
pub const DEFAULT_STOP_KEYS: [u32; 2] = [37, 105];

/// 循环次数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopCount {
    /// 固定次数（至少一次）
    Times(u32),
    /// 无限循环，只能手动停止
    Infinite,
}

impl LoopCount {
    /// 固定次数，0 按 1 处理
    pub fn times(n: u32) -> Self {
        Self::Times(n.max(1))
    }

    /// 第 `iteration` 轮（从 0 开始）是否仍在范围内
    pub fn allows(&self, iteration: u32) -> bool {
        match self {
            Self::Times(n) => iteration < *n,
            Self::Infinite => true,
        }
    }

    /// 是否无限循环
    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl Default for LoopCount {
    fn default() -> Self {
        Self::Times(1)
    }
}

impl fmt::Display for LoopCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Times(n) => write!(f, "{}", n),
            Self::Infinite => f.write_str("infinite"),
        }
    }
}

/// 回放参数
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackOptions {
    /// 速度倍率，限定在 [`MIN_SPEED`]..=[`MAX_SPEED`]
    pub speed: f64,
    /// 循环次数
    pub loops: LoopCount,
    /// 自动释放延迟
    pub auto_release_delay: Duration,
    /// 点击间隔
    pub tap_delay: Duration,
    /// 回放期间按下即停止的按键
    pub stop_keys: Vec<u32>,
    /// 结束时无条件释放的按钮范围
    pub safety_buttons: RangeInclusive<u32>,
}

impl PlaybackOptions {
    /// 以指定速度和循环次数创建参数
    ///
    /// 非有限的速度按 1.0 处理，超出范围的速度被截断
    pub fn new(speed: f64, loops: LoopCount) -> Self {
        Self {
            speed: clamp_speed(speed),
            loops: match loops {
                LoopCount::Times(n) => LoopCount::times(n),
                LoopCount::Infinite => LoopCount::Infinite,
            },
            ..Self::default()
        }
    }

    /// 设置停止键
    pub fn with_stop_keys(mut self, keys: impl Into<Vec<u32>>) -> Self {
        self.stop_keys = keys.into();
        self
    }

    /// 设置自动释放和点击间隔
    pub fn with_delays(mut self, auto_release: Duration, tap: Duration) -> Self {
        self.auto_release_delay = auto_release;
        self.tap_delay = tap;
        self
    }

    /// 开始回放时显示的状态文本
    pub fn status_line(&self) -> String {
        format!("Playing ({} loops, speed x{})...", self.loops, self.speed)
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            loops: LoopCount::default(),
            auto_release_delay: AUTO_RELEASE_DELAY,
            tap_delay: TAP_DELAY,
            stop_keys: DEFAULT_STOP_KEYS.to_vec(),
            safety_buttons: 1..=7,
        }
    }
}

fn clamp_speed(speed: f64) -> f64 {
    let clamped = if speed.is_finite() {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        1.0
    };
    if clamped != speed {
        tracing::debug!(requested = speed, speed = clamped, "Playback speed adjusted");
    }
    clamped
}
