//! 热键配置模块
//!
//! 定义三个热键槽位和它们的默认组合

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::combo::HotkeyCombo;

/// F9 / F10 / F11（X11 按键码）
const DEFAULT_START_RECORDING: u32 = 75;
const DEFAULT_START_PLAYBACK: u32 = 76;
const DEFAULT_STOP_PLAYBACK: u32 = 95;

/// 捕获空闲超时
pub const CAPTURE_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// 热键槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChordSlot {
    /// 开始/停止录制
    StartRecording,
    /// 开始回放
    StartPlayback,
    /// 停止回放
    StopPlayback,
}

impl ChordSlot {
    /// 所有槽位，按匹配优先级排列
    pub const ALL: [ChordSlot; 3] = [
        ChordSlot::StartRecording,
        ChordSlot::StartPlayback,
        ChordSlot::StopPlayback,
    ];

    /// 槽位名称（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartRecording => "startRecording",
            Self::StartPlayback => "startPlayback",
            Self::StopPlayback => "stopPlayback",
        }
    }

    /// 捕获时的空闲自动完成超时
    ///
    /// 开始录制的组合需要在其他界面操作期间保持按住，因此不自动完成
    pub fn idle_timeout(&self) -> Option<Duration> {
        match self {
            Self::StartRecording => None,
            Self::StartPlayback | Self::StopPlayback => Some(CAPTURE_IDLE_TIMEOUT),
        }
    }
}

/// 热键配置
///
/// 存储三个槽位的组合
///
/// # Examples
///
/// ```
/// use recq_lib::hotkey::{ChordSlot, HotkeyCombo, HotkeyConfig};
///
/// let config = HotkeyConfig::default()
///     .with_combo(ChordSlot::StopPlayback, HotkeyCombo::try_new(vec![37, 9]).unwrap());
/// assert_eq!(config.get(ChordSlot::StopPlayback).display_name(), "Ctrl+Esc");
/// assert_eq!(config.slot_for(&[9, 37]), Some(ChordSlot::StopPlayback));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotkeyConfig {
    /// 开始/停止录制
    ///
    /// 默认值: F9
    pub start_recording: HotkeyCombo,

    /// 开始回放
    ///
    /// 默认值: F10
    pub start_playback: HotkeyCombo,

    /// 停止回放
    ///
    /// 默认值: F11
    pub stop_playback: HotkeyCombo,
}

impl HotkeyConfig {
    /// 创建新的热键配置
    pub fn new(
        start_recording: HotkeyCombo,
        start_playback: HotkeyCombo,
        stop_playback: HotkeyCombo,
    ) -> Self {
        Self {
            start_recording,
            start_playback,
            stop_playback,
        }
    }

    /// 设置某个槽位的组合
    pub fn with_combo(mut self, slot: ChordSlot, combo: HotkeyCombo) -> Self {
        self.set(slot, combo);
        self
    }

    /// 获取槽位的组合
    pub fn get(&self, slot: ChordSlot) -> &HotkeyCombo {
        match slot {
            ChordSlot::StartRecording => &self.start_recording,
            ChordSlot::StartPlayback => &self.start_playback,
            ChordSlot::StopPlayback => &self.stop_playback,
        }
    }

    /// 替换槽位的组合
    pub fn set(&mut self, slot: ChordSlot, combo: HotkeyCombo) {
        match slot {
            ChordSlot::StartRecording => self.start_recording = combo,
            ChordSlot::StartPlayback => self.start_playback = combo,
            ChordSlot::StopPlayback => self.stop_playback = combo,
        }
    }

    /// 所有槽位及其组合
    pub fn all_combos(&self) -> Vec<(ChordSlot, &HotkeyCombo)> {
        ChordSlot::ALL
            .iter()
            .map(|slot| (*slot, self.get(*slot)))
            .collect()
    }

    /// 查找与按住集合恰好匹配的槽位
    ///
    /// 多个槽位配置了相同组合时按 [`ChordSlot::ALL`] 的顺序取第一个
    pub fn slot_for(&self, held: &[u32]) -> Option<ChordSlot> {
        ChordSlot::ALL
            .into_iter()
            .find(|slot| self.get(*slot).matches(held))
    }
}

impl Default for HotkeyConfig {
    /// 创建默认热键配置
    ///
    /// - Start recording: `F9`
    /// - Start playback: `F10`
    /// - Stop playback: `F11`
    fn default() -> Self {
        Self {
            start_recording: HotkeyCombo::single(DEFAULT_START_RECORDING),
            start_playback: HotkeyCombo::single(DEFAULT_START_PLAYBACK),
            stop_playback: HotkeyCombo::single(DEFAULT_STOP_PLAYBACK),
        }
    }
}
