//! 边沿触发
//!
//! 按住集合保持匹配期间会收到多次快照，只有进入匹配的那一次触发。

use super::config::{ChordSlot, HotkeyConfig};

/// 热键边沿触发器
#[derive(Debug, Clone, Default)]
pub struct ChordTrigger {
    active: Option<ChordSlot>,
}

impl ChordTrigger {
    /// 创建触发器
    pub fn new() -> Self {
        Self::default()
    }

    /// 用新的按住集合更新，进入某个槽位的匹配时返回该槽位
    pub fn update(&mut self, held: &[u32], config: &HotkeyConfig) -> Option<ChordSlot> {
        let matched = config.slot_for(held);
        let fired = match matched {
            Some(slot) if self.active != Some(slot) => Some(slot),
            _ => None,
        };
        self.active = matched;
        fired
    }

    /// 当前处于匹配状态的槽位
    pub fn active(&self) -> Option<ChordSlot> {
        self.active
    }

    /// 清除匹配状态
    pub fn reset(&mut self) {
        self.active = None;
    }
}
