//! 事件模型
//!
//! 录制得到的每一条输入都是一个 [`Event`]，按捕获顺序保存在 [`Macro`] 中。

use std::slice;

use crate::monitor::MonitorAnchor;

/// 一条录制的输入事件
///
/// `t_ms` 为相对录制纪元的毫秒数。指针类事件同时保存绝对坐标和
/// 相对所在显示器的锚点；没有匹配显示器（或从文件加载）时锚点为 `None`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// 指针移动
    MouseMove {
        t_ms: u64,
        x: i32,
        y: i32,
        anchor: Option<MonitorAnchor>,
    },

    /// 指针按钮按下/释放
    MouseButton {
        t_ms: u64,
        x: i32,
        y: i32,
        button: u32,
        pressed: bool,
        anchor: Option<MonitorAnchor>,
    },

    /// 键盘按键按下/释放
    Key { t_ms: u64, keycode: u32, pressed: bool },
}

impl Event {
    /// 创建不带锚点的指针移动
    pub fn mouse_move(t_ms: u64, x: i32, y: i32) -> Self {
        Self::MouseMove {
            t_ms,
            x,
            y,
            anchor: None,
        }
    }

    /// 创建不带锚点的按钮事件
    pub fn mouse_button(t_ms: u64, x: i32, y: i32, button: u32, pressed: bool) -> Self {
        Self::MouseButton {
            t_ms,
            x,
            y,
            button,
            pressed,
            anchor: None,
        }
    }

    /// 创建按键事件
    pub fn key(t_ms: u64, keycode: u32, pressed: bool) -> Self {
        Self::Key {
            t_ms,
            keycode,
            pressed,
        }
    }

    /// 相对纪元的时间戳
    pub fn t_ms(&self) -> u64 {
        match self {
            Self::MouseMove { t_ms, .. }
            | Self::MouseButton { t_ms, .. }
            | Self::Key { t_ms, .. } => *t_ms,
        }
    }

    /// 录制时的绝对坐标（按键事件没有坐标）
    pub fn position(&self) -> Option<(i32, i32)> {
        match self {
            Self::MouseMove { x, y, .. } | Self::MouseButton { x, y, .. } => Some((*x, *y)),
            Self::Key { .. } => None,
        }
    }

    /// 显示器锚点
    pub fn anchor(&self) -> Option<&MonitorAnchor> {
        match self {
            Self::MouseMove { anchor, .. } | Self::MouseButton { anchor, .. } => anchor.as_ref(),
            Self::Key { .. } => None,
        }
    }

    /// 是否为指定按钮的释放事件
    pub fn is_release_of(&self, id: u32) -> bool {
        matches!(self, Self::MouseButton { button, pressed: false, .. } if *button == id)
    }
}

/// 宏：按时间顺序排列的事件序列
///
/// 录制完成或加载后整体替换，不会被多方同时修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Macro {
    events: Vec<Event>,
}

impl Macro {
    /// 创建空宏
    pub fn new() -> Self {
        Self::default()
    }

    /// 由事件序列创建宏
    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// 事件数量
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 事件切片
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// 遍历事件
    pub fn iter(&self) -> slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// 最后一条事件的时间戳
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map(Event::t_ms).unwrap_or(0)
    }

    /// 时间戳是否单调不减
    pub fn is_monotonic(&self) -> bool {
        self.events.windows(2).all(|w| w[0].t_ms() <= w[1].t_ms())
    }

    pub(crate) fn push(&mut self, event: Event) {
        self.events.push(event);
    }
}

impl<'a> IntoIterator for &'a Macro {
    type Item = &'a Event;
    type IntoIter = slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
