use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::Serialize;
use tokio::sync::mpsc;

use super::error::{StateError, StateResult};
use crate::hotkey::ChordSlot;

/// 会话主状态
///
/// 录制、回放和热键定义互斥，同一时刻只有一个在进行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "slot", rename_all = "camelCase")]
pub enum SessionState {
    /// 空闲
    #[default]
    Idle,

    /// 正在录制
    Recording,

    /// 正在回放
    Playing,

    /// 正在定义某个槽位的热键
    CapturingChord(ChordSlot),
}

impl SessionState {
    /// 检查是否为空闲状态
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// 检查是否在录制中
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// 检查是否在回放中
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// 检查是否在定义热键
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::CapturingChord(_))
    }

    /// 正在定义的槽位（如果有）
    pub fn capture_slot(&self) -> Option<ChordSlot> {
        match self {
            Self::CapturingChord(slot) => Some(*slot),
            _ => None,
        }
    }

    /// 获取状态名称（用于日志和调试）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Recording => "Recording",
            Self::Playing => "Playing",
            Self::CapturingChord(_) => "CapturingChord",
        }
    }
}

/// 状态管理器
///
/// 负责验证状态转换并通知监听者
pub struct StateManager {
    /// 当前状态（使用 ArcSwap 实现无锁读取）
    state: ArcSwap<SessionState>,

    /// 状态变更监听器列表
    listeners: Mutex<Vec<mpsc::UnboundedSender<SessionState>>>,
}

impl StateManager {
    /// 创建新的状态管理器
    ///
    /// # Examples
    ///
    /// ```
    /// use recq_lib::state::StateManager;
    ///
    /// let manager = StateManager::new();
    /// assert!(manager.current().is_idle());
    /// ```
    pub fn new() -> Self {
        Self {
            state: ArcSwap::new(Arc::new(SessionState::Idle)),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// 获取当前状态
    ///
    /// 此方法是无锁的，可以在任何线程安全地调用
    pub fn current(&self) -> SessionState {
        **self.state.load()
    }

    /// 转换到新状态
    ///
    /// # Errors
    ///
    /// 如果状态转换不合法，返回 [`StateError::InvalidTransition`]
    ///
    /// # Examples
    ///
    /// ```
    /// use recq_lib::state::{SessionState, StateManager};
    ///
    /// let manager = StateManager::new();
    ///
    /// // 合法转换
    /// assert!(manager.transition(SessionState::Recording).is_ok());
    ///
    /// // 非法转换
    /// assert!(manager.transition(SessionState::Playing).is_err());
    /// ```
    pub fn transition(&self, new_state: SessionState) -> StateResult<()> {
        let current = self.current();

        if !Self::is_valid_transition(&current, &new_state) {
            return Err(StateError::InvalidTransition {
                from: current,
                to: new_state,
            });
        }

        tracing::debug!(from = current.name(), to = new_state.name(), "State transition");
        self.state.store(Arc::new(new_state));
        self.notify_listeners(new_state);

        Ok(())
    }

    /// 添加状态变更监听器
    ///
    /// 返回的接收器将接收所有状态变更通知
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionState> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(tx);
        }
        rx
    }

    /// 获取当前监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// 强制设置状态（跳过验证）
    ///
    /// **警告**: 此方法跳过状态转换验证，仅用于任务异常退出后的恢复
    pub fn force_set(&self, new_state: SessionState) {
        self.state.store(Arc::new(new_state));
        self.notify_listeners(new_state);
    }

    /// 重置为空闲状态
    pub fn reset(&self) {
        self.force_set(SessionState::Idle);
    }

    /// 通知所有监听者，并移除已关闭的监听器
    fn notify_listeners(&self, new_state: SessionState) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|tx| tx.send(new_state).is_ok());
        }
    }

    /// 验证状态转换是否合法
    fn is_valid_transition(from: &SessionState, to: &SessionState) -> bool {
        use SessionState::*;

        matches!(
            (from, to),
            (Idle, Recording)
                | (Recording, Idle)
                | (Idle, Playing)
                | (Playing, Idle)
                | (Idle, CapturingChord(_))
                | (CapturingChord(_), Idle)
        )
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
