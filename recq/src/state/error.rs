use thiserror::Error;

use super::app_state::SessionState;

/// 状态相关错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// 无效的状态转换
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}

/// 状态模块的结果类型
pub type StateResult<T> = Result<T, StateError>;
