//! 状态管理模块
//!
//! 提供会话状态机和配置存储
//!
//! # 模块结构
//!
//! - `app_state` - 会话状态定义和状态管理器
//! - `config` - 应用配置和配置存储
//! - `error` - 状态相关错误类型

mod app_state;
mod config;
mod error;

pub use app_state::{SessionState, StateManager};
pub use config::{AppConfig, ConfigError, ConfigResult, ConfigStore};
pub use error::{StateError, StateResult};
