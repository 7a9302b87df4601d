//! 录制模块
//!
//! # 模块结构
//!
//! - `event` - 事件与宏的数据模型
//! - `recorder` - 录制会话和录制任务

mod event;
mod recorder;

pub use event::{Event, Macro};
pub use recorder::{spawn_recorder, Recorder, POLL_INTERVAL};
