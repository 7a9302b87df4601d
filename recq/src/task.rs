//! 后台任务模块
//!
//! 录制器、回放器、热键检测器和热键捕获器都运行在各自的线程中，
//! 共享同一套"启动 / 请求停止 / 等待结束"约定：
//!
//! - [`CancelToken`] 在启动时传入任务，任务在每轮循环和每次长休眠前检查
//! - [`TaskHandle`] 持有取消令牌和线程句柄，`join` 取回任务的最终结果
//!
//! 取消是协作式的，响应延迟受任务轮询间隔约束，不会强制中断。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// 协作式取消令牌
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// 创建未取消的令牌
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// 是否已请求取消
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// 后台任务句柄
pub struct TaskHandle<T> {
    name: &'static str,
    cancel: CancelToken,
    join: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// 在新线程中启动任务
    ///
    /// `body` 收到任务自己的取消令牌副本
    pub fn spawn<F>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(CancelToken) -> T + Send + 'static,
    {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let join = std::thread::Builder::new()
            .name(format!("recq-{}", name))
            .spawn(move || body(token));

        let join = match join {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(task = name, error = %e, "Failed to spawn task thread");
                None
            }
        };

        tracing::debug!(task = name, "Task spawned");

        Self { name, cancel, join }
    }
}

impl<T> TaskHandle<T> {
    /// 任务名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 取消令牌的副本，可交给其他任务用于停止本任务
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// 请求任务停止（不等待）
    pub fn request_stop(&self) {
        tracing::debug!(task = self.name, "Stop requested");
        self.cancel.cancel();
    }

    /// 任务线程是否已经退出
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(|handle| handle.is_finished())
    }

    /// 阻塞等待任务结束并取回结果
    ///
    /// 线程启动失败或任务 panic 时返回 `None`
    pub fn join(mut self) -> Option<T> {
        let handle = self.join.take()?;
        match handle.join() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::error!(task = self.name, "Task panicked");
                None
            }
        }
    }

    /// 请求停止并等待结束
    pub fn stop(self) -> Option<T> {
        self.request_stop();
        self.join()
    }
}
