//! recq 会话管理模块
//!
//! 表示层唯一的入口：把录制器、回放器、热键检测器和热键捕获器
//! 组合起来，维护当前宏和会话状态
//!
//! # 功能
//!
//! - 录制 / 回放 / 热键定义三者互斥（[`SessionState`]）
//! - 后台任务的通知通过 [`SessionEvent`] 通道单向送达表示层
//! - 宏文件的保存与加载，记住最近使用的目录
//! - 全局热键的边沿触发与分发
//!
//! # 使用示例
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use recq_lib::host::default_backend;
//! use recq_lib::playback::LoopCount;
//! use recq_lib::session::MacroSession;
//! use recq_lib::state::ConfigStore;
//!
//! let store = Arc::new(ConfigStore::open("/home/user/.config/recq/config.json"));
//! let (mut session, mut events) = MacroSession::new(default_backend(), store);
//!
//! session.start_recording();
//! // ...
//! session.stop_recording();
//!
//! if session.can_play() {
//!     session.start_playback(2.0, LoopCount::times(3));
//! }
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{:?}", event);
//! }
//! ```
//!
//! # 工作流程
//!
//! ```text
//! start_recording     Idle -> Recording       宏被清空
//! stop_recording      Recording -> Idle       录制结果成为当前宏
//! start_playback      Idle -> Playing         当前宏为空时只报告状态
//! stop_playback       Playing -> Idle         回放自然结束时也回到 Idle
//! begin_chord_capture Idle -> CapturingChord  期间热键不触发
//! commit/cancel       CapturingChord -> Idle
//! ```
//!
//! 自行结束的任务（能力不可用、回放完成、捕获自动完成）在下一次
//! 调用任一公开方法时被回收。捕获空闲超时自动完成时，回收即提交：
//! 新组合写入配置，会话回到 Idle。

mod event;

pub use event::{SessionEvent, SessionEventSender, StatusSource};
pub(crate) use event::send_status;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::hotkey::{
    spawn_capture_worker, spawn_chord_detector, ChordCapture, ChordSlot, ChordTrigger,
    HotkeyCombo,
};
use crate::host::SharedBackend;
use crate::playback::{spawn_player, LoopCount, PlaybackOptions, PlaybackOutcome};
use crate::recording::{spawn_recorder, Macro};
use crate::state::{ConfigStore, SessionState, StateManager};
use crate::storage;
use crate::task::TaskHandle;
use crate::utils::AppError;

/// 宏录制会话
pub struct MacroSession {
    /// 宿主后端，每个任务各自打开连接
    backend: SharedBackend,
    /// 配置存储
    config: Arc<ConfigStore>,
    /// 状态管理器
    state: StateManager,
    /// 通知发送器
    tx: SessionEventSender,
    /// 当前宏
    active: Arc<Macro>,
    recorder: Option<TaskHandle<Option<Macro>>>,
    player: Option<TaskHandle<PlaybackOutcome>>,
    detector: Option<TaskHandle<()>>,
    capture: Option<TaskHandle<ChordCapture>>,
    /// 捕获任务不在运行时保存的草稿
    capture_draft: Option<ChordCapture>,
    trigger: ChordTrigger,
    /// 最近一次回放参数，供热键启动回放使用
    last_playback: PlaybackOptions,
    closed: bool,
}

impl MacroSession {
    /// 创建会话
    ///
    /// 返回会话和通知接收器
    pub fn new(
        backend: SharedBackend,
        config: Arc<ConfigStore>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        tracing::info!(config = %config.path().display(), "Macro session created");

        let session = Self {
            backend,
            config,
            state: StateManager::new(),
            tx,
            active: Arc::new(Macro::new()),
            recorder: None,
            player: None,
            detector: None,
            capture: None,
            capture_draft: None,
            trigger: ChordTrigger::new(),
            last_playback: PlaybackOptions::default(),
            closed: false,
        };

        (session, rx)
    }

    // ===== 录制 =====

    /// 开始录制
    ///
    /// 非空闲状态下不做任何事并返回 `false`。开始时清空当前宏。
    pub fn start_recording(&mut self) -> bool {
        self.reap();

        if self.state.transition(SessionState::Recording).is_err() {
            tracing::debug!(state = self.state.current().name(), "Start recording ignored");
            return false;
        }

        self.active = Arc::new(Macro::new());
        self.recorder = Some(spawn_recorder(Arc::clone(&self.backend), self.tx.clone()));
        true
    }

    /// 停止录制
    ///
    /// 阻塞到录制任务退出，录制结果成为当前宏。返回当前宏的事件数。
    pub fn stop_recording(&mut self) -> usize {
        self.reap();

        if let Some(recorder) = self.recorder.take() {
            self.install_recording(recorder.stop());
            self.return_to_idle(SessionState::Recording);
        }

        self.active.len()
    }

    /// 切换录制状态
    ///
    /// 返回切换后是否正在录制
    pub fn toggle_recording(&mut self) -> bool {
        self.reap();

        if self.recorder.is_some() {
            self.stop_recording();
            false
        } else {
            self.start_recording()
        }
    }

    // ===== 回放 =====

    /// 以指定速度和循环次数开始回放
    pub fn start_playback(&mut self, speed: f64, loops: LoopCount) -> bool {
        self.start_playback_with(PlaybackOptions::new(speed, loops))
    }

    /// 以完整参数开始回放
    ///
    /// 当前宏为空时报告 "No events to play"；已有回放或处于其他状态时
    /// 不做任何事。返回是否启动了回放。
    pub fn start_playback_with(&mut self, options: PlaybackOptions) -> bool {
        self.reap();

        if self.active.is_empty() {
            send_status(
                &self.tx,
                StatusSource::Player,
                PlaybackOutcome::Empty.status_line(),
            );
            return false;
        }

        if self.state.transition(SessionState::Playing).is_err() {
            tracing::debug!(state = self.state.current().name(), "Start playback ignored");
            return false;
        }

        tracing::info!(
            speed = options.speed,
            loops = %options.loops,
            events = self.active.len(),
            "Starting playback"
        );

        self.last_playback = options.clone();
        self.player = Some(spawn_player(
            Arc::clone(&self.backend),
            Arc::clone(&self.active),
            options,
            self.tx.clone(),
        ));
        true
    }

    /// 停止回放
    ///
    /// 阻塞到回放任务退出（包括释放所有按钮）。没有回放时返回 `None`。
    pub fn stop_playback(&mut self) -> Option<PlaybackOutcome> {
        self.reap();

        let player = self.player.take()?;
        let outcome = player.stop();
        self.return_to_idle(SessionState::Playing);
        outcome
    }

    /// 等待当前回放自然结束
    ///
    /// 无限循环的回放只有停止键或 [`stop_playback`](Self::stop_playback) 能结束
    pub fn wait_playback(&mut self) -> Option<PlaybackOutcome> {
        let player = self.player.take()?;
        let outcome = player.join();
        self.return_to_idle(SessionState::Playing);
        outcome
    }

    // ===== 文件 =====

    /// 保存当前宏
    ///
    /// 缺少 `.recq` 扩展名时自动补全。成功后记住文件所在目录。
    pub fn save(&mut self, path: impl AsRef<Path>) -> bool {
        self.reap();

        match storage::save_macro(path.as_ref(), &self.active) {
            Ok(written) => {
                send_status(
                    &self.tx,
                    StatusSource::Storage,
                    format!("Saved {} events", self.active.len()),
                );
                self.remember_dir(&written);
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), error = %e, "Save failed");
                send_status(
                    &self.tx,
                    StatusSource::Storage,
                    AppError::from(e).status_line(),
                );
                false
            }
        }
    }

    /// 加载宏文件，替换当前宏
    ///
    /// 文件无法读取或无法解析时当前宏变为空。录制期间不做任何事。
    /// 返回加载的事件数。
    pub fn load(&mut self, path: impl AsRef<Path>) -> usize {
        self.reap();

        if self.state.current().is_recording() {
            tracing::debug!("Load ignored while recording");
            return 0;
        }

        let path = path.as_ref();
        let loaded = match storage::read_macro(path) {
            Ok(recording) => {
                self.remember_dir(path);
                recording
            }
            Err(e) => {
                tracing::warn!(error = %e, "Macro unreadable, using empty macro");
                Macro::new()
            }
        };

        let count = loaded.len();
        self.active = Arc::new(loaded);
        send_status(
            &self.tx,
            StatusSource::Storage,
            format!("Loaded {} events", count),
        );
        count
    }

    /// 文件对话框的起始目录
    pub fn dialog_dir(&self) -> String {
        self.config.last_dir()
    }

    // ===== 查询 =====

    /// 是否可以开始回放
    pub fn can_play(&self) -> bool {
        let recording = self
            .recorder
            .as_ref()
            .is_some_and(|recorder| !recorder.is_finished());
        !self.active.is_empty() && !recording
    }

    /// 是否可以保存
    pub fn can_save(&self) -> bool {
        !self.active.is_empty()
    }

    /// 当前宏
    pub fn active_macro(&self) -> Arc<Macro> {
        Arc::clone(&self.active)
    }

    /// 当前会话状态
    pub fn state(&self) -> SessionState {
        self.state.current()
    }

    /// 配置存储
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// 订阅会话状态变化
    ///
    /// 表示层据此切换按钮的可用状态
    pub fn subscribe_state(&self) -> mpsc::UnboundedReceiver<SessionState> {
        self.state.subscribe()
    }

    // ===== 热键 =====

    /// 启动全局热键检测
    ///
    /// 检测任务发送 [`SessionEvent::HeldKeys`]，表示层收到后调用
    /// [`handle_held_keys`](Self::handle_held_keys)。已在运行时返回 `false`。
    pub fn start_hotkeys(&mut self) -> bool {
        self.reap();

        if self.detector.is_some() {
            return false;
        }

        self.detector = Some(spawn_chord_detector(
            Arc::clone(&self.backend),
            self.tx.clone(),
        ));
        true
    }

    /// 停止全局热键检测
    pub fn stop_hotkeys(&mut self) {
        if let Some(detector) = self.detector.take() {
            detector.stop();
        }
        self.trigger.reset();
    }

    /// 处理一份按住集合快照
    ///
    /// 进入某个组合的匹配时分发对应动作并返回触发的槽位。
    /// 定义热键期间不触发。
    pub fn handle_held_keys(&mut self, held: &[u32]) -> Option<ChordSlot> {
        self.reap();

        if self.state.current().is_capturing() {
            self.trigger.reset();
            return None;
        }

        let hotkeys = self.config.hotkeys();
        let slot = self.trigger.update(held, &hotkeys)?;

        tracing::info!(slot = slot.name(), keys = ?held, "Hotkey triggered");
        let _ = self.tx.send(SessionEvent::ChordTriggered { slot });

        match slot {
            ChordSlot::StartRecording => {
                self.toggle_recording();
            }
            ChordSlot::StartPlayback => {
                let options = self.last_playback.clone();
                self.start_playback_with(options);
            }
            ChordSlot::StopPlayback => {
                self.stop_playback();
            }
        }

        Some(slot)
    }

    // ===== 热键定义 =====

    /// 开始为某个槽位定义热键
    ///
    /// 上一次未提交的草稿按 [`ChordCapture::reenter`] 的规则保留或丢弃
    pub fn begin_chord_capture(&mut self, slot: ChordSlot) -> bool {
        self.reap();

        if self
            .state
            .transition(SessionState::CapturingChord(slot))
            .is_err()
        {
            tracing::debug!(state = self.state.current().name(), "Chord capture ignored");
            return false;
        }

        let draft = match self.capture_draft.take() {
            Some(mut draft) => {
                draft.reenter(slot);
                draft
            }
            None => ChordCapture::new(slot),
        };

        self.trigger.reset();
        self.capture = Some(spawn_capture_worker(
            Arc::clone(&self.backend),
            draft,
            self.tx.clone(),
        ));
        true
    }

    /// 当前捕获到的按键
    pub fn capture_keys(&self) -> Option<Vec<u32>> {
        self.capture_draft
            .as_ref()
            .map(|draft| draft.keys().to_vec())
    }

    /// 提交热键定义
    ///
    /// 草稿有效时写入配置并返回新组合；草稿为空时保留原组合，返回 `None`
    pub fn commit_chord_capture(&mut self) -> Option<HotkeyCombo> {
        self.reap();

        let slot = self.state.current().capture_slot()?;
        let draft = self.take_capture_draft();
        self.return_to_idle(SessionState::CapturingChord(slot));
        self.apply_capture(slot, draft?)
    }

    /// 取消热键定义
    ///
    /// 草稿保留到下一次进入定义
    pub fn cancel_chord_capture(&mut self) {
        self.reap();

        let Some(slot) = self.state.current().capture_slot() else {
            return;
        };

        self.capture_draft = self.take_capture_draft();
        self.return_to_idle(SessionState::CapturingChord(slot));
    }

    /// 清空捕获草稿
    ///
    /// 定义进行中时重新开始监听
    pub fn reset_chord_capture(&mut self) {
        self.reap();

        let draft = self.take_capture_draft();
        match self.state.current().capture_slot() {
            Some(slot) => {
                let mut draft = draft.unwrap_or_else(|| ChordCapture::new(slot));
                draft.reset();
                self.capture = Some(spawn_capture_worker(
                    Arc::clone(&self.backend),
                    draft,
                    self.tx.clone(),
                ));
            }
            None => self.capture_draft = None,
        }
    }

    // ===== 生命周期 =====

    /// 关闭会话
    ///
    /// 停止并等待所有任务，然后写回配置。可重复调用。
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        tracing::info!("Shutting down macro session");

        if let Some(recorder) = self.recorder.take() {
            self.install_recording(recorder.stop());
        }
        if let Some(player) = self.player.take() {
            player.stop();
        }
        if let Some(capture) = self.capture.take() {
            capture.stop();
        }
        self.stop_hotkeys();
        self.state.reset();

        if let Err(e) = self.config.flush() {
            tracing::warn!(error = %e, "Failed to flush config on shutdown");
        }
    }

    /// 回收已自行结束的任务
    fn reap(&mut self) {
        if self.recorder.as_ref().is_some_and(TaskHandle::is_finished) {
            if let Some(recorder) = self.recorder.take() {
                let result = recorder.join();
                if result.is_none() {
                    self.report_lost_task(StatusSource::Recorder, "recorder");
                }
                self.install_recording(result);
            }
            self.return_to_idle(SessionState::Recording);
        }

        if self.player.as_ref().is_some_and(TaskHandle::is_finished) {
            if let Some(player) = self.player.take() {
                if player.join().is_none() {
                    self.report_lost_task(StatusSource::Player, "player");
                }
            }
            self.return_to_idle(SessionState::Playing);
        }

        if self.capture.as_ref().is_some_and(TaskHandle::is_finished) {
            let draft = self.capture.take().and_then(TaskHandle::join);
            if let Some(slot) = self.state.current().capture_slot() {
                self.return_to_idle(SessionState::CapturingChord(slot));
                match draft {
                    // 空闲超时自动完成，等同于提交
                    Some(draft) if draft.is_finalized() => {
                        self.apply_capture(slot, draft);
                    }
                    // 监听不可用，草稿留到下一次进入
                    draft => self.capture_draft = draft,
                }
            }
        }

        if self.detector.as_ref().is_some_and(TaskHandle::is_finished) {
            if let Some(detector) = self.detector.take() {
                detector.join();
            }
            self.trigger.reset();
        }
    }

    /// 把捕获草稿写入配置并通知表示层
    ///
    /// 草稿为空时保留原组合
    fn apply_capture(&self, slot: ChordSlot, draft: ChordCapture) -> Option<HotkeyCombo> {
        let combo = match draft.to_combo() {
            Ok(combo) => combo,
            Err(e) => {
                tracing::debug!(slot = slot.name(), error = %e, "Chord capture discarded");
                return None;
            }
        };

        if let Err(e) = self.config.set_combo(slot, combo.clone()) {
            tracing::warn!(error = %e, "Failed to persist hotkey");
        }
        send_status(
            &self.tx,
            StatusSource::Capture,
            format!("Hotkey {} set to {}", slot.name(), combo.display_name()),
        );
        Some(combo)
    }

    /// 任务线程异常退出（panic 或未能启动）
    fn report_lost_task(&self, source: StatusSource, task: &str) {
        let err = AppError::Internal(format!("{} task ended unexpectedly", task));
        tracing::error!(task, error = %err, "Background task lost");
        send_status(&self.tx, source, err.status_line());
    }

    fn install_recording(&mut self, result: Option<Option<Macro>>) {
        if let Some(Some(recording)) = result {
            self.active = Arc::new(recording);
        }
    }

    /// 记住宏文件所在目录
    fn remember_dir(&self, file: &Path) {
        let Some(dir) = file.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
            return;
        };
        if let Err(e) = self.config.set_last_dir(dir.to_string_lossy()) {
            tracing::warn!(error = %e, "Failed to persist last directory");
        }
    }

    fn take_capture_draft(&mut self) -> Option<ChordCapture> {
        match self.capture.take() {
            Some(capture) => capture.stop(),
            None => self.capture_draft.take(),
        }
    }

    fn return_to_idle(&self, from: SessionState) {
        if self.state.current() == from {
            if let Err(e) = self.state.transition(SessionState::Idle) {
                tracing::warn!(error = %e, "Failed to return to idle");
                self.state.reset();
            }
        }
    }
}

impl Drop for MacroSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
