//! 集成测试共用的脚本化宿主
//!
//! - 原始输入按订阅者分发，可附带"处理该条时指针所在位置"
//! - 显示器布局可在测试中途修改
//! - 每次注入都带时间戳记录下来
//! - 原始输入监听可以中途关闭，模拟监听线程退出

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use recq_lib::host::{
    Geometry, HostBackend, HostError, HostResult, Injector, RawInput, RawInputMask,
    RawInputSource, SharedBackend,
};
use recq_lib::monitor::MonitorInfo;

/// 注入动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(i32, i32),
    Button(u32, bool),
    Key(u32, bool),
}

/// 带时间戳的注入记录
#[derive(Debug, Clone, Copy)]
pub struct Injected {
    pub at: Instant,
    pub action: Action,
}

type Queue = Arc<Mutex<VecDeque<(Option<(i32, i32)>, RawInput)>>>;

#[derive(Default)]
struct HostState {
    outputs: Vec<MonitorInfo>,
    pointer: (i32, i32),
    subscribers: Vec<(RawInputMask, Queue)>,
    injected: Vec<Injected>,
    raw_input_available: bool,
    raw_input_closed: bool,
    injector_available: bool,
}

/// 脚本化宿主
#[derive(Clone)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
}

impl MockHost {
    pub fn new(outputs: Vec<MonitorInfo>) -> Self {
        let state = HostState {
            outputs,
            raw_input_available: true,
            injector_available: true,
            ..HostState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// 两台并排的 1920x1080 显示器
    pub fn dual() -> Self {
        Self::new(vec![
            MonitorInfo::new("DP-1", 0, 0, 1920, 1080),
            MonitorInfo::new("HDMI-1", 1920, 0, 1920, 1080),
        ])
    }

    pub fn backend(&self) -> SharedBackend {
        Arc::new(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }

    pub fn set_outputs(&self, outputs: Vec<MonitorInfo>) {
        self.lock().outputs = outputs;
    }

    pub fn set_raw_input_available(&self, available: bool) {
        self.lock().raw_input_available = available;
    }

    pub fn set_injector_available(&self, available: bool) {
        self.lock().injector_available = available;
    }

    /// 关闭原始输入监听
    ///
    /// 已订阅的源取完剩余输入后报告不可用，之后的订阅直接失败
    pub fn close_raw_input(&self) {
        let mut state = self.lock();
        state.raw_input_closed = true;
        state.raw_input_available = false;
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// 等待至少 `n` 个订阅者
    pub fn wait_for_subscribers(&self, n: usize) -> bool {
        wait_until(Duration::from_secs(2), || self.subscriber_count() >= n)
    }

    /// 发送一条原始输入
    pub fn send(&self, input: RawInput) {
        self.send_at(None, input);
    }

    /// 发送一条指针输入，订阅者处理它时指针位于 `(x, y)`
    pub fn send_pointer(&self, x: i32, y: i32, input: RawInput) {
        self.send_at(Some((x, y)), input);
    }

    pub fn press_key(&self, code: u32) {
        self.send(RawInput::Key {
            code,
            pressed: true,
        });
    }

    pub fn release_key(&self, code: u32) {
        self.send(RawInput::Key {
            code,
            pressed: false,
        });
    }

    fn send_at(&self, pointer: Option<(i32, i32)>, input: RawInput) {
        let state = self.lock();
        for (mask, queue) in &state.subscribers {
            if mask.accepts(&input) {
                queue.lock().unwrap().push_back((pointer, input));
            }
        }
    }

    /// 等待所有订阅者取走已发送的输入
    pub fn wait_drained(&self) -> bool {
        wait_until(Duration::from_secs(2), || {
            self.lock()
                .subscribers
                .iter()
                .all(|(_, queue)| queue.lock().unwrap().is_empty())
        })
    }

    pub fn injected(&self) -> Vec<Injected> {
        self.lock().injected.clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.injected().into_iter().map(|i| i.action).collect()
    }

    fn record(&self, action: Action) {
        let mut state = self.lock();
        if let Action::Move(x, y) = action {
            state.pointer = (x, y);
        }
        state.injected.push(Injected {
            at: Instant::now(),
            action,
        });
    }
}

impl HostBackend for MockHost {
    fn open_geometry(&self) -> HostResult<Box<dyn Geometry>> {
        Ok(Box::new(self.clone()))
    }

    fn open_injector(&self) -> HostResult<Box<dyn Injector>> {
        if !self.lock().injector_available {
            return Err(HostError::Unavailable("no XTEST".to_string()));
        }
        Ok(Box::new(self.clone()))
    }

    fn open_raw_input(&self, mask: RawInputMask) -> HostResult<Box<dyn RawInputSource>> {
        let mut state = self.lock();
        if !state.raw_input_available {
            return Err(HostError::Unavailable("no XInput2".to_string()));
        }
        let queue = Queue::default();
        state.subscribers.push((mask, Arc::clone(&queue)));
        Ok(Box::new(MockSource {
            host: self.clone(),
            queue,
        }))
    }
}

impl Geometry for MockHost {
    fn outputs(&mut self) -> HostResult<Vec<MonitorInfo>> {
        Ok(self.lock().outputs.clone())
    }

    fn pointer_position(&mut self) -> HostResult<(i32, i32)> {
        Ok(self.lock().pointer)
    }
}

impl Injector for MockHost {
    fn move_to(&mut self, x: i32, y: i32) -> HostResult<()> {
        self.record(Action::Move(x, y));
        Ok(())
    }

    fn button(&mut self, id: u32, pressed: bool) -> HostResult<()> {
        self.record(Action::Button(id, pressed));
        Ok(())
    }

    fn key(&mut self, code: u32, pressed: bool) -> HostResult<()> {
        self.record(Action::Key(code, pressed));
        Ok(())
    }
}

struct MockSource {
    host: MockHost,
    queue: Queue,
}

impl RawInputSource for MockSource {
    fn poll(&mut self) -> HostResult<Option<RawInput>> {
        let next = self.queue.lock().unwrap().pop_front();
        let mut state = self.host.lock();
        match next {
            Some((pointer, input)) => {
                if let Some(position) = pointer {
                    state.pointer = position;
                }
                Ok(Some(input))
            }
            None if state.raw_input_closed => {
                Err(HostError::Unavailable("XRecord connection lost".to_string()))
            }
            None => Ok(None),
        }
    }
}

impl Drop for MockSource {
    fn drop(&mut self) {
        self.host
            .lock()
            .subscribers
            .retain(|(_, queue)| !Arc::ptr_eq(queue, &self.queue));
    }
}

/// 轮询直到条件成立或超时
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

pub fn motion() -> RawInput {
    RawInput::Motion
}

pub fn button(id: u32, pressed: bool) -> RawInput {
    RawInput::Button { id, pressed }
}
