//! Linux X11 桌面后端
//!
//! - 注入和指针查询：`enigo`（XTest）
//! - 输出几何：`xcap::Monitor::all()`，只包含有活动模式的输出
//! - 原始输入：进程内唯一的 `rdev::listen` 监听线程，向所有订阅者广播
//!
//! `rdev::listen` 一旦启动便无法停止，因此只启动一次；
//! 订阅者（[`DesktopRawInput`]）被丢弃后会在下一次广播时自动移除。

use std::sync::{Arc, Mutex, OnceLock};

use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use tokio::sync::mpsc;

use super::error::{HostError, HostResult};
use super::keymap;
use super::platform::detect_display_server;
use super::{Geometry, HostBackend, Injector, RawInput, RawInputMask, RawInputSource};
use crate::monitor::MonitorInfo;

/// 桌面后端
#[derive(Debug, Default)]
pub struct DesktopBackend;

impl DesktopBackend {
    /// 创建桌面后端
    pub fn new() -> Self {
        Self
    }

    /// 确认当前会话运行在 X11 上
    fn ensure_x11() -> HostResult<()> {
        let server = detect_display_server();
        if server.supports_raw_input() {
            Ok(())
        } else {
            Err(HostError::Unavailable(format!(
                "X11 display required, found {}",
                server.name()
            )))
        }
    }
}

impl HostBackend for DesktopBackend {
    fn open_geometry(&self) -> HostResult<Box<dyn Geometry>> {
        Self::ensure_x11()?;
        Ok(Box::new(DesktopGeometry::new()?))
    }

    fn open_injector(&self) -> HostResult<Box<dyn Injector>> {
        Self::ensure_x11()?;
        Ok(Box::new(DesktopInjector::new()?))
    }

    fn open_raw_input(&self, mask: RawInputMask) -> HostResult<Box<dyn RawInputSource>> {
        Self::ensure_x11()?;
        let rx = RdevHub::global().subscribe(mask)?;
        Ok(Box::new(DesktopRawInput { rx }))
    }
}

fn new_enigo() -> HostResult<Enigo> {
    Enigo::new(&Settings::default())
        .map_err(|e| HostError::Unavailable(format!("Failed to open X display: {}", e)))
}

/// 基于 xcap 和 enigo 的几何查询
pub struct DesktopGeometry {
    enigo: Enigo,
}

impl DesktopGeometry {
    fn new() -> HostResult<Self> {
        Ok(Self { enigo: new_enigo()? })
    }
}

impl Geometry for DesktopGeometry {
    fn outputs(&mut self) -> HostResult<Vec<MonitorInfo>> {
        let monitors = xcap::Monitor::all()
            .map_err(|e| HostError::QueryFailed(format!("Failed to list outputs: {}", e)))?;

        let mut outputs = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let info = (|| {
                Ok::<_, xcap::XCapError>(MonitorInfo {
                    name: monitor.name()?,
                    x: monitor.x()?,
                    y: monitor.y()?,
                    width: monitor.width()? as i32,
                    height: monitor.height()? as i32,
                })
            })();

            match info {
                Ok(info) => outputs.push(info),
                Err(e) => tracing::warn!(error = %e, "Skipping output with unreadable geometry"),
            }
        }

        Ok(outputs)
    }

    fn pointer_position(&mut self) -> HostResult<(i32, i32)> {
        self.enigo
            .location()
            .map_err(|e| HostError::QueryFailed(format!("Failed to query pointer: {}", e)))
    }
}

/// 基于 enigo 的事件注入
pub struct DesktopInjector {
    enigo: Enigo,
}

impl DesktopInjector {
    fn new() -> HostResult<Self> {
        Ok(Self { enigo: new_enigo()? })
    }

    fn direction(pressed: bool) -> Direction {
        if pressed {
            Direction::Press
        } else {
            Direction::Release
        }
    }

    fn enigo_button(id: u32) -> HostResult<Button> {
        match id {
            1 => Ok(Button::Left),
            2 => Ok(Button::Middle),
            3 => Ok(Button::Right),
            4 => Ok(Button::ScrollUp),
            5 => Ok(Button::ScrollDown),
            6 => Ok(Button::ScrollLeft),
            7 => Ok(Button::ScrollRight),
            8 => Ok(Button::Back),
            9 => Ok(Button::Forward),
            other => Err(HostError::InjectionFailed(format!(
                "Unsupported button id {}",
                other
            ))),
        }
    }
}

impl Injector for DesktopInjector {
    fn move_to(&mut self, x: i32, y: i32) -> HostResult<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| HostError::InjectionFailed(format!("Failed to move pointer: {}", e)))
    }

    fn button(&mut self, id: u32, pressed: bool) -> HostResult<()> {
        let button = Self::enigo_button(id)?;
        self.enigo
            .button(button, Self::direction(pressed))
            .map_err(|e| HostError::InjectionFailed(format!("Failed to send button {}: {}", id, e)))
    }

    fn key(&mut self, code: u32, pressed: bool) -> HostResult<()> {
        let raw = u16::try_from(code)
            .map_err(|_| HostError::InjectionFailed(format!("Invalid key code: {}", code)))?;
        self.enigo
            .raw(raw, Self::direction(pressed))
            .map_err(|e| HostError::InjectionFailed(format!("Failed to send key {}: {}", code, e)))
    }
}

/// rdev 原始输入订阅
pub struct DesktopRawInput {
    rx: mpsc::UnboundedReceiver<RawInput>,
}

impl RawInputSource for DesktopRawInput {
    fn poll(&mut self) -> HostResult<Option<RawInput>> {
        match self.rx.try_recv() {
            Ok(input) => Ok(Some(input)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(HostError::Unavailable(
                RdevHub::global()
                    .failure_message()
                    .unwrap_or_else(|| "raw input listener stopped".to_string()),
            )),
        }
    }
}

type Subscriber = (RawInputMask, mpsc::UnboundedSender<RawInput>);

/// 进程内唯一的 rdev 监听线程
struct RdevHub {
    subscribers: Mutex<Vec<Subscriber>>,
    failure: Mutex<Option<String>>,
}

impl RdevHub {
    fn global() -> &'static Arc<RdevHub> {
        static HUB: OnceLock<Arc<RdevHub>> = OnceLock::new();
        HUB.get_or_init(|| {
            let hub = Arc::new(RdevHub {
                subscribers: Mutex::new(Vec::new()),
                failure: Mutex::new(None),
            });
            Self::start_listener(Arc::clone(&hub));
            hub
        })
    }

    fn start_listener(hub: Arc<RdevHub>) {
        let spawned = std::thread::Builder::new()
            .name("recq-rdev".to_string())
            .spawn(move || {
                tracing::info!("Raw input listener started");
                let dispatch_hub = Arc::clone(&hub);
                if let Err(e) = rdev::listen(move |event| dispatch_hub.dispatch(event.event_type)) {
                    let message = format!("Raw input extension not available: {:?}", e);
                    tracing::error!(error = %message, "Raw input listener exited");
                    if let Ok(mut failure) = hub.failure.lock() {
                        *failure = Some(message);
                    }
                    // 关闭所有订阅，让轮询方看到断开
                    if let Ok(mut subscribers) = hub.subscribers.lock() {
                        subscribers.clear();
                    }
                }
            });

        if let Err(e) = spawned {
            tracing::error!(error = %e, "Failed to spawn raw input listener");
        }
    }

    fn failure_message(&self) -> Option<String> {
        self.failure.lock().ok().and_then(|f| f.clone())
    }

    fn subscribe(&self, mask: RawInputMask) -> HostResult<mpsc::UnboundedReceiver<RawInput>> {
        if let Some(message) = self.failure_message() {
            return Err(HostError::Unavailable(message));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .map_err(|_| HostError::Unavailable("raw input hub poisoned".to_string()))?
            .push((mask, tx));
        Ok(rx)
    }

    fn dispatch(&self, event: rdev::EventType) {
        let inputs = translate(event);
        if inputs.is_empty() {
            return;
        }

        let Ok(mut subscribers) = self.subscribers.lock() else {
            return;
        };
        subscribers.retain(|(mask, tx)| {
            inputs
                .iter()
                .filter(|input| mask.accepts(input))
                .all(|input| tx.send(*input).is_ok())
        });
    }
}

/// rdev 事件 → 原始输入通知
fn translate(event: rdev::EventType) -> Vec<RawInput> {
    use rdev::EventType;

    match event {
        EventType::MouseMove { .. } => vec![RawInput::Motion],
        EventType::ButtonPress(button) => vec![RawInput::Button {
            id: keymap::button_id(button),
            pressed: true,
        }],
        EventType::ButtonRelease(button) => vec![RawInput::Button {
            id: keymap::button_id(button),
            pressed: false,
        }],
        EventType::Wheel { delta_x, delta_y } => match keymap::wheel_button_id(delta_x, delta_y) {
            Some(id) => vec![
                RawInput::Button { id, pressed: true },
                RawInput::Button { id, pressed: false },
            ],
            None => Vec::new(),
        },
        EventType::KeyPress(key) => keymap::keycode_from_key(key)
            .map(|code| vec![RawInput::Key { code, pressed: true }])
            .unwrap_or_default(),
        EventType::KeyRelease(key) => keymap::keycode_from_key(key)
            .map(|code| vec![RawInput::Key { code, pressed: false }])
            .unwrap_or_default(),
    }
}
