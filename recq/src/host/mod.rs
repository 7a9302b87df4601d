//! 宿主输入接口模块
//!
//! 核心逻辑不直接访问操作系统，而是通过两组窄接口与宿主交互：
//!
//! - **几何查询** [`Geometry`]：当前活动输出的矩形、指针绝对位置
//! - **事件注入** [`Injector`]：合成指针移动、按钮和按键事件
//!
//! 另外，录制器和热键任务通过 [`RawInputSource`] 读取原始输入通知。
//!
//! [`HostBackend`] 是这三者的工厂。每个后台任务在自己的线程里调用
//! `open_*` 打开独立的连接；打开失败即视为"能力不可用"，任务报告状态后退出。
//!
//! # 子模块
//!
//! - [`error`] - 错误类型定义
//! - [`platform`] - 显示服务器检测
//! - `desktop` - 基于 enigo / rdev / xcap 的桌面后端（仅 Linux X11）
//! - `keymap` - rdev 按键/按钮与 X11 编号之间的映射（仅 Linux）
//!
//! # 按键码与按钮编号
//!
//! 按键码使用 X11 硬件按键码（evdev 码 + 8），按钮编号使用 X11 约定：
//! 1 左键、2 中键、3 右键、4-7 滚轮、8/9 后退/前进。

pub mod error;
pub mod platform;

#[cfg(target_os = "linux")]
pub mod desktop;
#[cfg(target_os = "linux")]
pub mod keymap;

use std::sync::Arc;

pub use error::{HostError, HostResult};

use crate::monitor::MonitorInfo;

/// 原始输入通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    /// 指针相对移动（具体位置需另行查询）
    Motion,
    /// 指针按钮按下/释放
    Button { id: u32, pressed: bool },
    /// 键盘按键按下/释放
    Key { code: u32, pressed: bool },
}

/// 原始输入订阅掩码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputMask {
    /// 订阅指针移动和按钮
    pub pointer: bool,
    /// 订阅按键
    pub keys: bool,
}

impl RawInputMask {
    /// 指针和键盘全部订阅（录制器）
    pub const ALL: Self = Self {
        pointer: true,
        keys: true,
    };

    /// 仅订阅键盘（热键检测、热键捕获、停止监视）
    pub const KEYS: Self = Self {
        pointer: false,
        keys: true,
    };

    /// 检查输入是否在订阅范围内
    pub fn accepts(&self, input: &RawInput) -> bool {
        match input {
            RawInput::Key { .. } => self.keys,
            RawInput::Motion | RawInput::Button { .. } => self.pointer,
        }
    }
}

/// 几何查询接口
pub trait Geometry {
    /// 枚举当前已连接且有活动模式的输出
    fn outputs(&mut self) -> HostResult<Vec<MonitorInfo>>;

    /// 查询指针的绝对位置
    fn pointer_position(&mut self) -> HostResult<(i32, i32)>;
}

/// 事件注入接口
pub trait Injector {
    /// 将指针移动到绝对坐标
    fn move_to(&mut self, x: i32, y: i32) -> HostResult<()>;

    /// 注入按钮按下/释放
    fn button(&mut self, id: u32, pressed: bool) -> HostResult<()>;

    /// 注入按键按下/释放
    fn key(&mut self, code: u32, pressed: bool) -> HostResult<()>;
}

/// 原始输入源
pub trait RawInputSource {
    /// 非阻塞地取出下一条待处理的通知
    ///
    /// 没有待处理通知时返回 `Ok(None)`，调用方自行休眠后重试。
    /// 底层监听已经结束时返回 [`HostError::Unavailable`]，之后不会再有通知。
    fn poll(&mut self) -> HostResult<Option<RawInput>>;
}

/// 宿主后端
///
/// 由表示层在启动时创建一次，在各任务之间共享
pub trait HostBackend: Send + Sync {
    /// 打开几何查询连接
    fn open_geometry(&self) -> HostResult<Box<dyn Geometry>>;

    /// 打开事件注入连接
    fn open_injector(&self) -> HostResult<Box<dyn Injector>>;

    /// 订阅原始输入
    fn open_raw_input(&self, mask: RawInputMask) -> HostResult<Box<dyn RawInputSource>>;
}

/// 共享宿主后端
pub type SharedBackend = Arc<dyn HostBackend>;

/// 创建当前平台的默认后端
///
/// Linux 上返回桌面后端；其他平台返回的后端在打开任何连接时都报告不可用
pub fn default_backend() -> SharedBackend {
    #[cfg(target_os = "linux")]
    {
        Arc::new(desktop::DesktopBackend::new())
    }

    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(UnsupportedBackend)
    }
}

/// 不支持的平台
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

impl UnsupportedBackend {
    fn unavailable() -> HostError {
        HostError::Unavailable(format!(
            "input capture is not supported on {}",
            platform::Platform::current().name()
        ))
    }
}

impl HostBackend for UnsupportedBackend {
    fn open_geometry(&self) -> HostResult<Box<dyn Geometry>> {
        Err(Self::unavailable())
    }

    fn open_injector(&self) -> HostResult<Box<dyn Injector>> {
        Err(Self::unavailable())
    }

    fn open_raw_input(&self, _mask: RawInputMask) -> HostResult<Box<dyn RawInputSource>> {
        Err(Self::unavailable())
    }
}
