//! 显示器定位模块
//!
//! 在绝对屏幕坐标与"显示器名 + 相对偏移"之间转换。
//!
//! 每次查询都重新枚举当前输出，不做缓存：录制和回放之间显示器布局可能改变，
//! 回放时按名字找回同一台显示器，再用相对偏移算出新的绝对坐标；
//! 找不到时退回到录制时的绝对坐标。

use serde::{Deserialize, Serialize};

use crate::host::Geometry;

/// 一个活动输出在全局坐标空间中的位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorInfo {
    /// 输出名称（如 `HDMI-1`）
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl MonitorInfo {
    /// 创建输出描述
    pub fn new(name: impl Into<String>, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// 点是否落在矩形内（左上闭、右下开）
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        let (left, top) = (i64::from(self.x), i64::from(self.y));
        x >= left
            && x < left + i64::from(self.width)
            && y >= top
            && y < top + i64::from(self.height)
    }
}

/// 事件相对于某台显示器的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorAnchor {
    /// 显示器名称
    pub monitor: String,
    /// 相对显示器左上角的 X 偏移
    pub rel_x: i32,
    /// 相对显示器左上角的 Y 偏移
    pub rel_y: i32,
}

/// 坐标解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPoint {
    pub x: i32,
    pub y: i32,
    /// 是否通过显示器重新映射得到（显示器仍然存在）
    pub remapped: bool,
}

/// 显示器定位器
///
/// 借用一个几何查询连接，每次调用都重新枚举输出
pub struct MonitorLocator<'a> {
    geometry: &'a mut dyn Geometry,
}

impl<'a> MonitorLocator<'a> {
    /// 基于几何查询连接创建定位器
    pub fn new(geometry: &'a mut dyn Geometry) -> Self {
        Self { geometry }
    }

    fn outputs(&mut self) -> Vec<MonitorInfo> {
        match self.geometry.outputs() {
            Ok(outputs) => outputs,
            Err(e) => {
                tracing::warn!(error = %e, "Output query failed, treating layout as empty");
                Vec::new()
            }
        }
    }

    /// 找到包含该点的第一台显示器
    pub fn locate_by_point(&mut self, x: i32, y: i32) -> Option<MonitorInfo> {
        self.outputs().into_iter().find(|m| m.contains(x, y))
    }

    /// 按名称找到显示器
    pub fn locate_by_name(&mut self, name: &str) -> Option<MonitorInfo> {
        self.outputs().into_iter().find(|m| m.name == name)
    }

    /// 计算点相对所在显示器的锚点
    ///
    /// 点不在任何显示器内时返回 `None`
    pub fn anchor_for(&mut self, x: i32, y: i32) -> Option<MonitorAnchor> {
        self.locate_by_point(x, y).map(|m| MonitorAnchor {
            rel_x: x - m.x,
            rel_y: y - m.y,
            monitor: m.name,
        })
    }

    /// 把录制时的坐标解析为当前布局下的绝对坐标
    ///
    /// 锚点指向的显示器仍存在时按其当前位置重新映射，
    /// 否则原样使用录制时的绝对坐标。
    pub fn resolve(&mut self, x: i32, y: i32, anchor: Option<&MonitorAnchor>) -> ResolvedPoint {
        let literal = ResolvedPoint {
            x,
            y,
            remapped: false,
        };

        let Some(anchor) = anchor else {
            return literal;
        };
        if anchor.monitor.is_empty() {
            return literal;
        }

        match self.locate_by_name(&anchor.monitor) {
            Some(monitor) => ResolvedPoint {
                x: monitor.x + anchor.rel_x,
                y: monitor.y + anchor.rel_y,
                remapped: true,
            },
            None => {
                tracing::debug!(
                    monitor = %anchor.monitor,
                    "Recorded monitor no longer present, using absolute coordinates"
                );
                literal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostError, HostResult};

    struct FixedLayout(Vec<MonitorInfo>);

    impl Geometry for FixedLayout {
        fn outputs(&mut self) -> HostResult<Vec<MonitorInfo>> {
            Ok(self.0.clone())
        }

        fn pointer_position(&mut self) -> HostResult<(i32, i32)> {
            Err(HostError::QueryFailed("unused".to_string()))
        }
    }

    fn dual() -> FixedLayout {
        FixedLayout(vec![
            MonitorInfo::new("DP-1", 0, 0, 1920, 1080),
            MonitorInfo::new("HDMI-1", 1920, 0, 1280, 1024),
        ])
    }

    #[test]
    fn test_contains_edges() {
        let m = MonitorInfo::new("DP-1", 0, 0, 100, 50);
        assert!(m.contains(0, 0));
        assert!(m.contains(99, 49));
        assert!(!m.contains(100, 0));
        assert!(!m.contains(0, 50));
        assert!(!m.contains(-1, 10));
    }

    #[test]
    fn test_contains_extreme_geometry() {
        let m = MonitorInfo::new("huge", i32::MAX - 10, i32::MAX - 10, 100, 100);
        assert!(m.contains(i32::MAX, i32::MAX));
        assert!(!m.contains(i32::MAX - 11, i32::MAX));

        let m = MonitorInfo::new("negative", i32::MIN, 0, 50, 50);
        assert!(m.contains(i32::MIN, 0));
        assert!(!m.contains(i32::MIN + 50, 0));
    }

    #[test]
    fn test_locate_by_point() {
        let mut layout = dual();
        let mut locator = MonitorLocator::new(&mut layout);

        assert_eq!(locator.locate_by_point(10, 10).unwrap().name, "DP-1");
        assert_eq!(locator.locate_by_point(2000, 500).unwrap().name, "HDMI-1");
        assert!(locator.locate_by_point(2000, 1050).is_none());
    }

    #[test]
    fn test_locate_by_name() {
        let mut layout = dual();
        let mut locator = MonitorLocator::new(&mut layout);

        assert_eq!(locator.locate_by_name("HDMI-1").unwrap().x, 1920);
        assert!(locator.locate_by_name("VGA-0").is_none());
    }

    #[test]
    fn test_anchor_is_relative_to_monitor_origin() {
        let mut layout = dual();
        let mut locator = MonitorLocator::new(&mut layout);

        let anchor = locator.anchor_for(2020, 30).unwrap();
        assert_eq!(anchor.monitor, "HDMI-1");
        assert_eq!((anchor.rel_x, anchor.rel_y), (100, 30));
        assert!(locator.anchor_for(-5, -5).is_none());
    }

    #[test]
    fn test_resolve_remaps_moved_monitor() {
        let mut layout = FixedLayout(vec![MonitorInfo::new("HDMI-1", 0, 1080, 1280, 1024)]);
        let mut locator = MonitorLocator::new(&mut layout);

        let anchor = MonitorAnchor {
            monitor: "HDMI-1".to_string(),
            rel_x: 100,
            rel_y: 30,
        };
        let point = locator.resolve(2020, 30, Some(&anchor));
        assert_eq!(
            point,
            ResolvedPoint {
                x: 100,
                y: 1110,
                remapped: true
            }
        );
    }

    #[test]
    fn test_resolve_falls_back_to_absolute() {
        let mut layout = dual();
        let mut locator = MonitorLocator::new(&mut layout);

        let anchor = MonitorAnchor {
            monitor: "VGA-0".to_string(),
            rel_x: 5,
            rel_y: 5,
        };
        let point = locator.resolve(300, 400, Some(&anchor));
        assert_eq!((point.x, point.y, point.remapped), (300, 400, false));

        let point = locator.resolve(7, 8, None);
        assert_eq!((point.x, point.y, point.remapped), (7, 8, false));
    }
}
