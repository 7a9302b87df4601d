//! 宏文件格式
//!
//! ```json
//! {"format":"recq-v1","events":[
//!   {"type":"mm","t":0,"x":10,"y":20},
//!   {"type":"mb","t":15,"x":10,"y":20,"btn":1,"down":true},
//!   {"type":"key","t":40,"code":38,"down":false}
//! ]}
//! ```
//!
//! 只保存绝对坐标，显示器锚点不落盘。读取分两步：先按带格式标记的文档解析，
//! 再按旧版的纯数组解析，都不是时得到空宏。不是对象或 `type` 无法识别的记录
//! 被跳过；已知类型的记录中，缺失或类型不符的字段取默认值（数值 0，布尔 false）。

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::{StorageError, StorageResult};
use crate::recording::{Event, Macro};

/// 当前格式标记
pub const FORMAT_TAG: &str = "recq-v1";

/// 格式标记前缀，读取时只做提示性检查
const FORMAT_FAMILY: &str = "recq-";

#[derive(Serialize)]
struct Document<'a> {
    format: &'a str,
    events: Vec<WireEvent>,
}

/// 写出的事件记录
#[derive(Serialize)]
#[serde(tag = "type")]
enum WireEvent {
    #[serde(rename = "mm")]
    Move { t: u64, x: i32, y: i32 },
    #[serde(rename = "mb")]
    Button {
        t: u64,
        x: i32,
        y: i32,
        btn: u32,
        down: bool,
    },
    #[serde(rename = "key")]
    Key { t: u64, code: u32, down: bool },
}

impl From<&Event> for WireEvent {
    fn from(event: &Event) -> Self {
        match event {
            Event::MouseMove { t_ms, x, y, .. } => Self::Move {
                t: *t_ms,
                x: *x,
                y: *y,
            },
            Event::MouseButton {
                t_ms,
                x,
                y,
                button,
                pressed,
                ..
            } => Self::Button {
                t: *t_ms,
                x: *x,
                y: *y,
                btn: *button,
                down: *pressed,
            },
            Event::Key {
                t_ms,
                keycode,
                pressed,
            } => Self::Key {
                t: *t_ms,
                code: *keycode,
                down: *pressed,
            },
        }
    }
}

/// 读入的事件记录
///
/// 数值字段按浮点读取再取整
struct WireRecord<'a>(&'a Map<String, Value>);

impl WireRecord<'_> {
    fn number(&self, field: &str) -> f64 {
        self.0.get(field).and_then(Value::as_f64).unwrap_or(0.0)
    }

    fn flag(&self, field: &str) -> bool {
        self.0.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    fn to_event(&self) -> Option<Event> {
        let t_ms = self.number("t") as u64;
        let (x, y) = (self.number("x") as i32, self.number("y") as i32);
        match self.0.get("type").and_then(Value::as_str)? {
            "mm" => Some(Event::mouse_move(t_ms, x, y)),
            "mb" => Some(Event::mouse_button(
                t_ms,
                x,
                y,
                self.number("btn") as u32,
                self.flag("down"),
            )),
            "key" => Some(Event::key(t_ms, self.number("code") as u32, self.flag("down"))),
            _ => None,
        }
    }
}

/// 把宏编码为带格式标记的文档
pub fn serialize(recording: &Macro) -> StorageResult<Vec<u8>> {
    let document = Document {
        format: FORMAT_TAG,
        events: recording.iter().map(WireEvent::from).collect(),
    };
    serde_json::to_vec(&document).map_err(|e| StorageError::Encode(e.to_string()))
}

/// 从字节解码宏
///
/// 无法解析的文档得到空宏；无法识别的记录被跳过
pub fn deserialize(bytes: &[u8]) -> Macro {
    let root: Value = match serde_json::from_slice(bytes) {
        Ok(root) => root,
        Err(e) => {
            tracing::warn!(error = %e, "Macro document is not valid JSON");
            return Macro::new();
        }
    };

    let records = match root {
        Value::Object(mut document) => {
            match document.get("format").and_then(Value::as_str) {
                Some(tag) if tag.starts_with(FORMAT_FAMILY) => {}
                other => {
                    tracing::debug!(format = ?other, "Unexpected macro format tag, reading anyway")
                }
            }
            match document.remove("events") {
                Some(Value::Array(records)) => records,
                _ => {
                    tracing::warn!("Macro document has no event list");
                    return Macro::new();
                }
            }
        }
        Value::Array(records) => {
            tracing::debug!("Reading legacy macro list");
            records
        }
        _ => {
            tracing::warn!("Macro document has unexpected top-level shape");
            return Macro::new();
        }
    };

    let total = records.len();
    let events: Vec<Event> = records
        .iter()
        .filter_map(|record| record.as_object().and_then(|r| WireRecord(r).to_event()))
        .collect();

    if events.len() < total {
        tracing::debug!(skipped = total - events.len(), "Skipped unrecognized macro records");
    }

    Macro::from_events(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MonitorAnchor;

    fn sample() -> Macro {
        Macro::from_events(vec![
            Event::mouse_button(0, 5, 5, 1, true),
            Event::mouse_move(50, 100, 100),
            Event::mouse_button(80, 100, 100, 1, false),
            Event::key(120, 38, true),
            Event::key(130, 38, false),
        ])
    }

    #[test]
    fn test_roundtrip() {
        let recording = sample();
        let bytes = serialize(&recording).unwrap();
        assert_eq!(deserialize(&bytes), recording);
    }

    #[test]
    fn test_document_shape() {
        let bytes = serialize(&sample()).unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["format"], "recq-v1");
        assert_eq!(json["events"][0]["type"], "mb");
        assert_eq!(json["events"][0]["btn"], 1);
        assert_eq!(json["events"][0]["down"], true);
        assert_eq!(json["events"][1]["t"], 50);
        assert_eq!(json["events"][3]["code"], 38);
        assert!(json["events"][3].get("x").is_none());
    }

    #[test]
    fn test_anchor_not_persisted() {
        let recording = Macro::from_events(vec![Event::MouseMove {
            t_ms: 0,
            x: 2020,
            y: 30,
            anchor: Some(MonitorAnchor {
                monitor: "HDMI-1".to_string(),
                rel_x: 100,
                rel_y: 30,
            }),
        }]);

        let bytes = serialize(&recording).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(!text.contains("HDMI-1"));
        assert_eq!(deserialize(&bytes).events()[0], Event::mouse_move(0, 2020, 30));
    }

    #[test]
    fn test_legacy_list() {
        let legacy = br#"[
            {"t": 0, "type": "mm", "x": 1, "y": 2},
            {"t": 10.0, "type": "mb", "x": 1, "y": 2, "btn": 3, "down": true},
            {"t": 20, "type": "key", "code": 38, "down": false}
        ]"#;

        let recording = deserialize(legacy);
        assert_eq!(recording.len(), 3);
        assert_eq!(recording.events()[1], Event::mouse_button(10, 1, 2, 3, true));
        assert_eq!(recording.events()[2], Event::key(20, 38, false));
    }

    #[test]
    fn test_unknown_type_skipped() {
        let document = br#"{"format":"recq-v1","events":[
            {"t": 0, "type": "mm", "x": 1, "y": 1},
            {"t": 5, "type": "scroll", "dx": 3},
            {"t": 9, "type": "key", "code": 9, "down": true}
        ]}"#;

        let recording = deserialize(document);
        assert_eq!(recording.len(), 2);
        assert_eq!(recording.events()[1], Event::key(9, 9, true));
    }

    #[test]
    fn test_malformed_record_skipped() {
        let document = br#"[{"t": 0, "type": "mm", "x": 1, "y": 1}, 42, {"type": 7}, "mm"]"#;
        assert_eq!(deserialize(document).len(), 1);
    }

    #[test]
    fn test_mistyped_fields_default() {
        let document = br#"[
            {"t": 4, "type": "key", "code": 38, "down": "yes"},
            {"t": "late", "type": "mb", "x": "10", "y": 20, "btn": 1, "down": true}
        ]"#;

        let recording = deserialize(document);
        assert_eq!(recording.len(), 2);
        assert_eq!(recording.events()[0], Event::key(4, 38, false));
        assert_eq!(recording.events()[1], Event::mouse_button(0, 0, 20, 1, true));
    }

    #[test]
    fn test_malformed_document_is_empty() {
        assert!(deserialize(b"").is_empty());
        assert!(deserialize(b"{not json").is_empty());
        assert!(deserialize(b"\"recq-v1\"").is_empty());
        assert!(deserialize(br#"{"format":"recq-v1"}"#).is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let recording = deserialize(br#"[{"type": "mb"}]"#);
        assert_eq!(recording.events()[0], Event::mouse_button(0, 0, 0, 0, false));
    }
}
