//! 热键组合
//!
//! 最多 3 个互不相同的按键，按无序集合匹配。
//! 显示名由按键名称模块生成，只用于界面显示。

use serde::{Deserialize, Serialize};

use super::error::{HotkeyError, HotkeyResult};
use crate::keys;

/// 组合内按键数量上限
pub const MAX_CHORD_KEYS: usize = 3;

/// 热键组合
///
/// 序列化为 `{"display": "Ctrl+K", "keys": [37, 45]}`
///
/// # Examples
///
/// ```
/// use recq_lib::hotkey::HotkeyCombo;
///
/// let combo = HotkeyCombo::try_new(vec![37, 45]).unwrap();
/// assert_eq!(combo.display_name(), "Ctrl+K");
/// assert!(combo.matches(&[45, 37]));
/// assert!(!combo.matches(&[37]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ComboRecord")]
pub struct HotkeyCombo {
    #[serde(rename = "display")]
    display_name: String,
    keys: Vec<u32>,
}

impl HotkeyCombo {
    /// 由按键序列创建组合
    ///
    /// # Errors
    ///
    /// 空序列、超过 [`MAX_CHORD_KEYS`] 个按键或有重复按键时返回错误
    pub fn try_new(keys: impl Into<Vec<u32>>) -> HotkeyResult<Self> {
        let keys = keys.into();
        if keys.is_empty() {
            return Err(HotkeyError::Empty);
        }
        if keys.len() > MAX_CHORD_KEYS {
            return Err(HotkeyError::TooManyKeys(keys.len()));
        }
        for (i, code) in keys.iter().enumerate() {
            if keys[..i].contains(code) {
                return Err(HotkeyError::DuplicateKey(*code));
            }
        }

        Ok(Self {
            display_name: keys::display_name(&keys),
            keys,
        })
    }

    /// 单键组合
    pub fn single(code: u32) -> Self {
        Self {
            display_name: keys::key_label(code),
            keys: vec![code],
        }
    }

    /// 空组合（从不匹配）
    pub fn empty() -> Self {
        Self {
            display_name: String::new(),
            keys: Vec::new(),
        }
    }

    /// 按捕获顺序排列的按键
    pub fn keys(&self) -> &[u32] {
        &self.keys
    }

    /// 显示名
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// 是否为空组合
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 排序后的按键
    pub fn sorted_keys(&self) -> Vec<u32> {
        let mut sorted = self.keys.clone();
        sorted.sort_unstable();
        sorted
    }

    /// 按住的按键集合是否恰好等于本组合
    ///
    /// 子集和超集都不匹配；空组合从不匹配
    pub fn matches(&self, held: &[u32]) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut held = held.to_vec();
        held.sort_unstable();
        held.dedup();
        held == self.sorted_keys()
    }
}

impl Default for HotkeyCombo {
    fn default() -> Self {
        Self::empty()
    }
}

/// 配置文件中的组合记录
///
/// 读取时宽松处理：去掉重复按键、截断到上限，显示名缺失时重新生成
#[derive(Deserialize)]
struct ComboRecord {
    #[serde(default)]
    display: String,
    #[serde(default)]
    keys: Vec<u32>,
}

impl From<ComboRecord> for HotkeyCombo {
    fn from(record: ComboRecord) -> Self {
        let mut keys: Vec<u32> = Vec::with_capacity(MAX_CHORD_KEYS);
        for code in record.keys {
            if keys.len() < MAX_CHORD_KEYS && !keys.contains(&code) {
                keys.push(code);
            }
        }

        let display_name = if record.display.is_empty() {
            keys::display_name(&keys)
        } else {
            record.display
        };

        Self { display_name, keys }
    }
}
