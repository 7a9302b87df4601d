//! 应用配置模块
//!
//! 提供配置的加载、保存和管理功能
//!
//! 配置文件的位置由表示层决定，这里只接收一个路径。文件格式：
//!
//! ```json
//! {
//!   "lastDir": "/home/user/macros",
//!   "startRecording": {"display": "F9", "keys": [75]},
//!   "startPlayback": {"display": "F10", "keys": [76]},
//!   "stopPlayback": {"display": "F11", "keys": [95]}
//! }
//! ```
//!
//! # 使用示例
//!
//! ```no_run
//! use recq_lib::state::ConfigStore;
//!
//! let store = ConfigStore::open("/home/user/.config/recq/config.json");
//! store.set_last_dir("/home/user/macros")?;
//! assert_eq!(store.get().last_dir, "/home/user/macros");
//! # Ok::<(), recq_lib::state::ConfigError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hotkey::{ChordSlot, HotkeyCombo, HotkeyConfig};

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 应用配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// 最近一次加载/保存宏文件所在目录，用作文件对话框的起始目录
    pub last_dir: String,

    /// 热键配置
    #[serde(flatten)]
    pub hotkeys: HotkeyConfig,
}

/// 配置存储
///
/// 持有配置文件路径和当前配置；读取无锁，每次修改都立即写回文件
pub struct ConfigStore {
    path: PathBuf,
    config: ArcSwap<AppConfig>,
}

impl ConfigStore {
    /// 打开配置文件
    ///
    /// 文件不存在时使用默认配置；文件无法读取或格式错误时记录警告并使用默认配置
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Config unreadable, using defaults"
                );
                AppConfig::default()
            }
        };
        Self::with_config(path, config)
    }

    /// 使用给定配置创建存储（不读文件）
    pub fn with_config(path: impl Into<PathBuf>, config: AppConfig) -> Self {
        Self {
            path: path.into(),
            config: ArcSwap::new(Arc::new(config)),
        }
    }

    /// 从文件加载配置
    ///
    /// 文件不存在时返回默认配置
    pub fn load(path: &Path) -> ConfigResult<AppConfig> {
        tracing::debug!(path = %path.display(), "Loading config");

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = serde_json::from_str(&content)?;
            tracing::info!(path = %path.display(), "Config loaded successfully");
            Ok(config)
        } else {
            tracing::info!("Config file not found, using defaults");
            Ok(AppConfig::default())
        }
    }

    /// 把配置保存到文件
    pub fn save(path: &Path, config: &AppConfig) -> ConfigResult<()> {
        tracing::debug!(path = %path.display(), "Saving config");

        // 确保目录存在
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(path, content)?;

        tracing::info!(path = %path.display(), "Config saved successfully");
        Ok(())
    }

    /// 配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 获取当前配置
    pub fn get(&self) -> Arc<AppConfig> {
        self.config.load_full()
    }

    /// 修改配置并写回文件
    ///
    /// 写文件失败时内存中的修改仍然生效
    pub fn update<F>(&self, mutate: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = (*self.config.load_full()).clone();
        mutate(&mut config);
        self.config.store(Arc::new(config));
        self.flush()
    }

    /// 更新最近使用的目录
    pub fn set_last_dir(&self, dir: impl Into<String>) -> ConfigResult<()> {
        let dir = dir.into();
        self.update(|config| config.last_dir = dir)
    }

    /// 更新某个槽位的热键组合
    pub fn set_combo(&self, slot: ChordSlot, combo: HotkeyCombo) -> ConfigResult<()> {
        tracing::info!(slot = slot.name(), combo = combo.display_name(), "Hotkey updated");
        self.update(|config| config.hotkeys.set(slot, combo))
    }

    /// 最近使用的目录
    pub fn last_dir(&self) -> String {
        self.config.load().last_dir.clone()
    }

    /// 当前热键配置
    pub fn hotkeys(&self) -> HotkeyConfig {
        self.config.load().hotkeys.clone()
    }

    /// 把当前配置写回文件
    pub fn flush(&self) -> ConfigResult<()> {
        Self::save(&self.path, &self.config.load_full())
    }

    /// 重置为默认配置并写回文件
    pub fn reset(&self) -> ConfigResult<()> {
        self.config.store(Arc::new(AppConfig::default()));
        tracing::info!("Config reset to defaults");
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert!(config.last_dir.is_empty());
        assert_eq!(config.hotkeys.start_recording.keys(), &[75]);
        assert_eq!(config.hotkeys.start_playback.keys(), &[76]);
        assert_eq!(config.hotkeys.stop_playback.keys(), &[95]);
    }

    #[test]
    fn test_app_config_wire_names() {
        let config = AppConfig {
            last_dir: "/tmp".to_string(),
            ..AppConfig::default()
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["lastDir"], "/tmp");
        assert_eq!(json["startRecording"]["display"], "F9");
        assert_eq!(json["startPlayback"]["keys"], serde_json::json!([76]));
        assert_eq!(json["stopPlayback"]["display"], "F11");
    }

    #[test]
    fn test_config_partial_json() {
        // 缺失字段使用默认值填充
        let json = r#"{
            "stopPlayback": {"display": "Ctrl+Esc", "keys": [37, 9]}
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert!(config.last_dir.is_empty());
        assert_eq!(config.hotkeys.stop_playback.keys(), &[37, 9]);
        assert_eq!(config.hotkeys.start_recording.display_name(), "F9");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Json(serde_json::from_str::<AppConfig>("invalid").unwrap_err());
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_store_in_memory_update() {
        // 父路径是普通文件，写入必然失败
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let store =
            ConfigStore::with_config(blocker.path().join("config.json"), AppConfig::default());

        // 写文件失败，但内存中的修改生效
        assert!(store.set_last_dir("/data").is_err());
        assert_eq!(store.last_dir(), "/data");
    }
}
