//! 状态机与配置存储集成测试

use recq_lib::hotkey::{ChordSlot, HotkeyCombo};
use recq_lib::state::{AppConfig, ConfigStore, SessionState, StateError, StateManager};

// ============================================================================
// 状态机
// ============================================================================

#[test]
fn test_state_manager_default() {
    let manager = StateManager::default();
    assert!(manager.current().is_idle());
}

#[test]
fn test_modes_are_exclusive() {
    let manager = StateManager::new();

    manager.transition(SessionState::Playing).unwrap();
    assert!(manager.transition(SessionState::Recording).is_err());
    assert!(manager
        .transition(SessionState::CapturingChord(ChordSlot::StartPlayback))
        .is_err());

    manager.transition(SessionState::Idle).unwrap();
    manager
        .transition(SessionState::CapturingChord(ChordSlot::StartPlayback))
        .unwrap();

    let result = manager.transition(SessionState::Playing);
    assert_eq!(
        result,
        Err(StateError::InvalidTransition {
            from: SessionState::CapturingChord(ChordSlot::StartPlayback),
            to: SessionState::Playing,
        })
    );
}

#[test]
fn test_state_serialization() {
    let json = serde_json::to_value(SessionState::CapturingChord(ChordSlot::StopPlayback)).unwrap();
    assert_eq!(json["state"], "capturingChord");
    assert_eq!(json["slot"], "stopPlayback");

    let json = serde_json::to_value(SessionState::Idle).unwrap();
    assert_eq!(json["state"], "idle");
}

// ============================================================================
// 配置存储
// ============================================================================

#[test]
fn test_missing_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join("config.json"));

    assert_eq!(*store.get(), AppConfig::default());
    assert_eq!(store.hotkeys().start_recording.display_name(), "F9");
}

#[test]
fn test_invalid_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = ConfigStore::open(&path);
    assert_eq!(*store.get(), AppConfig::default());
}

#[test]
fn test_changes_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let store = ConfigStore::open(&path);
    store.set_last_dir("/home/user/macros").unwrap();
    store
        .set_combo(
            ChordSlot::StopPlayback,
            HotkeyCombo::try_new(vec![37, 9]).unwrap(),
        )
        .unwrap();

    // 父目录自动创建
    assert!(path.exists());

    let reopened = ConfigStore::open(&path);
    assert_eq!(reopened.last_dir(), "/home/user/macros");
    assert_eq!(reopened.hotkeys().stop_playback.keys(), &[37, 9]);
    assert_eq!(reopened.hotkeys().stop_playback.display_name(), "Ctrl+Esc");
}

#[test]
fn test_wire_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let store = ConfigStore::open(&path);
    store.set_last_dir("/tmp").unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["lastDir"], "/tmp");
    assert_eq!(value["startRecording"]["display"], "F9");
    assert_eq!(value["startRecording"]["keys"], serde_json::json!([75]));
    assert_eq!(value["startPlayback"]["keys"], serde_json::json!([76]));
    assert_eq!(value["stopPlayback"]["keys"], serde_json::json!([95]));
}

#[test]
fn test_lenient_combo_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"startPlayback": {"display": "", "keys": [38, 38, 56, 54, 40]}}"#,
    )
    .unwrap();

    let store = ConfigStore::open(&path);
    let combo = store.hotkeys().start_playback;

    assert_eq!(combo.keys(), &[38, 56, 54]);
    assert!(!combo.display_name().is_empty());
}

#[test]
fn test_reset() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join("config.json"));

    store.set_last_dir("/data").unwrap();
    store.reset().unwrap();

    assert!(store.last_dir().is_empty());
}
