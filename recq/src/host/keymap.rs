//! rdev 按键/按钮与 X11 编号之间的映射
//!
//! rdev 在 Linux 上把 X11 按键码翻译成 [`rdev::Key`]，无法识别的按键以
//! `Key::Unknown(code)` 的形式携带原始码。这里做反向映射，使宏文件和热键
//! 配置中保存的始终是 X11 硬件按键码。

use rdev::{Button, Key};

/// rdev 按键 ↔ X11 按键码
const KEY_TABLE: &[(Key, u32)] = &[
    (Key::Escape, 9),
    (Key::Num1, 10),
    (Key::Num2, 11),
    (Key::Num3, 12),
    (Key::Num4, 13),
    (Key::Num5, 14),
    (Key::Num6, 15),
    (Key::Num7, 16),
    (Key::Num8, 17),
    (Key::Num9, 18),
    (Key::Num0, 19),
    (Key::Minus, 20),
    (Key::Equal, 21),
    (Key::Backspace, 22),
    (Key::Tab, 23),
    (Key::KeyQ, 24),
    (Key::KeyW, 25),
    (Key::KeyE, 26),
    (Key::KeyR, 27),
    (Key::KeyT, 28),
    (Key::KeyY, 29),
    (Key::KeyU, 30),
    (Key::KeyI, 31),
    (Key::KeyO, 32),
    (Key::KeyP, 33),
    (Key::LeftBracket, 34),
    (Key::RightBracket, 35),
    (Key::Return, 36),
    (Key::ControlLeft, 37),
    (Key::KeyA, 38),
    (Key::KeyS, 39),
    (Key::KeyD, 40),
    (Key::KeyF, 41),
    (Key::KeyG, 42),
    (Key::KeyH, 43),
    (Key::KeyJ, 44),
    (Key::KeyK, 45),
    (Key::KeyL, 46),
    (Key::SemiColon, 47),
    (Key::Quote, 48),
    (Key::BackQuote, 49),
    (Key::ShiftLeft, 50),
    (Key::BackSlash, 51),
    (Key::KeyZ, 52),
    (Key::KeyX, 53),
    (Key::KeyC, 54),
    (Key::KeyV, 55),
    (Key::KeyB, 56),
    (Key::KeyN, 57),
    (Key::KeyM, 58),
    (Key::Comma, 59),
    (Key::Dot, 60),
    (Key::Slash, 61),
    (Key::ShiftRight, 62),
    (Key::KpMultiply, 63),
    (Key::Alt, 64),
    (Key::Space, 65),
    (Key::CapsLock, 66),
    (Key::F1, 67),
    (Key::F2, 68),
    (Key::F3, 69),
    (Key::F4, 70),
    (Key::F5, 71),
    (Key::F6, 72),
    (Key::F7, 73),
    (Key::F8, 74),
    (Key::F9, 75),
    (Key::F10, 76),
    (Key::NumLock, 77),
    (Key::ScrollLock, 78),
    (Key::Kp7, 79),
    (Key::Kp8, 80),
    (Key::Kp9, 81),
    (Key::KpMinus, 82),
    (Key::Kp4, 83),
    (Key::Kp5, 84),
    (Key::Kp6, 85),
    (Key::KpPlus, 86),
    (Key::Kp1, 87),
    (Key::Kp2, 88),
    (Key::Kp3, 89),
    (Key::Kp0, 90),
    (Key::KpDelete, 91),
    (Key::IntlBackslash, 94),
    (Key::F11, 95),
    (Key::F12, 96),
    (Key::KpReturn, 104),
    (Key::ControlRight, 105),
    (Key::KpDivide, 106),
    (Key::PrintScreen, 107),
    (Key::AltGr, 108),
    (Key::Home, 110),
    (Key::UpArrow, 111),
    (Key::PageUp, 112),
    (Key::LeftArrow, 113),
    (Key::RightArrow, 114),
    (Key::End, 115),
    (Key::DownArrow, 116),
    (Key::PageDown, 117),
    (Key::Insert, 118),
    (Key::Delete, 119),
    (Key::Pause, 127),
    (Key::MetaLeft, 133),
    (Key::MetaRight, 134),
];

/// rdev 按键 → X11 按键码
///
/// 表外的按键（如 `Key::Function`）返回 `None`
pub fn keycode_from_key(key: Key) -> Option<u32> {
    if let Key::Unknown(code) = key {
        return Some(code);
    }
    KEY_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, code)| *code)
}

/// rdev 按钮 → X11 按钮编号
pub fn button_id(button: Button) -> u32 {
    match button {
        Button::Left => 1,
        Button::Middle => 2,
        Button::Right => 3,
        Button::Unknown(id) => u32::from(id),
    }
}

/// 滚轮增量 → X11 滚轮按钮编号
///
/// 4 上、5 下、6 左、7 右；增量为零时返回 `None`
pub fn wheel_button_id(delta_x: i64, delta_y: i64) -> Option<u32> {
    if delta_y > 0 {
        Some(4)
    } else if delta_y < 0 {
        Some(5)
    } else if delta_x < 0 {
        Some(6)
    } else if delta_x > 0 {
        Some(7)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keycode_table() {
        for (key, code) in KEY_TABLE {
            assert_eq!(keycode_from_key(*key), Some(*code));
        }
    }

    #[test]
    fn test_unknown_key_carries_code() {
        assert_eq!(keycode_from_key(Key::Unknown(250)), Some(250));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(keycode_from_key(Key::ControlLeft), Some(37));
        assert_eq!(keycode_from_key(Key::ControlRight), Some(105));
    }

    #[test]
    fn test_button_ids() {
        assert_eq!(button_id(Button::Left), 1);
        assert_eq!(button_id(Button::Middle), 2);
        assert_eq!(button_id(Button::Right), 3);
        assert_eq!(button_id(Button::Unknown(8)), 8);
    }

    #[test]
    fn test_wheel_button_ids() {
        assert_eq!(wheel_button_id(0, 1), Some(4));
        assert_eq!(wheel_button_id(0, -3), Some(5));
        assert_eq!(wheel_button_id(-1, 0), Some(6));
        assert_eq!(wheel_button_id(2, 0), Some(7));
        assert_eq!(wheel_button_id(0, 0), None);
    }
}
