//! 按键名称模块
//!
//! 把 X11 硬件按键码转换为可读标签，仅用于热键显示，不参与匹配。
//! 左右修饰键使用同一个标签（`Ctrl`、`Shift`、`Alt`、`Super`），
//! 表外的按键码显示为 `Key<code>`。

/// 按键码 → 标签
const KEY_NAMES: &[(u32, &str)] = &[
    (9, "Esc"),
    (10, "1"),
    (11, "2"),
    (12, "3"),
    (13, "4"),
    (14, "5"),
    (15, "6"),
    (16, "7"),
    (17, "8"),
    (18, "9"),
    (19, "0"),
    (20, "-"),
    (21, "="),
    (22, "Backspace"),
    (23, "Tab"),
    (24, "Q"),
    (25, "W"),
    (26, "E"),
    (27, "R"),
    (28, "T"),
    (29, "Y"),
    (30, "U"),
    (31, "I"),
    (32, "O"),
    (33, "P"),
    (34, "["),
    (35, "]"),
    (36, "Enter"),
    (37, "Ctrl"),
    (38, "A"),
    (39, "S"),
    (40, "D"),
    (41, "F"),
    (42, "G"),
    (43, "H"),
    (44, "J"),
    (45, "K"),
    (46, "L"),
    (47, ";"),
    (48, "'"),
    (49, "`"),
    (50, "Shift"),
    (51, "\\"),
    (52, "Z"),
    (53, "X"),
    (54, "C"),
    (55, "V"),
    (56, "B"),
    (57, "N"),
    (58, "M"),
    (59, ","),
    (60, "."),
    (61, "/"),
    (62, "Shift"),
    (63, "Num*"),
    (64, "Alt"),
    (65, "Space"),
    (66, "CapsLock"),
    (67, "F1"),
    (68, "F2"),
    (69, "F3"),
    (70, "F4"),
    (71, "F5"),
    (72, "F6"),
    (73, "F7"),
    (74, "F8"),
    (75, "F9"),
    (76, "F10"),
    (77, "NumLock"),
    (78, "ScrollLock"),
    (79, "Num7"),
    (80, "Num8"),
    (81, "Num9"),
    (82, "Num-"),
    (83, "Num4"),
    (84, "Num5"),
    (85, "Num6"),
    (86, "Num+"),
    (87, "Num1"),
    (88, "Num2"),
    (89, "Num3"),
    (90, "Num0"),
    (91, "Num."),
    (95, "F11"),
    (96, "F12"),
    (104, "NumEnter"),
    (105, "Ctrl"),
    (106, "Num/"),
    (107, "Print"),
    (108, "Alt"),
    (110, "Home"),
    (111, "Up"),
    (112, "PageUp"),
    (113, "Left"),
    (114, "Right"),
    (115, "End"),
    (116, "Down"),
    (117, "PageDown"),
    (118, "Insert"),
    (119, "Delete"),
    (127, "Pause"),
    (133, "Super"),
    (134, "Super"),
    (135, "Menu"),
];

/// 获取按键码的显示标签
///
/// # Examples
///
/// ```
/// use recq_lib::keys::key_label;
///
/// assert_eq!(key_label(37), "Ctrl");
/// assert_eq!(key_label(105), "Ctrl");
/// assert_eq!(key_label(250), "Key250");
/// ```
pub fn key_label(code: u32) -> String {
    KEY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("Key{}", code))
}

/// 把按键序列拼接为 `Ctrl+Alt+K` 形式的显示名
///
/// 保持传入顺序；空序列返回空字符串
pub fn display_name(keys: &[u32]) -> String {
    keys.iter()
        .map(|code| key_label(*code))
        .collect::<Vec<_>>()
        .join("+")
}
