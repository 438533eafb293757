//! Native key code table.
//!
//! Native codes follow the GLFW numbering. The table is data: its asymmetric
//! entries (`WORLD_1`, `WORLD_2` and `F25` map to [`Key::Unknown`], both super
//! keys map to [`Key::Sym`]) are kept exactly as they are.

use crate::key::Key;

/// GLFW key codes.
pub mod native {
    pub const UNKNOWN: i32 = -1;
    pub const SPACE: i32 = 32;
    pub const APOSTROPHE: i32 = 39;
    pub const COMMA: i32 = 44;
    pub const MINUS: i32 = 45;
    pub const PERIOD: i32 = 46;
    pub const SLASH: i32 = 47;
    pub const NUM_0: i32 = 48;
    pub const NUM_1: i32 = 49;
    pub const NUM_2: i32 = 50;
    pub const NUM_3: i32 = 51;
    pub const NUM_4: i32 = 52;
    pub const NUM_5: i32 = 53;
    pub const NUM_6: i32 = 54;
    pub const NUM_7: i32 = 55;
    pub const NUM_8: i32 = 56;
    pub const NUM_9: i32 = 57;
    pub const SEMICOLON: i32 = 59;
    pub const EQUAL: i32 = 61;
    pub const A: i32 = 65;
    pub const B: i32 = 66;
    pub const C: i32 = 67;
    pub const D: i32 = 68;
    pub const E: i32 = 69;
    pub const F: i32 = 70;
    pub const G: i32 = 71;
    pub const H: i32 = 72;
    pub const I: i32 = 73;
    pub const J: i32 = 74;
    pub const K: i32 = 75;
    pub const L: i32 = 76;
    pub const M: i32 = 77;
    pub const N: i32 = 78;
    pub const O: i32 = 79;
    pub const P: i32 = 80;
    pub const Q: i32 = 81;
    pub const R: i32 = 82;
    pub const S: i32 = 83;
    pub const T: i32 = 84;
    pub const U: i32 = 85;
    pub const V: i32 = 86;
    pub const W: i32 = 87;
    pub const X: i32 = 88;
    pub const Y: i32 = 89;
    pub const Z: i32 = 90;
    pub const LEFT_BRACKET: i32 = 91;
    pub const BACKSLASH: i32 = 92;
    pub const RIGHT_BRACKET: i32 = 93;
    pub const GRAVE_ACCENT: i32 = 96;
    pub const WORLD_1: i32 = 161;
    pub const WORLD_2: i32 = 162;
    pub const ESCAPE: i32 = 256;
    pub const ENTER: i32 = 257;
    pub const TAB: i32 = 258;
    pub const BACKSPACE: i32 = 259;
    pub const INSERT: i32 = 260;
    pub const DELETE: i32 = 261;
    pub const RIGHT: i32 = 262;
    pub const LEFT: i32 = 263;
    pub const DOWN: i32 = 264;
    pub const UP: i32 = 265;
    pub const PAGE_UP: i32 = 266;
    pub const PAGE_DOWN: i32 = 267;
    pub const HOME: i32 = 268;
    pub const END: i32 = 269;
    pub const CAPS_LOCK: i32 = 280;
    pub const SCROLL_LOCK: i32 = 281;
    pub const NUM_LOCK: i32 = 282;
    pub const PRINT_SCREEN: i32 = 283;
    pub const PAUSE: i32 = 284;
    pub const F1: i32 = 290;
    pub const F2: i32 = 291;
    pub const F3: i32 = 292;
    pub const F4: i32 = 293;
    pub const F5: i32 = 294;
    pub const F6: i32 = 295;
    pub const F7: i32 = 296;
    pub const F8: i32 = 297;
    pub const F9: i32 = 298;
    pub const F10: i32 = 299;
    pub const F11: i32 = 300;
    pub const F12: i32 = 301;
    pub const F13: i32 = 302;
    pub const F14: i32 = 303;
    pub const F15: i32 = 304;
    pub const F16: i32 = 305;
    pub const F17: i32 = 306;
    pub const F18: i32 = 307;
    pub const F19: i32 = 308;
    pub const F20: i32 = 309;
    pub const F21: i32 = 310;
    pub const F22: i32 = 311;
    pub const F23: i32 = 312;
    pub const F24: i32 = 313;
    pub const F25: i32 = 314;
    pub const KP_0: i32 = 320;
    pub const KP_1: i32 = 321;
    pub const KP_2: i32 = 322;
    pub const KP_3: i32 = 323;
    pub const KP_4: i32 = 324;
    pub const KP_5: i32 = 325;
    pub const KP_6: i32 = 326;
    pub const KP_7: i32 = 327;
    pub const KP_8: i32 = 328;
    pub const KP_9: i32 = 329;
    pub const KP_DECIMAL: i32 = 330;
    pub const KP_DIVIDE: i32 = 331;
    pub const KP_MULTIPLY: i32 = 332;
    pub const KP_SUBTRACT: i32 = 333;
    pub const KP_ADD: i32 = 334;
    pub const KP_ENTER: i32 = 335;
    pub const KP_EQUAL: i32 = 336;
    pub const LEFT_SHIFT: i32 = 340;
    pub const LEFT_CONTROL: i32 = 341;
    pub const LEFT_ALT: i32 = 342;
    pub const LEFT_SUPER: i32 = 343;
    pub const RIGHT_SHIFT: i32 = 344;
    pub const RIGHT_CONTROL: i32 = 345;
    pub const RIGHT_ALT: i32 = 346;
    pub const RIGHT_SUPER: i32 = 347;
    pub const MENU: i32 = 348;
}

/// Native code to logical key. Codes not listed map to [`Key::Unknown`].
pub const NATIVE_KEY_TABLE: &[(i32, Key)] = &[
    (native::SPACE, Key::Space),
    (native::APOSTROPHE, Key::Apostrophe),
    (native::COMMA, Key::Comma),
    (native::MINUS, Key::Minus),
    (native::PERIOD, Key::Period),
    (native::SLASH, Key::Slash),
    (native::NUM_0, Key::Num0),
    (native::NUM_1, Key::Num1),
    (native::NUM_2, Key::Num2),
    (native::NUM_3, Key::Num3),
    (native::NUM_4, Key::Num4),
    (native::NUM_5, Key::Num5),
    (native::NUM_6, Key::Num6),
    (native::NUM_7, Key::Num7),
    (native::NUM_8, Key::Num8),
    (native::NUM_9, Key::Num9),
    (native::SEMICOLON, Key::Semicolon),
    (native::EQUAL, Key::Equals),
    (native::A, Key::A),
    (native::B, Key::B),
    (native::C, Key::C),
    (native::D, Key::D),
    (native::E, Key::E),
    (native::F, Key::F),
    (native::G, Key::G),
    (native::H, Key::H),
    (native::I, Key::I),
    (native::J, Key::J),
    (native::K, Key::K),
    (native::L, Key::L),
    (native::M, Key::M),
    (native::N, Key::N),
    (native::O, Key::O),
    (native::P, Key::P),
    (native::Q, Key::Q),
    (native::R, Key::R),
    (native::S, Key::S),
    (native::T, Key::T),
    (native::U, Key::U),
    (native::V, Key::V),
    (native::W, Key::W),
    (native::X, Key::X),
    (native::Y, Key::Y),
    (native::Z, Key::Z),
    (native::LEFT_BRACKET, Key::LeftBracket),
    (native::BACKSLASH, Key::Backslash),
    (native::RIGHT_BRACKET, Key::RightBracket),
    (native::GRAVE_ACCENT, Key::Grave),
    (native::WORLD_1, Key::Unknown),
    (native::WORLD_2, Key::Unknown),
    (native::ESCAPE, Key::Escape),
    (native::ENTER, Key::Enter),
    (native::TAB, Key::Tab),
    (native::BACKSPACE, Key::Backspace),
    (native::INSERT, Key::Insert),
    (native::DELETE, Key::ForwardDel),
    (native::RIGHT, Key::Right),
    (native::LEFT, Key::Left),
    (native::DOWN, Key::Down),
    (native::UP, Key::Up),
    (native::PAGE_UP, Key::PageUp),
    (native::PAGE_DOWN, Key::PageDown),
    (native::HOME, Key::Home),
    (native::END, Key::End),
    (native::CAPS_LOCK, Key::CapsLock),
    (native::SCROLL_LOCK, Key::ScrollLock),
    (native::NUM_LOCK, Key::NumLock),
    (native::PRINT_SCREEN, Key::PrintScreen),
    (native::PAUSE, Key::Pause),
    (native::F1, Key::F1),
    (native::F2, Key::F2),
    (native::F3, Key::F3),
    (native::F4, Key::F4),
    (native::F5, Key::F5),
    (native::F6, Key::F6),
    (native::F7, Key::F7),
    (native::F8, Key::F8),
    (native::F9, Key::F9),
    (native::F10, Key::F10),
    (native::F11, Key::F11),
    (native::F12, Key::F12),
    (native::F13, Key::F13),
    (native::F14, Key::F14),
    (native::F15, Key::F15),
    (native::F16, Key::F16),
    (native::F17, Key::F17),
    (native::F18, Key::F18),
    (native::F19, Key::F19),
    (native::F20, Key::F20),
    (native::F21, Key::F21),
    (native::F22, Key::F22),
    (native::F23, Key::F23),
    (native::F24, Key::F24),
    (native::F25, Key::Unknown),
    (native::KP_0, Key::Numpad0),
    (native::KP_1, Key::Numpad1),
    (native::KP_2, Key::Numpad2),
    (native::KP_3, Key::Numpad3),
    (native::KP_4, Key::Numpad4),
    (native::KP_5, Key::Numpad5),
    (native::KP_6, Key::Numpad6),
    (native::KP_7, Key::Numpad7),
    (native::KP_8, Key::Numpad8),
    (native::KP_9, Key::Numpad9),
    (native::KP_DECIMAL, Key::NumpadDot),
    (native::KP_DIVIDE, Key::NumpadDivide),
    (native::KP_MULTIPLY, Key::NumpadMultiply),
    (native::KP_SUBTRACT, Key::NumpadSubtract),
    (native::KP_ADD, Key::NumpadAdd),
    (native::KP_ENTER, Key::NumpadEnter),
    (native::KP_EQUAL, Key::NumpadEquals),
    (native::LEFT_SHIFT, Key::ShiftLeft),
    (native::LEFT_CONTROL, Key::ControlLeft),
    (native::LEFT_ALT, Key::AltLeft),
    (native::LEFT_SUPER, Key::Sym),
    (native::RIGHT_SHIFT, Key::ShiftRight),
    (native::RIGHT_CONTROL, Key::ControlRight),
    (native::RIGHT_ALT, Key::AltRight),
    (native::RIGHT_SUPER, Key::Sym),
    (native::MENU, Key::Menu),
];

const LOOKUP_LEN: usize = native::MENU as usize + 1;

const LOOKUP: [Key; LOOKUP_LEN] = {
    let mut lookup = [Key::Unknown; LOOKUP_LEN];
    let mut i = 0;
    while i < NATIVE_KEY_TABLE.len() {
        let (code, key) = NATIVE_KEY_TABLE[i];
        lookup[code as usize] = key;
        i += 1;
    }
    lookup
};

/// Translate a native key code.
pub fn key_from_native(code: i32) -> Key {
    usize::try_from(code)
        .ok()
        .and_then(|index| LOOKUP.get(index).copied())
        .unwrap_or(Key::Unknown)
}
