//! winit physical key codes to the native (GLFW) numbering used by the input
//! bridge.

use kestrel_input::keymap::native;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Native code of a physical key, [`native::UNKNOWN`] when it has none.
pub fn native_key(key: PhysicalKey) -> i32 {
    match key {
        PhysicalKey::Code(code) => native_key_code(code),
        PhysicalKey::Unidentified(_) => native::UNKNOWN,
    }
}

pub fn native_key_code(code: KeyCode) -> i32 {
    match code {
        KeyCode::Space => native::SPACE,
        KeyCode::Quote => native::APOSTROPHE,
        KeyCode::Comma => native::COMMA,
        KeyCode::Minus => native::MINUS,
        KeyCode::Period => native::PERIOD,
        KeyCode::Slash => native::SLASH,
        KeyCode::Digit0 => native::NUM_0,
        KeyCode::Digit1 => native::NUM_1,
        KeyCode::Digit2 => native::NUM_2,
        KeyCode::Digit3 => native::NUM_3,
        KeyCode::Digit4 => native::NUM_4,
        KeyCode::Digit5 => native::NUM_5,
        KeyCode::Digit6 => native::NUM_6,
        KeyCode::Digit7 => native::NUM_7,
        KeyCode::Digit8 => native::NUM_8,
        KeyCode::Digit9 => native::NUM_9,
        KeyCode::Semicolon => native::SEMICOLON,
        KeyCode::Equal => native::EQUAL,
        KeyCode::KeyA => native::A,
        KeyCode::KeyB => native::B,
        KeyCode::KeyC => native::C,
        KeyCode::KeyD => native::D,
        KeyCode::KeyE => native::E,
        KeyCode::KeyF => native::F,
        KeyCode::KeyG => native::G,
        KeyCode::KeyH => native::H,
        KeyCode::KeyI => native::I,
        KeyCode::KeyJ => native::J,
        KeyCode::KeyK => native::K,
        KeyCode::KeyL => native::L,
        KeyCode::KeyM => native::M,
        KeyCode::KeyN => native::N,
        KeyCode::KeyO => native::O,
        KeyCode::KeyP => native::P,
        KeyCode::KeyQ => native::Q,
        KeyCode::KeyR => native::R,
        KeyCode::KeyS => native::S,
        KeyCode::KeyT => native::T,
        KeyCode::KeyU => native::U,
        KeyCode::KeyV => native::V,
        KeyCode::KeyW => native::W,
        KeyCode::KeyX => native::X,
        KeyCode::KeyY => native::Y,
        KeyCode::KeyZ => native::Z,
        KeyCode::BracketLeft => native::LEFT_BRACKET,
        KeyCode::Backslash => native::BACKSLASH,
        KeyCode::BracketRight => native::RIGHT_BRACKET,
        KeyCode::Backquote => native::GRAVE_ACCENT,
        KeyCode::IntlBackslash => native::WORLD_1,
        KeyCode::IntlRo | KeyCode::IntlYen => native::WORLD_2,
        KeyCode::Escape => native::ESCAPE,
        KeyCode::Enter => native::ENTER,
        KeyCode::Tab => native::TAB,
        KeyCode::Backspace => native::BACKSPACE,
        KeyCode::Insert => native::INSERT,
        KeyCode::Delete => native::DELETE,
        KeyCode::ArrowRight => native::RIGHT,
        KeyCode::ArrowLeft => native::LEFT,
        KeyCode::ArrowDown => native::DOWN,
        KeyCode::ArrowUp => native::UP,
        KeyCode::PageUp => native::PAGE_UP,
        KeyCode::PageDown => native::PAGE_DOWN,
        KeyCode::Home => native::HOME,
        KeyCode::End => native::END,
        KeyCode::CapsLock => native::CAPS_LOCK,
        KeyCode::ScrollLock => native::SCROLL_LOCK,
        KeyCode::NumLock => native::NUM_LOCK,
        KeyCode::PrintScreen => native::PRINT_SCREEN,
        KeyCode::Pause => native::PAUSE,
        KeyCode::F1 => native::F1,
        KeyCode::F2 => native::F2,
        KeyCode::F3 => native::F3,
        KeyCode::F4 => native::F4,
        KeyCode::F5 => native::F5,
        KeyCode::F6 => native::F6,
        KeyCode::F7 => native::F7,
        KeyCode::F8 => native::F8,
        KeyCode::F9 => native::F9,
        KeyCode::F10 => native::F10,
        KeyCode::F11 => native::F11,
        KeyCode::F12 => native::F12,
        KeyCode::F13 => native::F13,
        KeyCode::F14 => native::F14,
        KeyCode::F15 => native::F15,
        KeyCode::F16 => native::F16,
        KeyCode::F17 => native::F17,
        KeyCode::F18 => native::F18,
        KeyCode::F19 => native::F19,
        KeyCode::F20 => native::F20,
        KeyCode::F21 => native::F21,
        KeyCode::F22 => native::F22,
        KeyCode::F23 => native::F23,
        KeyCode::F24 => native::F24,
        KeyCode::F25 => native::F25,
        KeyCode::Numpad0 => native::KP_0,
        KeyCode::Numpad1 => native::KP_1,
        KeyCode::Numpad2 => native::KP_2,
        KeyCode::Numpad3 => native::KP_3,
        KeyCode::Numpad4 => native::KP_4,
        KeyCode::Numpad5 => native::KP_5,
        KeyCode::Numpad6 => native::KP_6,
        KeyCode::Numpad7 => native::KP_7,
        KeyCode::Numpad8 => native::KP_8,
        KeyCode::Numpad9 => native::KP_9,
        KeyCode::NumpadDecimal => native::KP_DECIMAL,
        KeyCode::NumpadDivide => native::KP_DIVIDE,
        KeyCode::NumpadMultiply => native::KP_MULTIPLY,
        KeyCode::NumpadSubtract => native::KP_SUBTRACT,
        KeyCode::NumpadAdd => native::KP_ADD,
        KeyCode::NumpadEnter => native::KP_ENTER,
        KeyCode::NumpadEqual => native::KP_EQUAL,
        KeyCode::ShiftLeft => native::LEFT_SHIFT,
        KeyCode::ControlLeft => native::LEFT_CONTROL,
        KeyCode::AltLeft => native::LEFT_ALT,
        KeyCode::SuperLeft => native::LEFT_SUPER,
        KeyCode::ShiftRight => native::RIGHT_SHIFT,
        KeyCode::ControlRight => native::RIGHT_CONTROL,
        KeyCode::AltRight => native::RIGHT_ALT,
        KeyCode::SuperRight => native::RIGHT_SUPER,
        KeyCode::ContextMenu => native::MENU,
        _ => native::UNKNOWN,
    }
}

/// Native mouse button numbering: left, right, middle, back, forward, then
/// whatever extra buttons the device reports.
pub fn native_button(button: winit::event::MouseButton) -> i32 {
    use winit::event::MouseButton;
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
        MouseButton::Back => 3,
        MouseButton::Forward => 4,
        MouseButton::Other(n) => i32::from(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_input::{Key, key_from_native};
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn test_letters_and_digits() {
        assert_eq!(native_key_code(KeyCode::KeyA), native::A);
        assert_eq!(native_key_code(KeyCode::KeyZ), native::Z);
        assert_eq!(native_key_code(KeyCode::Digit0), native::NUM_0);
        assert_eq!(key_from_native(native_key_code(KeyCode::KeyQ)), Key::Q);
    }

    #[test]
    fn test_modifiers_and_navigation() {
        assert_eq!(key_from_native(native_key_code(KeyCode::ShiftLeft)), Key::ShiftLeft);
        assert_eq!(key_from_native(native_key_code(KeyCode::Enter)), Key::Enter);
        assert_eq!(key_from_native(native_key_code(KeyCode::Escape)), Key::Escape);
        assert_eq!(key_from_native(native_key_code(KeyCode::ArrowLeft)), Key::Left);
    }

    #[test]
    fn test_super_keys_are_sym() {
        assert_eq!(key_from_native(native_key_code(KeyCode::SuperLeft)), Key::Sym);
        assert_eq!(key_from_native(native_key_code(KeyCode::SuperRight)), Key::Sym);
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(native_key_code(KeyCode::F35), native::UNKNOWN);
        assert_eq!(
            native_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            native::UNKNOWN
        );
        assert_eq!(key_from_native(native_key_code(KeyCode::IntlBackslash)), Key::Unknown);
    }

    #[test]
    fn test_mouse_buttons() {
        use winit::event::MouseButton;
        assert_eq!(native_button(MouseButton::Left), 0);
        assert_eq!(native_button(MouseButton::Forward), 4);
        assert_eq!(native_button(MouseButton::Other(9)), 9);
    }
}
