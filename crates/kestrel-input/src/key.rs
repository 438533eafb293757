//! Logical keys and mouse buttons as seen by application code.

/// A logical key.
///
/// Native key codes are translated through [`crate::keymap`]; anything the
/// table does not know becomes [`Key::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Unknown,
    Space,
    Apostrophe,
    Comma,
    Minus,
    Period,
    Slash,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Semicolon,
    Equals,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    LeftBracket,
    Backslash,
    RightBracket,
    Grave,
    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    ForwardDel,
    Right,
    Left,
    Down,
    Up,
    PageUp,
    PageDown,
    Home,
    End,
    CapsLock,
    ScrollLock,
    PrintScreen,
    Pause,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
    NumLock,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadDot,
    NumpadDivide,
    NumpadMultiply,
    NumpadSubtract,
    NumpadAdd,
    NumpadEnter,
    NumpadEquals,
    ShiftLeft,
    ControlLeft,
    AltLeft,
    ShiftRight,
    ControlRight,
    AltRight,
    /// Both super/command keys.
    Sym,
    Menu,
}

impl Key {
    /// The character a key produces on its own when the native layer does not
    /// report a character event for it.
    pub const fn synthetic_character(self) -> Option<char> {
        match self {
            Key::Backspace => Some('\u{8}'),
            Key::Tab => Some('\t'),
            Key::ForwardDel => Some('\u{7f}'),
            Key::Enter | Key::NumpadEnter => Some('\n'),
            _ => None,
        }
    }
}

/// Mouse buttons the runtime tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    pub const COUNT: usize = 5;

    pub const ALL: [MouseButton; Self::COUNT] = [
        MouseButton::Left,
        MouseButton::Right,
        MouseButton::Middle,
        MouseButton::Back,
        MouseButton::Forward,
    ];

    /// Map a native button index; buttons beyond the fifth are not tracked.
    pub const fn from_native(button: i32) -> Option<Self> {
        match button {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Right),
            2 => Some(MouseButton::Middle),
            3 => Some(MouseButton::Back),
            4 => Some(MouseButton::Forward),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}
