//! Delivery of winit window events to the registered native callbacks.

use kestrel_core::native::{ButtonAction, KeyAction, Modifiers};
use winit::event::{ElementState, Ime, MouseScrollDelta, WindowEvent};
use winit::keyboard::ModifiersState;

use crate::keymap::{native_button, native_key};
use crate::window::NativeWindow;

/// Logical pixels per scroll line for devices that report pixel deltas.
pub const PIXELS_PER_LINE: f64 = 16.0;

pub(crate) fn modifiers_from_winit(state: ModifiersState) -> Modifiers {
    let mut mods = Modifiers::empty();
    mods.set(Modifiers::SHIFT, state.shift_key());
    mods.set(Modifiers::CONTROL, state.control_key());
    mods.set(Modifiers::ALT, state.alt_key());
    mods.set(Modifiers::SUPER, state.super_key());
    mods
}

/// Scroll offsets in lines, positive up and right.
pub(crate) fn scroll_lines(delta: MouseScrollDelta, scale_factor: f64) -> (f64, f64) {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => (f64::from(x), f64::from(y)),
        MouseScrollDelta::PixelDelta(position) => {
            let logical = position.to_logical::<f64>(scale_factor);
            (logical.x / PIXELS_PER_LINE, logical.y / PIXELS_PER_LINE)
        }
    }
}

/// Characters the native character callback reports for typed text.
///
/// Control characters are left out; the input bridge synthesizes the ones it
/// needs from key presses.
pub(crate) fn typed_characters(text: &str) -> impl Iterator<Item = u32> + '_ {
    text.chars().filter(|c| !c.is_control()).map(u32::from)
}

pub(crate) fn key_action(state: ElementState, repeat: bool) -> KeyAction {
    match (state, repeat) {
        (ElementState::Pressed, false) => KeyAction::Press,
        (ElementState::Pressed, true) => KeyAction::Repeat,
        (ElementState::Released, _) => KeyAction::Release,
    }
}

/// Whether the text of a key event goes to the character callback.
///
/// Only the initial press does: on repeat the input bridge re-emits the last
/// typed character itself.
pub(crate) fn forwards_text(action: KeyAction) -> bool {
    action == KeyAction::Press
}

/// Forward one window event to the window's callbacks.
pub(crate) fn dispatch(window: &mut NativeWindow, event: WindowEvent) {
    if let WindowEvent::ModifiersChanged(modifiers) = &event {
        window.modifiers = modifiers_from_winit(modifiers.state());
        return;
    }
    if let WindowEvent::Occluded(occluded) = event {
        window.occluded = occluded;
    }

    let Some((input, events)) = window.bound() else {
        tracing::trace!(?event, "event for a window without callbacks");
        return;
    };
    let scale_factor = window.window.scale_factor();

    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            let native = native_key(event.physical_key);
            if native == kestrel_input::keymap::native::UNKNOWN {
                tracing::warn!(key = ?event.physical_key, "unmapped physical key");
            }
            let action = key_action(event.state, event.repeat);
            input.key(native, 0, action, window.modifiers);
            if forwards_text(action)
                && let Some(text) = &event.text
            {
                for codepoint in typed_characters(text) {
                    input.character(codepoint);
                }
            }
        }
        WindowEvent::Ime(Ime::Commit(text)) => {
            for codepoint in typed_characters(&text) {
                input.character(codepoint);
            }
        }
        WindowEvent::CursorMoved { position, .. } => {
            let logical = position.to_logical::<f64>(scale_factor);
            input.cursor_position(logical.x, logical.y);
        }
        WindowEvent::MouseInput { state, button, .. } => {
            let action = match state {
                ElementState::Pressed => ButtonAction::Press,
                ElementState::Released => ButtonAction::Release,
            };
            input.mouse_button(native_button(button), action, window.modifiers);
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (x, y) = scroll_lines(delta, scale_factor);
            input.scroll(x, y);
        }
        WindowEvent::Resized(size) => {
            let logical = size.to_logical::<u32>(scale_factor);
            events.framebuffer_resized(size.width, size.height);
            events.window_resized(logical.width, logical.height);
        }
        WindowEvent::ScaleFactorChanged { .. } => {
            let size = window.window.inner_size();
            events.framebuffer_resized(size.width, size.height);
        }
        WindowEvent::Focused(focused) => events.focus_changed(focused),
        WindowEvent::Occluded(occluded) => events.iconify_changed(occluded),
        WindowEvent::CloseRequested => events.close_requested(),
        WindowEvent::RedrawRequested => events.refresh_requested(),
        WindowEvent::DroppedFile(path) => events.files_dropped(vec![path]),
        other => tracing::trace!(event = ?other, "ignored window event"),
    }
}

/// Fire `maximize_changed` when the maximized state moved since the last poll.
///
/// winit reports no event for it.
pub(crate) fn sync_maximized(window: &mut NativeWindow) {
    let maximized = window.window.is_maximized();
    if maximized == window.maximized {
        return;
    }
    window.maximized = maximized;
    if let Some((_, events)) = window.bound() {
        events.maximize_changed(maximized);
    }
}
