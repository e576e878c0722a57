//! Fixed enumeration tables shared by host and guest.
//!
//! Every enumerated value crosses the boundary as its index into a table
//! both sides agree on. Table order is part of the wire contract: reordering
//! any table breaks every compiled guest.

/// An enumeration carried on the wire as an index into a fixed name table.
pub trait WireEnum: Copy + Sized + 'static {
    /// Wire names, in wire order.
    const NAMES: &'static [&'static str];
    /// Variants, in the same order as `NAMES`.
    const VARIANTS: &'static [Self];

    /// Wire index of this value.
    fn index(self) -> usize;

    fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Resolve a wire index; anything outside the table is `None`.
    fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::VARIANTS.get(i).copied())
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| Self::VARIANTS[i])
    }
}

/// Position of `name` in `table`, or `None`.
pub fn name_index(table: &[&str], name: &str) -> Option<usize> {
    table.iter().position(|n| *n == name)
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl WireEnum for $name {
            const NAMES: &'static [&'static str] = &[$($wire),+];
            const VARIANTS: &'static [Self] = &[$($name::$variant),+];

            fn index(self) -> usize {
                self as usize
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

wire_enum! {
    /// Top-level tag of a window event record.
    pub enum WindowEventType {
        Keyboard = "keyboard",
        Mouse = "mouse",
        Wheel = "wheel",
    }
}

wire_enum! {
    pub enum KeyboardAction {
        Down = "down",
        Up = "up",
    }
}

wire_enum! {
    /// Mouse actions. `Click` is synthesized by the host, never raw input.
    pub enum MouseAction {
        Move = "move",
        Down = "down",
        Click = "click",
        Up = "up",
    }
}

wire_enum! {
    pub enum MouseButton {
        Left = "left",
        Middle = "middle",
        Right = "right",
    }
}

wire_enum! {
    /// Unit of wheel deltas.
    pub enum WheelDeltaMode {
        Pixel = "pixel",
        Line = "line",
        Page = "page",
    }
}

wire_enum! {
    pub enum NetworkEventKind {
        Open = "open",
        Close = "close",
        Message = "message",
    }
}

wire_enum! {
    /// Pointer cursor styles selectable by a frame.
    pub enum CursorStyle {
        Default = "default",
        Pointer = "pointer",
        Text = "text",
        Grab = "grab",
        Grabbing = "grabbing",
        Crosshair = "crosshair",
        NotAllowed = "not-allowed",
    }
}

wire_enum! {
    pub enum Shape {
        Rectangle = "rectangle",
        Line = "line",
        Circle = "circle",
        Triangle = "triangle",
        HorizontalHexagon = "horizontal-hexagon",
        VerticalHexagon = "vertical-hexagon",
        Curve = "curve",
    }
}

wire_enum! {
    pub enum Font {
        SansSerif = "sans-serif",
        Serif = "serif",
        Monospace = "monospace",
        Cursive = "cursive",
        Fantasy = "fantasy",
    }
}

wire_enum! {
    pub enum HorizontalAlign {
        Left = "left",
        Center = "center",
        Right = "right",
    }
}

wire_enum! {
    pub enum VerticalAlign {
        Top = "top",
        Middle = "middle",
        Bottom = "bottom",
    }
}

/// Physical key codes, in wire order.
#[rustfmt::skip]
pub const KEYBOARD_CODES: &[&str] = &[
    "Escape", "F1", "F2", "F3", "F4", "F5",
    "F6", "F7", "F8", "F9", "F10", "F11",
    "F12", "Backquote", "Digit1", "Digit2", "Digit3", "Digit4",
    "Digit5", "Digit6", "Digit7", "Digit8", "Digit9", "Digit0",
    "Minus", "Equal", "Backspace", "Tab", "KeyQ", "KeyW",
    "KeyE", "KeyR", "KeyT", "KeyY", "KeyU", "KeyI",
    "KeyO", "KeyP", "BracketLeft", "BracketRight", "Enter", "CapsLock",
    "KeyA", "KeyS", "KeyD", "KeyF", "KeyG", "KeyH",
    "KeyJ", "KeyK", "KeyL", "Semicolon", "Quote", "Backslash",
    "ShiftLeft", "IntlBackslash", "KeyZ", "KeyX", "KeyC", "KeyV",
    "KeyB", "KeyN", "KeyM", "Comma", "Period", "Slash",
    "ShiftRight", "ControlLeft", "MetaLeft", "AltLeft", "Space", "AltRight",
    "ContextMenu", "ControlRight", "ArrowUp", "ArrowLeft", "ArrowDown", "ArrowRight",
    "Insert", "Home", "PageUp", "Delete", "End", "PageDown",
    "NumLock", "NumpadDivide", "NumpadMultiply", "NumpadSubtract", "Numpad7", "Numpad8",
    "Numpad9", "NumpadAdd", "Numpad4", "Numpad5", "Numpad6", "Numpad1",
    "Numpad2", "Numpad3", "NumpadEnter", "Numpad0", "NumpadDecimal",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_table_order() {
        assert_eq!(MouseAction::Move.index(), 0);
        assert_eq!(MouseAction::Click.index(), 2);
        assert_eq!(Shape::Curve.index(), 6);
        assert_eq!(CursorStyle::NotAllowed.name(), "not-allowed");
    }

    #[test]
    fn test_from_index_out_of_range() {
        assert_eq!(MouseButton::from_index(1), Some(MouseButton::Middle));
        assert_eq!(MouseButton::from_index(3), None);
        assert_eq!(MouseButton::from_index(-1), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Font::from_name("monospace"), Some(Font::Monospace));
        assert_eq!(Font::from_name("comic-sans"), None);
    }

    #[test]
    fn test_keyboard_codes_are_unique() {
        for (i, code) in KEYBOARD_CODES.iter().enumerate() {
            assert_eq!(name_index(KEYBOARD_CODES, code), Some(i), "duplicate {code}");
        }
        assert_eq!(name_index(KEYBOARD_CODES, "Escape"), Some(0));
        assert_eq!(name_index(KEYBOARD_CODES, "Fn"), None);
    }

    #[test]
    fn test_display_uses_wire_name() {
        assert_eq!(Shape::HorizontalHexagon.to_string(), "horizontal-hexagon");
    }
}
