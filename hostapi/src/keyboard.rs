//! Keyboard layout lookup: which character a physical key produces.
//!
//! Key codes name physical positions ("KeyQ" is the key left of "KeyW"
//! whatever it is labelled). A layout maps them to the unshifted character
//! printed on the key so a guest can show "Press Q" or "Press A" on an
//! AZERTY keyboard.

/// Character produced by a physical key on the user's layout.
pub trait KeyboardLayout: Send {
    /// `None` for keys that produce no character (Shift, arrows, F-keys).
    fn key_value(&self, code: &str) -> Option<String>;
}

/// US QWERTY.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsLayout;

impl KeyboardLayout for UsLayout {
    fn key_value(&self, code: &str) -> Option<String> {
        if let Some(letter) = code.strip_prefix("Key") {
            return single_char(letter).map(|c| c.to_ascii_lowercase().to_string());
        }
        if let Some(digit) = code.strip_prefix("Digit").or_else(|| code.strip_prefix("Numpad")) {
            if let Some(c) = single_char(digit).filter(char::is_ascii_digit) {
                return Some(c.to_string());
            }
        }
        let symbol = match code {
            "Backquote" => "`",
            "Minus" | "NumpadSubtract" => "-",
            "Equal" => "=",
            "BracketLeft" => "[",
            "BracketRight" => "]",
            "Semicolon" => ";",
            "Quote" => "'",
            "Backslash" | "IntlBackslash" => "\\",
            "Comma" => ",",
            "Period" | "NumpadDecimal" => ".",
            "Slash" | "NumpadDivide" => "/",
            "NumpadMultiply" => "*",
            "NumpadAdd" => "+",
            "Space" => " ",
            _ => return None,
        };
        Some(symbol.to_string())
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
