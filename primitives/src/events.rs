//! Host-observed events and their wire encodings.
//!
//! Window events: `[type, ...fields]`
//! - keyboard: `[0, action, code, char | i32::MIN, ctrl, shift, alt]`
//! - mouse:    `[1, action, button | -1, x: f32, y: f32]`
//! - wheel:    `[2, dx: f32, dy: f32, dz: f32, mode]`
//!
//! Network events: `[socket_id, kind, buffer]`.

use crate::codec::BufferCursor;
use crate::error::CodecResult;
use crate::types::NO_CHAR_SENTINEL;
use crate::wire::{
    KeyboardAction, MouseAction, MouseButton, NetworkEventKind, WheelDeltaMode, WindowEventType,
    KEYBOARD_CODES,
};

/// Payload size from which a message may be a full-state snapshot.
pub const STATE_SYNC_MIN_BYTES: usize = 16;

/// Anything with a fixed wire layout that the host writes into guest memory.
pub trait WireEncode {
    fn encode(&self, cursor: &mut BufferCursor<'_>) -> CodecResult<()>;
}

/// Encode `events` back to back; returns the total number of words written.
///
/// The first event that does not fit aborts the whole batch.
pub fn encode_all<E: WireEncode>(events: &[E], cursor: &mut BufferCursor<'_>) -> CodecResult<u32> {
    for event in events {
        event.encode(cursor)?;
    }
    Ok(cursor.size())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardEvent {
    pub action: KeyboardAction,
    /// Physical key code, e.g. `"KeyA"`. Unknown codes encode as `-1`.
    pub code: String,
    /// The character produced, if the key produced exactly one.
    pub text: Option<char>,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub button: Option<MouseButton>,
    /// Surface-local coordinates.
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub x: f32,
    pub y: f32,
    pub delta_x: f32,
    pub delta_y: f32,
    pub delta_z: f32,
    pub delta_mode: WheelDeltaMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
    Wheel(WheelEvent),
}

impl InputEvent {
    pub fn event_type(&self) -> WindowEventType {
        match self {
            InputEvent::Keyboard(_) => WindowEventType::Keyboard,
            InputEvent::Mouse(_) => WindowEventType::Mouse,
            InputEvent::Wheel(_) => WindowEventType::Wheel,
        }
    }
}

impl WireEncode for InputEvent {
    fn encode(&self, cursor: &mut BufferCursor<'_>) -> CodecResult<()> {
        cursor.write_enum(Some(self.event_type()))?;
        match self {
            InputEvent::Keyboard(key) => {
                cursor.write_enum(Some(key.action))?;
                cursor.write_enum_name(&key.code, KEYBOARD_CODES)?;
                cursor.write(key.text.map_or(NO_CHAR_SENTINEL, |c| u32::from(c) as i32))?;
                cursor.write_bool(key.modifiers.ctrl)?;
                cursor.write_bool(key.modifiers.shift)?;
                cursor.write_bool(key.modifiers.alt)?;
            }
            InputEvent::Mouse(mouse) => {
                cursor.write_enum(Some(mouse.action))?;
                cursor.write_enum(mouse.button)?;
                cursor.write_float(mouse.x)?;
                cursor.write_float(mouse.y)?;
            }
            InputEvent::Wheel(wheel) => {
                cursor.write_float(wheel.delta_x)?;
                cursor.write_float(wheel.delta_y)?;
                cursor.write_float(wheel.delta_z)?;
                cursor.write_enum(Some(wheel.delta_mode))?;
            }
        }
        Ok(())
    }
}

/// Connection lifecycle or data event, as delivered to the guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEvent {
    pub socket_id: i32,
    pub kind: NetworkEventKind,
    pub payload: Vec<u8>,
}

impl NetworkEvent {
    pub fn open(socket_id: i32) -> Self {
        Self {
            socket_id,
            kind: NetworkEventKind::Open,
            payload: Vec::new(),
        }
    }

    pub fn close(socket_id: i32) -> Self {
        Self {
            socket_id,
            kind: NetworkEventKind::Close,
            payload: Vec::new(),
        }
    }

    pub fn message(socket_id: i32, payload: Vec<u8>) -> Self {
        Self {
            socket_id,
            kind: NetworkEventKind::Message,
            payload,
        }
    }

    /// A message whose first four words are zero carries a full-state
    /// snapshot; a newer one makes any older unpolled one obsolete.
    pub fn is_state_sync(&self) -> bool {
        self.kind == NetworkEventKind::Message
            && self.payload.len() >= STATE_SYNC_MIN_BYTES
            && self.payload[..STATE_SYNC_MIN_BYTES].iter().all(|b| *b == 0)
    }
}

impl WireEncode for NetworkEvent {
    fn encode(&self, cursor: &mut BufferCursor<'_>) -> CodecResult<()> {
        cursor.write(self.socket_id)?;
        cursor.write_enum(Some(self.kind))?;
        cursor.write_buffer(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::memory::MemoryView;
    use crate::types::WORD_SIZE;

    fn words(bytes: &mut [u8], count: usize) -> Vec<u32> {
        MemoryView::new(bytes).read_words(0, count).unwrap()
    }

    fn key(code: &str, text: Option<char>) -> InputEvent {
        InputEvent::Keyboard(KeyboardEvent {
            action: KeyboardAction::Down,
            code: code.to_string(),
            text,
            modifiers: Modifiers {
                ctrl: false,
                shift: true,
                alt: false,
            },
        })
    }

    #[test]
    fn test_keyboard_layout() {
        let mut bytes = vec![0u8; 16 * WORD_SIZE];
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 0, 16);
        let n = encode_all(&[key("KeyA", Some('A'))], &mut cursor).unwrap();
        assert_eq!(n, 7);
        assert_eq!(words(&mut bytes, 7), vec![0, 0, 42, 65, 0, 1, 0]);
    }

    #[test]
    fn test_keyboard_without_char_writes_sentinel() {
        let mut bytes = vec![0u8; 8 * WORD_SIZE];
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 0, 8);
        key("ShiftLeft", None).encode(&mut cursor).unwrap();
        let w = words(&mut bytes, 4);
        assert_eq!(w[3] as i32, i32::MIN);
    }

    #[test]
    fn test_mouse_layout() {
        let mut bytes = vec![0u8; 8 * WORD_SIZE];
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 0, 8);
        let event = InputEvent::Mouse(MouseEvent {
            action: MouseAction::Click,
            button: None,
            x: 12.5,
            y: -3.0,
        });
        assert_eq!(encode_all(&[event], &mut cursor).unwrap(), 5);
        let w = words(&mut bytes, 5);
        assert_eq!(&w[..3], &[1, 2, u32::MAX]);
        assert_eq!(f32::from_bits(w[3]), 12.5);
        assert_eq!(f32::from_bits(w[4]), -3.0);
    }

    #[test]
    fn test_wheel_layout() {
        let mut bytes = vec![0u8; 8 * WORD_SIZE];
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 0, 8);
        let event = InputEvent::Wheel(WheelEvent {
            x: 0.0,
            y: 0.0,
            delta_x: 0.0,
            delta_y: 100.0,
            delta_z: 0.0,
            delta_mode: WheelDeltaMode::Line,
        });
        assert_eq!(encode_all(&[event], &mut cursor).unwrap(), 5);
        let w = words(&mut bytes, 5);
        assert_eq!(w[0], 2);
        assert_eq!(f32::from_bits(w[2]), 100.0);
        assert_eq!(w[4], 1);
    }

    #[test]
    fn test_two_events_in_sequence() {
        let mut bytes = vec![0u8; 32 * WORD_SIZE];
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 0, 32);
        let events = vec![key("KeyA", Some('a')), key("KeyB", Some('b'))];
        assert_eq!(encode_all(&events, &mut cursor).unwrap(), 14);
    }

    #[test]
    fn test_batch_overflow_is_error() {
        let mut bytes = vec![0u8; 16 * WORD_SIZE];
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 0, 10);
        let events = vec![key("KeyA", None), key("KeyB", None)];
        assert!(matches!(
            encode_all(&events, &mut cursor),
            Err(CodecError::Overflow { capacity: 10, .. })
        ));
    }

    #[test]
    fn test_network_event_layout() {
        let mut bytes = vec![0u8; 8 * WORD_SIZE];
        let mut cursor = BufferCursor::new(MemoryView::new(&mut bytes), 0, 8);
        let event = NetworkEvent::message(3, b"hello".to_vec());
        assert_eq!(encode_all(&[event], &mut cursor).unwrap(), 5);
        let w = words(&mut bytes, 5);
        assert_eq!(&w[..3], &[3, 2, 2]);
        assert_eq!(w[3], u32::from_le_bytes(*b"hell"));
        assert_eq!(w[4], u32::from(b'o'));
    }

    #[test]
    fn test_state_sync_detection() {
        assert!(NetworkEvent::message(1, vec![0u8; 16]).is_state_sync());
        let mut snapshot = vec![0u8; 24];
        snapshot[20] = 9;
        assert!(NetworkEvent::message(1, snapshot).is_state_sync());
        assert!(!NetworkEvent::message(1, vec![0u8; 12]).is_state_sync());
        let mut delta = vec![0u8; 16];
        delta[15] = 1;
        assert!(!NetworkEvent::message(1, delta).is_state_sync());
        assert!(!NetworkEvent::open(1).is_state_sync());
    }
}
