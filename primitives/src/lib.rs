//! `canopy-primitives`: the wire layer between a sandboxed guest and its host.
//!
//! This crate provides:
//! - A call-scoped, word-addressed view over guest linear memory
//! - The sequential buffer codec (ints, floats, strings, colors, enums, buffers)
//! - The fixed enumeration tables both sides agree on
//! - Input and network event encoders, and the draw-frame decoder
//! - Content hashing for render caches, surface geometry and the
//!   printable-ASCII word codec used for text-only persistence
//!
//! Nothing here depends on a wasm runtime; everything works over a plain
//! byte slice.

pub mod ascii;
pub mod codec;
pub mod draw;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hash;
pub mod memory;
pub mod types;
pub mod wire;

// Re-export commonly used types at the crate root for convenience.
pub use codec::BufferCursor;
pub use draw::{DrawPrimitive, Frame, ImageRef, TextRun};
pub use error::{CodecError, CodecResult};
pub use events::{
    encode_all, InputEvent, KeyboardEvent, Modifiers, MouseEvent, NetworkEvent, WheelEvent,
    WireEncode,
};
pub use geometry::Rect;
pub use hash::{ContentHash, ContentHasher};
pub use memory::{word_addr, MemoryView};
pub use types::{Color, WORD_SIZE};
pub use wire::WireEnum;
