//! `canopy-hostapi`: host capability traits for the canopy guest bridge.
//!
//! This crate defines what the bridge needs from the machine it runs on.
//! It provides:
//!
//! - `Display` / `Surface`: host window and layered drawing surfaces
//! - `TextShaper`: text measurement and rasterization of finished layouts
//! - `ImageSource`: image lookup by source identifier, plus one-step resize
//! - `Transport`: non-blocking message connections and listeners
//! - `KeyValueStore`: text persistence for guest local storage
//! - `Prompter`: modal one-line text prompts
//! - `KeyboardLayout`: character printed on a physical key
//! - `HostServices`: the bundle handed to a guest instance
//! - `HostError`: the capability error type
//!
//! In-memory implementations (`RecordingDisplay`, `FixedAdvanceShaper`,
//! `MemImageSource`, `FsImageSource`, `MemTransport`, `MemStore`,
//! `ScriptedPrompter`, `UsLayout`) back tests and headless embedders.

pub mod display;
pub mod error;
pub mod images;
pub mod keyboard;
pub mod kv_store;
pub mod mem_store;
pub mod mem_transport;
pub mod paths;
pub mod prompt;
pub mod raster;
pub mod recording;
pub mod services;
pub mod text;
pub mod transport;

// Re-export commonly used types at the crate root.
pub use display::{Display, Path, PathOp, PixelRect, StrokeStyle, Surface};
pub use error::HostError;
pub use images::{FsImageSource, ImageFetch, ImageSource, MemImageSource};
pub use keyboard::{KeyboardLayout, UsLayout};
pub use kv_store::KeyValueStore;
pub use mem_store::MemStore;
pub use mem_transport::MemTransport;
pub use prompt::{Prompter, ScriptedPrompter};
pub use raster::Raster;
pub use recording::{DrawRecord, RecordingDisplay, SurfaceOp};
pub use services::HostServices;
pub use text::{Caret, FixedAdvanceShaper, PlacedRun, TextLayout, TextPaint, TextShaper, TextStyle};
pub use transport::{ConnectionId, ListenerId, Transport, TransportSignal};
