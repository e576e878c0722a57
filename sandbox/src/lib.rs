//! `canopy-sandbox`: Wasmtime-based host bridge for a canopy guest.
//!
//! This crate loads, validates, and drives a guest module that talks to the
//! outside world only through its linear memory and a fixed set of host
//! imports. It provides:
//!
//! - **Window/Input:** aspect-locked drawing rectangle, layered surfaces,
//!   input events with click synthesis
//! - **Network:** integer socket ids over a host transport, with state-sync
//!   snapshot coalescing
//! - **Rendering:** frame decoding and drawing, with a content-addressed
//!   cache of rasterized text and resized images
//! - **Files and local storage:** byte blobs under a sandboxed root and
//!   word arrays in a text key/value store
//! - **Page utilities:** user prompts, the page location, key names on the
//!   user's layout and named console timers
//! - **Import whitelisting:** only the known host functions, no WASI
//!
//! The primary entry points are [`Bridge::new`] and [`Bridge::instantiate`].

pub mod config;
pub mod console;
pub mod error;
pub mod event_queue;
pub mod files;
pub mod host_impl;
pub mod imports;
pub mod linker;
pub mod local_storage;
pub mod location;
pub mod memory;
pub mod network;
pub mod render_cache;
pub mod renderer;
pub mod runtime;
pub mod text_layout;
pub mod validation;
pub mod window;

pub use config::{BridgeConfig, CoalesceScope};
pub use error::SandboxError;
pub use host_impl::HostState;
pub use imports::HostImport;
pub use location::Location;
pub use network::ReadyState;
pub use runtime::{Bridge, GuestInstance, Role};
pub use window::RawInput;
