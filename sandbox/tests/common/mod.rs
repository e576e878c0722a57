//! Shared test helpers for integration tests.
//!
//! Guests are written inline as WAT. Word-addressed data (strings, colors,
//! draw records) is laid out with `data` segments built by the helpers
//! below; word address `a` is byte offset `a * 4`.

#![allow(dead_code)]

use canopy_hostapi::{
    FixedAdvanceShaper, HostServices, MemImageSource, MemStore, MemTransport, RecordingDisplay, ScriptedPrompter,
    UsLayout,
};
use canopy_sandbox::{Bridge, BridgeConfig, GuestInstance};

/// Viewport of the headless display used by every test.
pub const VIEWPORT: (f32, f32) = (800.0, 450.0);

/// Clones of the in-memory capabilities handed to the guest, kept to
/// drive and inspect the host side.
pub struct Handles {
    pub display: RecordingDisplay,
    pub transport: MemTransport,
    pub store: MemStore,
    pub shaper: FixedAdvanceShaper,
    pub prompter: ScriptedPrompter,
}

pub fn headless() -> (HostServices, Handles) {
    let handles = Handles {
        display: RecordingDisplay::new(VIEWPORT.0, VIEWPORT.1),
        transport: MemTransport::new(),
        store: MemStore::new(),
        shaper: FixedAdvanceShaper::default(),
        prompter: ScriptedPrompter::new(),
    };
    let services = HostServices {
        display: Box::new(handles.display.clone()),
        text: Box::new(handles.shaper.clone()),
        images: Box::new(MemImageSource::new()),
        transport: Box::new(handles.transport.clone()),
        storage: Box::new(handles.store.clone()),
        prompter: Box::new(handles.prompter.clone()),
        keyboard: Box::new(UsLayout),
    };
    (services, handles)
}

/// Compile and instantiate `wat` against a headless host.
pub fn launch(wat: &str) -> (GuestInstance, Handles) {
    launch_with(wat, BridgeConfig::default())
}

pub fn launch_with(wat: &str, config: BridgeConfig) -> (GuestInstance, Handles) {
    let bridge = Bridge::new(wat.as_bytes(), config).expect("guest should validate");
    let (services, handles) = headless();
    let guest = bridge.instantiate(services).expect("guest should initialize");
    (guest, handles)
}

// ── Data segments ──

/// Escape `bytes` for a WAT string literal.
fn escape(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("\\{b:02x}")).collect()
}

/// `data` segment placing `words` at word address `addr`.
pub fn words_at(addr: u32, words: &[u32]) -> String {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    format!("(data (i32.const {}) \"{}\")", addr * 4, escape(&bytes))
}

/// Words of a string in `[len, reserved, code points...]` layout.
pub fn string_words(text: &str) -> Vec<u32> {
    let mut words = vec![text.chars().count() as u32, 0];
    words.extend(text.chars().map(u32::from));
    words
}

/// `data` segment placing the string `text` at word address `addr`.
pub fn string_at(addr: u32, text: &str) -> String {
    words_at(addr, &string_words(text))
}

/// Pack bytes into little-endian words, zero-padding the last one.
pub fn pack_bytes(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        })
        .collect()
}

/// Words in one draw record.
pub const RECORD_WORDS: usize = 35;

/// Draw record for a rectangle centred at `(x, y)` with the background
/// color stored at `background`. Every optional enum is absent and there is
/// no text or image.
pub fn rect_record(x: f32, y: f32, z: f32, width: f32, height: f32, background: u32) -> Vec<u32> {
    let absent = u32::MAX;
    let mut words = vec![0u32; RECORD_WORDS];
    words[0] = x.to_bits();
    words[1] = y.to_bits();
    words[2] = z.to_bits();
    words[3] = width.to_bits();
    words[4] = height.to_bits();
    words[6] = absent;
    words[7] = absent;
    words[8] = 0;
    words[14] = background;
    words[24] = absent;
    words[28] = absent;
    words[29] = absent;
    words[32] = absent;
    words
}

/// Draw record showing the string at `text` in `size`-pixel sans-serif,
/// colored by the color at `color`.
pub fn text_record(x: f32, y: f32, width: f32, height: f32, text: u32, size: f32, color: u32) -> Vec<u32> {
    let mut words = rect_record(x, y, 0.0, width, height, 0);
    words[23] = text;
    words[24] = 0;
    words[25] = size.to_bits();
    words[26] = color;
    words
}

/// Build a guest module with one page of exported memory.
///
/// `imports` and `body` are spliced in verbatim; `body` must define
/// `initialize` and any other exports.
pub fn guest(imports: &str, body: &str) -> String {
    format!(
        r#"
        (module
            {imports}
            (memory (export "memory") 1)
            {body})
        "#
    )
}

/// Byte offset of word address `addr`, for `i32.load`/`i32.store` in WAT.
pub fn byte(addr: u32) -> u32 {
    addr * 4
}
