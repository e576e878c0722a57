//! Per-instance mutable state held in the Wasmtime Store.
//!
//! `HostState` owns one instance of every service. Services are built once
//! when the guest is instantiated and reached by host functions through
//! `Caller::data_mut`; nothing is looked up globally.

use std::collections::VecDeque;

use wasmtime::{StoreLimits, StoreLimitsBuilder};

use canopy_hostapi::{HostServices, KeyboardLayout, Prompter};
use canopy_primitives::types::PAGE_SIZE;
use canopy_primitives::wire::KEYBOARD_CODES;
use canopy_primitives::Frame;

use crate::config::BridgeConfig;
use crate::console::Console;
use crate::files::FileService;
use crate::local_storage::LocalStorage;
use crate::location::Location;
use crate::network::NetworkService;
use crate::renderer::Renderer;
use crate::window::WindowService;

pub struct HostState {
    pub window: WindowService,
    pub network: NetworkService,
    pub renderer: Renderer,
    pub files: FileService,
    pub storage: LocalStorage,
    pub console: Console,
    pub location: Location,
    pub prompter: Box<dyn Prompter>,
    keyboard: Box<dyn KeyboardLayout>,
    /// Linear memory ceiling enforced by the store limiter.
    pub limits: StoreLimits,
    guest_logs: VecDeque<String>,
    max_guest_log_lines: usize,
}

impl HostState {
    pub fn new(services: HostServices, config: &BridgeConfig) -> Self {
        let HostServices {
            display,
            text,
            images,
            transport,
            storage,
            prompter,
            keyboard,
        } = services;
        Self {
            window: WindowService::new(display, config.aspect_ratio, config.click_distance_threshold),
            network: NetworkService::new(transport, config),
            renderer: Renderer::new(text, images),
            files: FileService::new(config.file_root.clone()),
            storage: LocalStorage::new(storage),
            console: Console::new(),
            location: Location::parse(&config.location),
            prompter,
            keyboard,
            limits: StoreLimitsBuilder::new()
                .memory_size(config.max_memory_pages as usize * PAGE_SIZE)
                .build(),
            guest_logs: VecDeque::new(),
            max_guest_log_lines: config.max_guest_log_lines,
        }
    }

    /// Render one decoded frame onto the window's surfaces.
    pub fn draw_frame(&mut self, frame: &Frame) {
        self.renderer.draw_frame(frame, &mut self.window);
    }

    /// Record a guest log line, dropping the oldest when full.
    pub fn add_log(&mut self, message: String) {
        log::info!(target: "guest", "{message}");
        if self.max_guest_log_lines == 0 {
            return;
        }
        if self.guest_logs.len() == self.max_guest_log_lines {
            self.guest_logs.pop_front();
        }
        self.guest_logs.push_back(message);
    }

    /// Upper-cased name of the key at `index` in the key-code table: the
    /// character the user's layout prints on it, else the code itself.
    /// Empty for an index outside the table.
    pub fn key_value(&self, index: i32) -> String {
        let Some(code) = usize::try_from(index).ok().and_then(|i| KEYBOARD_CODES.get(i)) else {
            log::debug!("get_key_value: no key code {index}");
            return String::new();
        };
        self.keyboard
            .key_value(code)
            .unwrap_or_else(|| code.to_string())
            .to_uppercase()
    }

    pub fn guest_logs(&self) -> impl Iterator<Item = &str> {
        self.guest_logs.iter().map(String::as_str)
    }
}
