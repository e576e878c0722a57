//! The bundle of host capabilities a guest instance is wired to.

use crate::display::Display;
use crate::images::{ImageSource, MemImageSource};
use crate::keyboard::{KeyboardLayout, UsLayout};
use crate::kv_store::KeyValueStore;
use crate::mem_store::MemStore;
use crate::mem_transport::MemTransport;
use crate::prompt::{Prompter, ScriptedPrompter};
use crate::recording::RecordingDisplay;
use crate::text::{FixedAdvanceShaper, TextShaper};
use crate::transport::Transport;

/// Everything the bridge needs from its host, one capability per service.
pub struct HostServices {
    pub display: Box<dyn Display>,
    pub text: Box<dyn TextShaper>,
    pub images: Box<dyn ImageSource>,
    pub transport: Box<dyn Transport>,
    pub storage: Box<dyn KeyValueStore>,
    pub prompter: Box<dyn Prompter>,
    pub keyboard: Box<dyn KeyboardLayout>,
}

impl HostServices {
    /// Fully in-memory host with a `width` x `height` viewport.
    pub fn headless(width: f32, height: f32) -> Self {
        Self {
            display: Box::new(RecordingDisplay::new(width, height)),
            text: Box::new(FixedAdvanceShaper::default()),
            images: Box::new(MemImageSource::new()),
            transport: Box::new(MemTransport::new()),
            storage: Box::new(MemStore::new()),
            prompter: Box::new(ScriptedPrompter::new()),
            keyboard: Box::new(UsLayout),
        }
    }

    pub fn with_display(mut self, display: impl Display + 'static) -> Self {
        self.display = Box::new(display);
        self
    }

    pub fn with_text(mut self, text: impl TextShaper + 'static) -> Self {
        self.text = Box::new(text);
        self
    }

    pub fn with_images(mut self, images: impl ImageSource + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    pub fn with_storage(mut self, storage: impl KeyValueStore + 'static) -> Self {
        self.storage = Box::new(storage);
        self
    }

    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    pub fn with_keyboard(mut self, keyboard: impl KeyboardLayout + 'static) -> Self {
        self.keyboard = Box::new(keyboard);
        self
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
