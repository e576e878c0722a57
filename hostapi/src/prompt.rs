//! Modal text prompts shown to the user on the guest's behalf.
//!
//! Implementations:
//! - `ScriptedPrompter` (this crate), answers queued up front
//! - a dialog box or terminal line reader, provided by embedders

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Ask the user for one line of text.
pub trait Prompter: Send {
    /// `None` when the user dismissed the prompt.
    fn prompt(&mut self, message: &str) -> Option<String>;
}

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<Option<String>>,
    asked: Vec<String>,
}

/// Prompter replaying queued answers. Once the queue is empty every prompt
/// is dismissed. Clones share the queue and the record of messages.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    script: Arc<Mutex<Script>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue the reply to the next unanswered prompt.
    pub fn answer(&self, reply: impl Into<String>) {
        self.lock().answers.push_back(Some(reply.into()));
    }

    /// Queue a dismissal.
    pub fn dismiss(&self) {
        self.lock().answers.push_back(None);
    }

    /// Messages shown so far, oldest first.
    pub fn asked(&self) -> Vec<String> {
        self.lock().asked.clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str) -> Option<String> {
        let mut script = self.lock();
        script.asked.push(message.to_string());
        script.answers.pop_front().flatten()
    }
}
