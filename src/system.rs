use log::{debug, error, info, warn};
use std::time::Instant;

/// Severity of a message logged by the document engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Always,
    Error,
    Assert,
    Warning,
    Info,
    Debug,
}

pub trait SystemInterface {
    /// Seconds since the interface was created.
    fn elapsed_time(&self) -> f64;

    /// Routes a document-engine message into the `log` facade. Returning
    /// `true` lets the engine carry on after an assertion.
    fn log_message(&self, kind: LogType, message: &str) -> bool {
        match kind {
            LogType::Error | LogType::Assert => error!(target: "document", "{}", message),
            LogType::Warning => warn!(target: "document", "{}", message),
            LogType::Always | LogType::Info => info!(target: "document", "{}", message),
            LogType::Debug => debug!(target: "document", "{}", message),
        }
        true
    }

    fn set_clipboard_text(&mut self, text: &str);
    fn clipboard_text(&mut self) -> String;
}

/// Wall clock plus the platform clipboard. When no clipboard is available
/// (headless, wasm) text is kept in-process instead.
pub struct HostSystem {
    start: Instant,
    #[cfg(not(target_arch = "wasm32"))]
    clipboard: Option<arboard::Clipboard>,
    local_clipboard: String,
}

impl HostSystem {
    /// Uses the in-process buffer only; see `with_platform_clipboard`.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            #[cfg(not(target_arch = "wasm32"))]
            clipboard: None,
            local_clipboard: String::new(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_platform_clipboard() -> Self {
        let mut system = Self::new();
        match arboard::Clipboard::new() {
            Ok(clipboard) => system.clipboard = Some(clipboard),
            Err(err) => warn!("clipboard unavailable, using local buffer: {}", err),
        }
        system
    }
}

impl Default for HostSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInterface for HostSystem {
    fn elapsed_time(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn set_clipboard_text(&mut self, text: &str) {
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(clipboard) = self.clipboard.as_mut() {
            if let Err(err) = clipboard.set_text(text.to_owned()) {
                warn!("clipboard write failed: {}", err);
            }
        }
        self.local_clipboard = text.to_string();
    }

    fn clipboard_text(&mut self) -> String {
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.get_text() {
                Ok(text) => return text,
                Err(err) => debug!("clipboard read failed: {}", err),
            }
        }
        self.local_clipboard.clone()
    }
}
