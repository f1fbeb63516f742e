//! A single code sample with a language picker and a copy button.
//!
//! The viewer never owns the selected language. It reports selections through a callback
//! and the caller feeds the resulting language back in on the next render. The only state
//! kept here is transient: whether the dropdown is open and the copy confirmation.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::Result;

/// Platform clipboard capability.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Outcome of the last copy action, as currently shown to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    Idle,
    Copied,
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct CopyNotice {
    status: CopyStatus,
    until: Instant,
}

#[derive(Debug, Clone)]
pub struct CodeSampleViewer {
    dropdown_open: bool,
    notice: Option<CopyNotice>,
    feedback: Duration,
}

impl Default for CodeSampleViewer {
    fn default() -> Self {
        CodeSampleViewer::new(Duration::from_secs(2))
    }
}

impl CodeSampleViewer {
    /// `feedback` is how long a copy confirmation (or failure notice) stays visible.
    pub fn new(feedback: Duration) -> Self {
        Self {
            dropdown_open: false,
            notice: None,
            feedback,
        }
    }

    pub fn is_dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown_open = !self.dropdown_open;
    }

    /// Dismiss the dropdown without a selection, e.g. on a click outside of it.
    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }

    /// Report a language picked from the dropdown. `on_change` runs once when `language`
    /// is one of `available`; anything else is ignored. The dropdown closes either way.
    pub fn select_language<'a, F>(
        &mut self,
        language: &str,
        available: impl IntoIterator<Item = &'a str>,
        on_change: F,
    ) -> bool
    where
        F: FnOnce(&str),
    {
        self.dropdown_open = false;

        if !available.into_iter().any(|candidate| candidate == language) {
            warn!(language, "Ignoring selection of a language the sample doesn't have");
            return false;
        }

        on_change(language);
        true
    }

    /// Copy `code` verbatim. Failures are logged and shown as a transient notice.
    pub fn copy(&mut self, code: &str, clipboard: &mut dyn Clipboard, now: Instant) -> CopyStatus {
        let status = match clipboard.write_text(code) {
            Ok(()) => {
                debug!(bytes = code.len(), "Copied code sample");
                CopyStatus::Copied
            }
            Err(err) => {
                warn!(error = %err, "Failed to copy code sample to the clipboard");
                CopyStatus::Failed
            }
        };

        self.notice = Some(CopyNotice {
            status,
            until: now + self.feedback,
        });

        status
    }

    /// The copy notice to display at `now`; reverts to `Idle` once the feedback delay passed.
    pub fn status(&self, now: Instant) -> CopyStatus {
        match self.notice {
            Some(notice) if now < notice.until => notice.status,
            _ => CopyStatus::Idle,
        }
    }
}
