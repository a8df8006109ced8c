//! What the user sees of a session: progress, log, current and final result.

use serde::Serialize;
use uuid::Uuid;

const PREVIEW_CHARS: usize = 100;

/// round(100 * (index + 1) / total), halves rounding up.
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = (index + 1).min(total);
    ((200 * done + total) / (2 * total)) as u8
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Option<Uuid>,
    pub processing: bool,
    pub stop_enabled: bool,
    pub progress_percent: u8,
    pub progress_log: String,
    pub current_result: String,
    pub final_result: String,
    pub notice: Option<String>,
}

impl SessionView {
    /// Clears every region for a fresh submission.
    pub fn begin(&mut self, session_id: Uuid) {
        *self = SessionView {
            session_id: Some(session_id),
            processing: true,
            stop_enabled: true,
            ..SessionView::default()
        };
    }

    pub fn append_progress(&mut self, text: &str) {
        if !self.progress_log.is_empty() {
            self.progress_log.push('\n');
        }
        self.progress_log.push_str(text);
    }

    pub fn set_progress(&mut self, percent: u8) {
        self.progress_percent = percent;
    }

    pub fn show_split(&mut self, total: usize) {
        self.append_progress(&format!("Text split into {} parts", total));
        self.set_progress(0);
    }

    pub fn show_part_started(&mut self, index: usize, total: usize, chunk: &str) {
        self.set_progress(progress_percent(index, total));
        let preview: String = chunk.chars().take(PREVIEW_CHARS).collect();
        self.append_progress(&format!(
            "Processing part {}/{}\nContent: {}...",
            index + 1,
            total,
            preview
        ));
    }

    pub fn show_part_result(&mut self, part: usize, total: usize, result: &str) {
        self.current_result = format!("Result for part {}:\n{}", part, result);
        self.final_result = format!("Completed {}/{} parts", part, total);
    }

    pub fn show_stopping(&mut self) {
        self.append_progress("\nStopping processing...");
        self.stop_enabled = false;
    }

    pub fn show_error(&mut self, message: &str) {
        let text = format!("Error: {}", message);
        self.current_result = text.clone();
        self.notice = Some(text);
    }

    pub fn show_finished(&mut self, stopped: bool, total: usize) {
        self.final_result = if stopped {
            "Processing stopped by user request".to_string()
        } else {
            format!("Processing complete. All {} parts processed.", total)
        };
    }

    pub fn show_loaded_results(&mut self, joined: String) {
        self.final_result = joined;
    }

    /// Back to idle; the rendered regions stay until the next submission.
    pub fn finish(&mut self) {
        self.processing = false;
        self.stop_enabled = false;
    }
}

/// Per-part results of the current session, kept for "load results".
#[derive(Debug, Clone, Default)]
pub struct ResultLog {
    entries: Vec<String>,
}

impl ResultLog {
    pub fn push(&mut self, part: usize, result: &str) {
        self.entries.push(format!("## Part {}\n{}", part, result));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All parts separated by a blank line, or `None` if nothing was processed.
    pub fn joined(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.entries.join("\n\n"))
        }
    }
}
