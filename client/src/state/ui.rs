//! Toasts and result-panel chrome.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

use workflow::feedback::ImageDisplay;

/// Toasts kept on screen at once; older ones are dropped first.
pub const MAX_TOASTS: usize = 4;

/// Toast severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastLevel {
    #[default]
    Success,
    Danger,
    Warning,
    Info,
}

impl ToastLevel {
    /// Default title for the level.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Danger => "Error",
            Self::Warning => "Warning",
            Self::Info => "Information",
        }
    }

    /// CSS modifier class.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Success => "toast--success",
            Self::Danger => "toast--danger",
            Self::Warning => "toast--warning",
            Self::Info => "toast--info",
        }
    }

    /// Errors and warnings stay until dismissed.
    #[must_use]
    pub fn sticky(self) -> bool {
        matches!(self, Self::Danger | Self::Warning)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub title: String,
    pub body: String,
}

/// Redraw status of the result image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PreviewStatus {
    #[default]
    Pending,
    Drawn,
    Unavailable,
}

/// UI state for toasts and the result panel.
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub toasts: Vec<Toast>,
    next_toast_id: u64,
    pub image_display: ImageDisplay,
    pub preview: PreviewStatus,
    /// "Generated on ..." line for the current result.
    pub generated_label: Option<String>,
    /// The "connected" banner is shown briefly, then hidden.
    pub service_banner_dismissed: bool,
}

impl UiState {
    /// Show a toast with the level's default title. Returns its id.
    pub fn push_toast(&mut self, level: ToastLevel, body: &str) -> u64 {
        self.push_titled(level, level.title(), body)
    }

    /// Show a toast with an explicit title. Returns its id.
    pub fn push_titled(&mut self, level: ToastLevel, title: &str, body: &str) -> u64 {
        self.next_toast_id += 1;
        self.toasts.push(Toast {
            id: self.next_toast_id,
            level,
            title: title.to_owned(),
            body: body.to_owned(),
        });
        if self.toasts.len() > MAX_TOASTS {
            let excess = self.toasts.len() - MAX_TOASTS;
            self.toasts.drain(..excess);
        }
        self.next_toast_id
    }

    pub fn dismiss_toast(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    pub fn toggle_image(&mut self) {
        self.image_display = self.image_display.toggled();
    }

    /// Reset result chrome for a freshly rendered result.
    pub fn result_shown(&mut self, generated_label: String) {
        self.image_display = ImageDisplay::Collapsed;
        self.preview = PreviewStatus::Pending;
        self.generated_label = Some(generated_label);
    }
}
