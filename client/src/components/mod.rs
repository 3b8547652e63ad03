//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the two workflow steps and their chrome, reading and
//! writing the shared `Workflow` and `UiState` signals from context. Async
//! orchestration that spans components stays in `pages::tutor`.

pub mod capture_panel;
pub mod consent_modal;
pub mod feedback_panel;
pub mod mode_picker;
pub mod service_banner;
pub mod toast_stack;
