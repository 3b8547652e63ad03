//! Client-side UI state.
//!
//! DESIGN
//! ======
//! Workflow state lives in `workflow::Workflow` behind one `RwSignal`. This
//! module holds only presentation chrome that the workflow does not care
//! about: toasts, the result-image toggle and the preview status.

pub mod ui;
