//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (MathJax, the local
//! clock) from page and component logic.

pub mod clock;
pub mod mathjax;
