//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! The tutor page owns the async orchestration (service probe, consent check,
//! analyze call) and delegates rendering details to `components`.

pub mod tutor;
