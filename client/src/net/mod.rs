//! Networking for the tutor page.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` plugs `gloo-net` into the workflow crate's `Transport` seam and wraps
//! the few `window.location` touches (current path, login redirect).

pub mod api;
