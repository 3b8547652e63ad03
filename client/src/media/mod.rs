//! Browser media glue: camera stream and canvas encode/redraw.
//!
//! SYSTEM CONTEXT
//! ==============
//! Sizing and validation rules come from `workflow::image`; these modules
//! only move pixels between `<video>`, `<canvas>` and data URLs.

pub mod camera;
pub mod canvas;
