//! Capture-to-feedback workflow for the tutoring client.
//!
//! This crate holds everything about the snap-and-analyze flow that does not
//! need a browser: the workflow state machine, the image sizing policy, the
//! request/response wire types, error classification, the deadline race and
//! the feedback view model. The `client` crate drives it from Leptos signals
//! and the `cli` crate drives it from a terminal; both plug their HTTP stack
//! in through [`api::Transport`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`image`] | [`image::CapturedImage`], size caps, upload validation |
//! | [`mode`] | [`mode::AnalysisMode`], per-mode labels, endpoints and deadlines |
//! | [`types`] | Request bodies and server response DTOs |
//! | [`api`] | Transport seam, consent check and the single-attempt analyze call |
//! | [`error`] | Error enums and the pure classification function |
//! | [`deadline`] | Runtime-agnostic race between a future and a timer |
//! | [`machine`] | The [`machine::Workflow`] state machine and its view projection |
//! | [`feedback`] | Rendering model for the result regions and image toggle |

pub mod api;
pub mod deadline;
pub mod error;
pub mod feedback;
pub mod image;
pub mod machine;
pub mod mode;
pub mod types;

pub use api::{AnalysisClient, Deadlines, Endpoints, HttpReply, ProbeOutcome, Transport};
pub use error::{AcquireError, AnalysisError, ConsentError, ErrorKind, TransitionError};
pub use image::{CapturedImage, ImageSource};
pub use machine::{Phase, Workflow, WorkflowView};
pub use mode::AnalysisMode;
pub use types::{AnalysisRequest, AnalysisSuccess, ConsentState};
