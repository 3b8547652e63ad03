//! Race a future against a timer.
//!
//! The timer is supplied by the caller (`gloo_timers` in the browser,
//! `tokio::time::sleep` in the CLI) so this crate stays runtime-agnostic.
//! Whichever side settles first wins and the other future is dropped, which
//! is as close to cancellation as a browser `fetch` gets without an abort
//! signal.

#[cfg(test)]
#[path = "deadline_test.rs"]
mod deadline_test;

use std::future::Future;
use std::pin::pin;

use futures::future::{self, Either};

/// The timer fired before the work finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("deadline elapsed")]
pub struct DeadlineElapsed;

/// Run `work` until it completes or `timer` fires, whichever is first.
///
/// When both are ready on the same poll the work wins.
///
/// # Errors
///
/// Returns [`DeadlineElapsed`] if the timer settles first.
pub async fn with_deadline<F, S>(work: F, timer: S) -> Result<F::Output, DeadlineElapsed>
where
    F: Future,
    S: Future<Output = ()>,
{
    let work = pin!(work);
    let timer = pin!(timer);
    match future::select(work, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(DeadlineElapsed),
    }
}
