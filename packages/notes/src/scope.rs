//! Cancellation scope for a mounted view.
//!
//! A [`ViewScope`] lives exactly as long as the view that created it. Work
//! started on behalf of the view runs through [`ViewScope::run`]; once the view
//! goes away the scope is cancelled and any in-flight result is discarded
//! instead of being written into state that no longer exists.

use std::future::{poll_fn, Future};
use std::pin::pin;
use std::task::Poll;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("view was closed before the operation finished")]
pub struct Cancelled;

#[derive(Clone, Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// A scope cancelled together with this one, but cancellable on its own.
    pub fn child(&self) -> ViewScope {
        ViewScope {
            token: self.token.child_token(),
        }
    }

    /// Await `fut` unless the scope is cancelled first.
    ///
    /// A result that arrives after cancellation is dropped, so `Ok` always
    /// means the scope was still live when the value was produced.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        if self.token.is_cancelled() {
            return Err(Cancelled);
        }
        let mut fut = pin!(fut);
        let mut cancelled = pin!(self.token.cancelled());
        let output = poll_fn(|cx| {
            if cancelled.as_mut().poll(cx).is_ready() {
                return Poll::Ready(None);
            }
            fut.as_mut().poll(cx).map(Some)
        })
        .await;
        match output {
            Some(value) if self.is_live() => Ok(value),
            _ => Err(Cancelled),
        }
    }
}
