//! One-shot completion signal between an invocation and its caller.
//!
//! The caller keeps the [`CompletionReceiver`] and awaits it. The
//! [`CompletionSignal`] can be cloned and handed to whatever task reports
//! the outcome; the first `complete` call wins and every later call gets
//! [`CompletionError::AlreadyCompleted`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::envelope::ResponseEnvelope;
use crate::error::FunctionError;

/// Final outcome of one invocation.
pub type Completion = Result<ResponseEnvelope, FunctionError>;

/// Errors from the completion handoff itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion signal already fulfilled")]
    AlreadyCompleted,
    #[error("completion signal dropped without being fulfilled")]
    SignalDropped,
}

/// Creates a connected signal/receiver pair.
#[must_use]
pub fn completion_channel() -> (CompletionSignal, CompletionReceiver) {
    let (tx, rx) = oneshot::channel();
    (
        CompletionSignal {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        CompletionReceiver { rx },
    )
}

/// Write side of the handoff. Fulfilled at most once across all clones.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    tx: Arc<Mutex<Option<oneshot::Sender<Completion>>>>,
}

impl CompletionSignal {
    /// Fulfills the signal with `outcome`.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompleted` if any clone of this signal was already
    /// fulfilled; `outcome` is dropped in that case.
    pub fn complete(&self, outcome: Completion) -> Result<(), CompletionError> {
        let Some(tx) = self.tx.lock().take() else {
            tracing::warn!("completion signal fulfilled more than once; keeping the first outcome");
            return Err(CompletionError::AlreadyCompleted);
        };
        // A dropped receiver means the caller stopped waiting.
        if tx.send(outcome).is_err() {
            tracing::debug!("completion receiver dropped before fulfillment");
        }
        Ok(())
    }

    /// Whether the signal has been fulfilled.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.tx.lock().is_none()
    }
}

/// Read side of the handoff. Resolves once the signal is fulfilled.
#[derive(Debug)]
pub struct CompletionReceiver {
    rx: oneshot::Receiver<Completion>,
}

impl Future for CompletionReceiver {
    type Output = Result<Completion, CompletionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| CompletionError::SignalDropped))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::identity::ModuleIdentity;
    use crate::types::Value;

    #[tokio::test]
    async fn delivers_envelope() {
        let (signal, rx) = completion_channel();
        signal
            .complete(Ok(ResponseEnvelope::out_msg(Value::from("m"))))
            .unwrap();
        assert!(signal.is_completed());
        let outcome = rx.await.unwrap();
        assert_eq!(outcome.unwrap(), ResponseEnvelope::out_msg(Value::from("m")));
    }

    #[tokio::test]
    async fn second_completion_is_rejected() {
        let (signal, rx) = completion_channel();
        let err = FunctionError::new(ModuleIdentity::default().tag("X"), "first");
        signal.complete(Err(err.clone())).unwrap();
        assert_eq!(
            signal.complete(Ok(ResponseEnvelope::default())),
            Err(CompletionError::AlreadyCompleted)
        );
        assert_eq!(rx.await.unwrap(), Err(err));
    }

    #[tokio::test]
    async fn dropped_signal_is_reported() {
        let (signal, rx) = completion_channel();
        drop(signal);
        assert_eq!(rx.await, Err(CompletionError::SignalDropped));
    }

    #[test]
    fn completing_after_receiver_dropped_is_ok() {
        let (signal, rx) = completion_channel();
        drop(rx);
        assert!(signal.complete(Ok(ResponseEnvelope::default())).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_completion_has_one_winner() {
        let (signal, rx) = completion_channel();
        let wins = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for i in 0..16_i64 {
            let signal = signal.clone();
            let wins = Arc::clone(&wins);
            handles.push(tokio::spawn(async move {
                if signal
                    .complete(Ok(ResponseEnvelope::out_msg(Value::Int(i))))
                    .is_ok()
                {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        let outcome = rx.await.unwrap().unwrap();
        assert!(matches!(outcome.out_msg, Some(Value::Int(_))));
    }
}
