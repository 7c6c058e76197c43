//! Signal publishing/subscription abstraction (mechanics only).
//!
//! Two kinds of consumers exist:
//!
//! - **Listeners** run synchronously inside `publish`, before it returns. A
//!   publisher can therefore rely on listener side effects having happened
//!   once `publish` is done (the transport uses this so the session is already
//!   cleared when a 401 error reaches the caller).
//! - **Subscriptions** receive a copy of every message through a channel and
//!   are drained at the consumer's own pace (UI refresh, CLI output, tests).

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a signal stream.
///
/// Each subscription gets a copy of all messages published after it was
/// created (broadcast semantics).
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything queued so far, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Synchronous consumer invoked inline by `EventBus::publish`.
///
/// Listeners may publish follow-up messages on the same bus; subscribers
/// then see the original message before the follow-ups.
pub trait EventListener<M>: Send + Sync {
    fn on_event(&self, message: &M);
}

/// Domain-agnostic pub/sub abstraction.
///
/// The trait requires `Send + Sync`; multiple threads may publish
/// concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;

    fn listen(&self, listener: Arc<dyn EventListener<M>>) -> Result<(), Self::Error>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }

    fn listen(&self, listener: Arc<dyn EventListener<M>>) -> Result<(), Self::Error> {
        (**self).listen(listener)
    }
}
