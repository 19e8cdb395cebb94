//! Bridge from synchronous listeners to async consumers.
//!
//! A [`ChannelBridge`] is an ordinary listener that forwards each matching
//! event into a `tokio` channel. The hub itself never queues; buffering is
//! the bridge's concern and lives in the channel.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::HubResult;
use crate::hub::{EventHub, SubscriptionHandle};
use crate::listener::{BoxError, Listener, ListenerResult};

/// An event forwarded through a bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<P> {
    /// Name the event was published under.
    pub event_name: String,
    /// Cloned payload.
    pub payload: P,
}

/// Listener that forwards events into an unbounded channel.
#[derive(Debug)]
pub struct ChannelBridge<P> {
    name: String,
    sender: mpsc::UnboundedSender<Delivery<P>>,
}

impl<P> ChannelBridge<P> {
    /// Create a bridge and the receiving end of its channel.
    pub fn new(name: impl Into<String>) -> (Self, EventReceiver<P>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                sender,
            },
            EventReceiver { receiver },
        )
    }
}

impl<P: Clone + Send + Sync> Listener<P> for ChannelBridge<P> {
    fn on_event(&self, event_name: &str, payload: &P) -> ListenerResult {
        self.sender
            .send(Delivery {
                event_name: event_name.to_owned(),
                payload: payload.clone(),
            })
            .map_err(|_| BoxError::from("event receiver closed"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Receiving end of a [`ChannelBridge`].
#[derive(Debug)]
pub struct EventReceiver<P> {
    receiver: mpsc::UnboundedReceiver<Delivery<P>>,
}

impl<P> EventReceiver<P> {
    /// Receive the next event.
    ///
    /// Returns `None` once the bridge is gone (unsubscribed and dropped).
    pub async fn recv(&mut self) -> Option<Delivery<P>> {
        self.receiver.recv().await
    }

    /// Receive the next event without waiting.
    pub fn try_recv(&mut self) -> Option<Delivery<P>> {
        self.receiver.try_recv().ok()
    }
}

impl<P: Clone + Send + Sync + 'static> EventHub<P> {
    /// Subscribe a channel bridge to `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HubError::InvalidPattern`] for a malformed pattern.
    pub fn subscribe_channel(
        &self,
        pattern: impl Into<String>,
    ) -> HubResult<(SubscriptionHandle, EventReceiver<P>)> {
        let pattern = pattern.into();
        let (bridge, receiver) = ChannelBridge::new(format!("channel:{pattern}"));
        let handle = self.subscribe(pattern, Arc::new(bridge))?;
        Ok((handle, receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvocationFailure;

    #[tokio::test]
    async fn test_channel_receives_matching_events() {
        let hub = EventHub::<u32>::new();
        let (_handle, mut receiver) = hub.subscribe_channel("SmartContract.*").unwrap();

        hub.publish("SmartContract.RuntimeLog", &1);
        hub.publish("Other.Event", &2);
        hub.publish("SmartContract.ExecutionFail", &3);

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.event_name, "SmartContract.RuntimeLog");
        assert_eq!(first.payload, 1);

        let second = receiver.recv().await.unwrap();
        assert_eq!(second.event_name, "SmartContract.ExecutionFail");
        assert_eq!(second.payload, 3);

        assert!(receiver.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_closed_receiver_is_a_listener_failure() {
        let hub = EventHub::<u32>::new();
        let (_handle, receiver) = hub.subscribe_channel("a").unwrap();
        drop(receiver);

        let report = hub.publish("a", &1);
        assert_eq!(
            report.failures()[0].failure,
            InvocationFailure::Failed("event receiver closed".into())
        );
    }

    #[tokio::test]
    async fn test_recv_ends_after_unsubscribe() {
        let hub = EventHub::<u32>::new();
        let (handle, mut receiver) = hub.subscribe_channel("a").unwrap();

        hub.publish("a", &1);
        assert!(hub.unsubscribe(&handle));

        assert_eq!(receiver.recv().await.map(|d| d.payload), Some(1));
        assert!(receiver.recv().await.is_none());
    }
}
