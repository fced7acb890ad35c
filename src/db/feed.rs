use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use super::models::Message;

struct Subscriber {
    id: u64,
    conversation_id: String,
    tx: Sender<Message>,
}

/// In-process replacement for the hosted backend's realtime channel:
/// every inserted message is pushed to the subscribers of its conversation.
#[derive(Default)]
pub struct MessageFeed {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl MessageFeed {
    pub fn subscribe(self: &Arc<Self>, conversation_id: &str) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();
        self.lock().push(Subscriber {
            id,
            conversation_id: conversation_id.to_string(),
            tx,
        });
        debug!("subscription {id} opened for conversation {conversation_id}");
        Subscription {
            id,
            rx,
            feed: Arc::clone(self),
        }
    }

    /// Deliver an inserted message. Subscribers whose receiver is gone are pruned.
    pub fn publish(&self, message: &Message) {
        self.lock().retain(|s| {
            if s.conversation_id != message.conversation_id {
                return true;
            }
            s.tx.send(message.clone()).is_ok()
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn unsubscribe(&self, id: u64) {
        self.lock().retain(|s| s.id != id);
        debug!("subscription {id} closed");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        // A poisoned list is still a valid list of senders.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Insert events for one conversation. Dropping it tears the subscription down.
pub struct Subscription {
    id: u64,
    rx: Receiver<Message>,
    feed: Arc<MessageFeed>,
}

impl Subscription {
    /// All messages delivered so far, without blocking.
    pub fn drain(&self) -> Vec<Message> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(m) => out.push(m),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Wait up to `timeout` for the next message.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Message> {
        match self.rx.recv_timeout(timeout) {
            Ok(m) => Some(m),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.feed.unsubscribe(self.id);
    }
}
