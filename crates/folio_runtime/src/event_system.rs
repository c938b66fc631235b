use std::sync::Arc;

use flume::{Receiver, Sender};
use folio_forms::{AppEvent, EventType};
use log::debug;
use parking_lot::Mutex;

#[derive(Debug)]
struct Subscriber {
    kinds: Vec<EventType>,
    sender: Sender<AppEvent>,
}

impl Subscriber {
    fn accepts(&self, kind: EventType) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

/// Application-wide publish/subscribe channel, owned by the shell and handed
/// to the widgets that need it. Clones share the same subscribers.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    selection: Arc<Mutex<Option<String>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives every event of the given kinds; an empty slice means all.
    pub fn subscribe(&self, kinds: &[EventType]) -> Receiver<AppEvent> {
        let (sender, receiver) = flume::unbounded();
        self.subscribers.lock().push(Subscriber {
            kinds: kinds.to_vec(),
            sender,
        });
        receiver
    }

    /// Delivers `event` and returns the number of subscribers reached.
    /// Subscribers whose receiver was dropped are forgotten.
    pub fn publish(&self, event: AppEvent) -> usize {
        let kind = event.event_type();
        match &event {
            AppEvent::RepositoryItemSelected { id } => *self.selection.lock() = Some(id.clone()),
            AppEvent::RepositoryItemDeselected { .. } => *self.selection.lock() = None,
            _ => {}
        }

        let mut delivered = 0;
        self.subscribers.lock().retain(|subscriber| {
            if !subscriber.accepts(kind) {
                return !subscriber.sender.is_disconnected();
            }
            match subscriber.sender.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        debug!("Published {} to {} subscriber(s)", kind.as_str(), delivered);
        delivered
    }

    /// Id of the repository item currently selected, if any.
    pub fn selected_item(&self) -> Option<String> {
        self.selection.lock().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
