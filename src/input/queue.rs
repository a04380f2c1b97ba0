use std::sync::mpsc;

use super::event::InputEvent;

/// Channel feeding raw input into the single-threaded dispatcher.
///
/// Platform callbacks (window event loop, DOM listeners) push through
/// cloned [`InputSender`]s; the owner drains the queue once per frame on
/// the coordinating thread.
pub struct InputQueue {
    tx: mpsc::Sender<InputEvent>,
    rx: mpsc::Receiver<InputEvent>,
}

/// Producer half of an [`InputQueue`].
#[derive(Clone)]
pub struct InputSender {
    tx: mpsc::Sender<InputEvent>,
}

impl InputSender {
    /// Enqueue an event. Returns `false` if the queue has been dropped.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

impl InputQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// New producer handle.
    #[must_use]
    pub fn sender(&self) -> InputSender {
        InputSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every event queued so far, in arrival order.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order_from_many_senders() {
        let queue = InputQueue::new();
        let a = queue.sender();
        let b = a.clone();
        assert!(a.send(InputEvent::CursorMoved { x: 1.0, y: 1.0 }));
        assert!(b.send(InputEvent::KeyPressed {
            key: "Escape".into()
        }));
        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], InputEvent::CursorMoved { x: 1.0, y: 1.0 });
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn sender_reports_dropped_queue() {
        let queue = InputQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.send(InputEvent::CursorMoved { x: 0.0, y: 0.0 }));
    }
}
