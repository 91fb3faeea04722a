//! Event channel implementation using crossbeam-channel.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the core library. Cheap to clone across threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event; silently dropped once the receiver is gone.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events on the presentation side.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender { inner: sender }, EventReceiver { inner: receiver })
    }
}

/// A sender whose receiver is already dropped, for runs without a UI.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AssemblyEvent, MatchEvent};
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_cross_threads() {
        let (sender, receiver) = EventChannel::new();

        thread::spawn(move || {
            sender.send(Event::Match(MatchEvent::Matched {
                path: PathBuf::from("/scans/a.png"),
                number: "005".to_string(),
                distance: 2,
            }));
        })
        .join()
        .unwrap();

        match receiver.recv() {
            Some(Event::Match(MatchEvent::Matched { number, .. })) => assert_eq!(number, "005"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        null_sender().send(Event::Assembly(AssemblyEvent::SetStarted {
            set_name: "Genetic Apex".to_string(),
        }));
    }

    #[test]
    fn receiver_ends_when_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        sender.send(Event::Assembly(AssemblyEvent::SetStarted {
            set_name: "Mythical Island".to_string(),
        }));
        drop(sender);

        assert_eq!(receiver.iter().count(), 1);
        assert!(receiver.recv().is_none());
    }
}
