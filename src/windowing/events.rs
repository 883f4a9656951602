use std::time::Duration;

use flume::{Receiver, RecvTimeoutError, TryRecvError};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{WindowError, input::InputEvent};

use super::Size;

/// Coarse lifecycle level of a window. Later variants compare greater.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Stage {
    #[default]
    NotRunning,
    /// On screen but not interactive.
    Visible,
    Running,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StageEvent {
    pub stage: Stage,
}

/// A request to draw a frame of the given size.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DrawEvent {
    pub size: Size,
    sync: bool,
}

impl DrawEvent {
    pub fn new(size: Size) -> Self {
        Self { size, sync: false }
    }

    /// A draw that must invalidate cached GPU state first, e.g. after the
    /// native surface was recreated.
    pub fn with_sync(size: Size) -> Self {
        Self { size, sync: true }
    }

    pub(crate) fn sync(&self) -> bool {
        self.sync
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CommandKind {
    /// The platform back button was pressed.
    Back,
}

/// A platform command the application must handle before anything else
/// happens to the window. Setting `cancel` asks the platform to skip its
/// default action.
#[derive(Debug)]
pub struct CommandEvent {
    pub kind: CommandKind,
    pub cancel: bool,
}

impl CommandEvent {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            cancel: false,
        }
    }
}

/// The last event of a window. `cause` is `None` for a clean shutdown.
#[derive(Debug, Default)]
pub struct DestroyEvent {
    pub cause: Option<WindowError>,
}

#[derive(Debug)]
pub enum Event {
    Input(InputEvent),
    Command(CommandEvent),
    Stage(StageEvent),
    Draw(DrawEvent),
    Destroy(DestroyEvent),
}

/// An event on its way to the application, with the completion signal the
/// producer waits on when the event needs acknowledging.
#[derive(Debug)]
pub(crate) struct Delivery {
    pub event: Event,
    pub ack: Option<oneshot::Sender<()>>,
}

/// The window's event sequence.
///
/// Some events must be fully handled before the window moves on. Receiving
/// such an event arms an acknowledgment that completes when the next event
/// is requested, when [`Events::ack`] is called, or when the receiver goes
/// away. Handling an event therefore lasts until the application comes
/// back for the next one.
pub struct Events {
    rx: Receiver<Delivery>,
    pending: Mutex<Option<oneshot::Sender<()>>>,
}

impl Events {
    pub(crate) fn new(rx: Receiver<Delivery>) -> Self {
        Self {
            rx,
            pending: Mutex::new(None),
        }
    }

    /// Signals that the last received event has been handled.
    pub fn ack(&self) {
        if let Some(ack) = self.pending.lock().take() {
            let _ = ack.send(());
        }
    }

    fn accept(&self, delivery: Delivery) -> Event {
        *self.pending.lock() = delivery.ack;
        delivery.event
    }

    /// Blocks until the next event. Returns `None` once the window has been
    /// destroyed and its final event consumed.
    pub fn recv(&self) -> Option<Event> {
        self.ack();
        self.rx.recv().ok().map(|d| self.accept(d))
    }

    pub fn try_recv(&self) -> Result<Event, TryRecvError> {
        self.ack();
        self.rx.try_recv().map(|d| self.accept(d))
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.ack();
        self.rx.recv_timeout(timeout).map(|d| self.accept(d))
    }

    pub async fn recv_async(&self) -> Option<Event> {
        self.ack();
        let delivery = self.rx.recv_async().await.ok()?;
        Some(self.accept(delivery))
    }
}

impl Iterator for &Events {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::NotRunning < Stage::Visible);
        assert!(Stage::Visible < Stage::Running);
        assert_eq!(Stage::default(), Stage::NotRunning);
    }

    #[test]
    fn next_receive_acknowledges_previous_event() {
        let (tx, rx) = flume::bounded(0);
        let events = Events::new(rx);

        let producer = thread::spawn(move || {
            let (ack, done) = oneshot::channel();
            tx.send(Delivery {
                event: Event::Stage(StageEvent {
                    stage: Stage::Running,
                }),
                ack: Some(ack),
            })
            .unwrap();
            done.blocking_recv().unwrap();
            tx.send(Delivery {
                event: Event::Destroy(DestroyEvent::default()),
                ack: None,
            })
            .unwrap();
        });

        assert!(matches!(events.recv(), Some(Event::Stage(_))));
        assert!(matches!(events.recv(), Some(Event::Destroy(_))));
        producer.join().unwrap();
        assert!(events.recv().is_none());
    }

    #[test]
    fn explicit_ack_releases_producer() {
        let (tx, rx) = flume::bounded(0);
        let events = Events::new(rx);

        let producer = thread::spawn(move || {
            let (ack, done) = oneshot::channel();
            tx.send(Delivery {
                event: Event::Command(CommandEvent::new(CommandKind::Back)),
                ack: Some(ack),
            })
            .unwrap();
            done.blocking_recv().is_ok()
        });

        let event = events.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(event, Event::Command(CommandEvent { kind: CommandKind::Back, .. })));
        events.ack();
        assert!(producer.join().unwrap());
    }

    #[test]
    fn dropping_receiver_releases_producer() {
        let (tx, rx) = flume::bounded(0);
        let events = Events::new(rx);

        let producer = thread::spawn(move || {
            let (ack, done) = oneshot::channel();
            tx.send(Delivery {
                event: Event::Stage(StageEvent {
                    stage: Stage::Visible,
                }),
                ack: Some(ack),
            })
            .unwrap();
            done.blocking_recv().is_err()
        });

        assert!(events.recv().is_some());
        drop(events);
        assert!(producer.join().unwrap());
    }

    #[test]
    fn async_receive() {
        let (tx, rx) = flume::bounded(1);
        let events = Events::new(rx);
        tx.send(Delivery {
            event: Event::Input(InputEvent::FocusIn),
            ack: None,
        })
        .unwrap();
        drop(tx);

        let event = pollster::block_on(events.recv_async());
        assert!(matches!(event, Some(Event::Input(InputEvent::FocusIn))));
        assert!(pollster::block_on(events.recv_async()).is_none());
    }
}
