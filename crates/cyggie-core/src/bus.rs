use crossbeam_channel::{unbounded, Receiver, Sender, TryIter};

/// One-way app-event channel from services to the host.
///
/// A service announces through `ServiceCtx::bus()` during a hook; the host
/// collects with `drain` between ticks. The event type is application-defined
/// and the manager never looks inside it.
pub struct Bus<E: Send + 'static> {
    tx: Sender<E>,
    rx: Receiver<E>,
}

impl<E: Send + 'static> Bus<E> {
    #[inline]
    pub fn new(tx: Sender<E>, rx: Receiver<E>) -> Self {
        Self { tx, rx }
    }

    #[inline]
    pub fn unbounded() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Clone of the sending half, for host code that injects events from
    /// outside a service hook (input adapters, ctrl-c handlers, ...).
    #[inline]
    pub fn sender(&self) -> Sender<E> {
        self.tx.clone()
    }

    /// Fire-and-forget announcement. Dropped silently if the host side is
    /// gone; use `try_publish` when delivery matters.
    #[inline]
    pub fn publish(&self, ev: E) {
        let _ = self.tx.send(ev);
    }

    /// Announcement the caller wants confirmed: `true` when the channel
    /// accepted the event.
    #[inline]
    pub fn try_publish(&self, ev: E) -> bool {
        self.tx.try_send(ev).is_ok()
    }

    /// Next pending event, if any. Never blocks a hook.
    #[inline]
    pub fn try_recv(&self) -> Option<E> {
        self.rx.try_recv().ok()
    }

    /// Everything currently queued, as an iterator. Stops at the events
    /// present when iteration reaches them; it does not wait for more.
    #[inline]
    pub fn drain(&self) -> TryIter<'_, E> {
        self.rx.try_iter()
    }

    /// Queued event count on the host side.
    #[inline]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
