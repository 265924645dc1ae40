use std::cell::Cell;
use std::rc::Rc;

use crate::ports::worker::ExtendableEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// The operation was handed to the event and has not finished.
    Extended,
    /// The operation finished; the platform may reclaim the worker.
    Settled,
}

/// Observer for an event whose lifetime was extended.
#[derive(Debug, Clone)]
pub struct InFlight {
    phase: Rc<Cell<EventPhase>>,
}

impl InFlight {
    pub fn phase(&self) -> EventPhase {
        self.phase.get()
    }

    pub fn is_settled(&self) -> bool {
        self.phase.get() == EventPhase::Settled
    }
}

pub(crate) fn extend<E, F>(event: &E, work: F) -> InFlight
where
    E: ExtendableEvent + ?Sized,
    F: Future<Output = ()> + 'static,
{
    let phase = Rc::new(Cell::new(EventPhase::Extended));
    let tracked = Rc::clone(&phase);
    event.wait_until(Box::pin(async move {
        work.await;
        tracked.set(EventPhase::Settled);
    }));
    InFlight { phase }
}
