use tokio::task::JoinHandle;

/// In-flight service requests. The kernel decides what to cancel,
/// this registry holds the tokio handles that make it happen.
///
/// The startup dialog listing is kept apart: it outlives conversation
/// cycles and is only replaced by the next startup or dropped on detach.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    in_flight: Vec<JoinHandle<()>>,
    listing: Option<JoinHandle<()>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.in_flight.retain(|task| !task.is_finished());
        self.in_flight.push(handle);
    }

    /// Replaces the startup listing, aborting a previous one still running.
    pub fn track_listing(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.listing.replace(handle) {
            previous.abort();
        }
    }

    /// Aborts ask and converse requests. The listing is untouched.
    /// Returns how many live tasks were aborted.
    pub fn abort_all(&mut self) -> usize {
        let mut aborted = 0;
        for task in self.in_flight.drain(..) {
            if !task.is_finished() {
                task.abort();
                aborted += 1;
            }
        }
        aborted
    }

    /// Aborts everything, listing included.
    pub fn shutdown(&mut self) -> usize {
        let mut aborted = self.abort_all();
        if let Some(listing) = self.listing.take() {
            if !listing.is_finished() {
                listing.abort();
                aborted += 1;
            }
        }
        aborted
    }

    pub fn active(&self) -> usize {
        self.in_flight.iter().filter(|task| !task.is_finished()).count()
    }

    pub fn listing_active(&self) -> bool {
        self.listing.as_ref().is_some_and(|task| !task.is_finished())
    }
}
