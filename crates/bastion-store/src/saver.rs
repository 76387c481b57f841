//! Background region saver.
//!
//! ```text
//!   mutation path                 saver thread
//!   -------------                 ------------
//!   request(snapshot) --[bounded]--> recv()
//!                                    drain queue, keep newest generation
//!   flush() ----------[bounded]-->   save_all()
//!        <------- reply ----------   answer every queued flush
//! ```
//!
//! Requests queued while a save is running are coalesced: only the newest
//! snapshot is written. Dropping the [`Saver`] closes the channel, lets
//! the thread finish what is queued, then joins it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bastion_engine::RegionSnapshot;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::database::RegionDatabase;
use crate::error::StoreError;
use crate::sync::save_snapshot;

enum Request {
    Save(Arc<RegionSnapshot>),
    Flush(Sender<Result<(), StoreError>>),
}

/// Handle to the background saver thread.
pub struct Saver {
    tx: Option<Sender<Request>>,
    handle: Option<JoinHandle<Option<StoreError>>>,
}

// Compile-time assertion: the handle is shared with mutation paths.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Saver>();
};

impl Saver {
    /// Start a saver writing to `db`. `capacity` bounds the request queue
    /// (at least 1).
    pub fn spawn(db: Arc<dyn RegionDatabase>, capacity: usize) -> Result<Self, StoreError> {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        let handle = thread::Builder::new()
            .name("bastion-saver".into())
            .spawn(move || run(db.as_ref(), &rx))
            .map_err(|source| StoreError::Spawn { source })?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queue a snapshot for saving. Blocks only while the queue is full.
    pub fn request(&self, snapshot: Arc<RegionSnapshot>) -> Result<(), StoreError> {
        self.send(Request::Save(snapshot))
    }

    /// Block until every snapshot requested so far has been written.
    ///
    /// Returns the first save error since the previous flush, if any.
    pub fn flush(&self) -> Result<(), StoreError> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.send(Request::Flush(reply_tx))?;
        reply_rx.recv().map_err(|_| StoreError::SaverStopped)?
    }

    /// Finish queued saves and stop the thread.
    ///
    /// Returns a save error that no flush has reported yet.
    pub fn shutdown(mut self) -> Result<(), StoreError> {
        self.stop()
    }

    fn send(&self, request: Request) -> Result<(), StoreError> {
        let tx = self.tx.as_ref().ok_or(StoreError::SaverStopped)?;
        tx.send(request).map_err(|_| StoreError::SaverStopped)
    }

    fn stop(&mut self) -> Result<(), StoreError> {
        drop(self.tx.take());
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(None) => Ok(()),
            Ok(Some(e)) => Err(e),
            Err(_) => {
                warn!("saver thread panicked");
                Err(StoreError::SaverStopped)
            }
        }
    }
}

impl Drop for Saver {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "unreported save failure at saver shutdown");
        }
    }
}

impl std::fmt::Debug for Saver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Saver")
            .field("running", &self.tx.is_some())
            .finish()
    }
}

fn run(db: &dyn RegionDatabase, rx: &Receiver<Request>) -> Option<StoreError> {
    let mut pending_error: Option<StoreError> = None;
    while let Ok(first) = rx.recv() {
        let mut newest: Option<Arc<RegionSnapshot>> = None;
        let mut waiters = Vec::new();
        for request in std::iter::once(first).chain(rx.try_iter()) {
            match request {
                Request::Save(snapshot) => {
                    let newer = newest
                        .as_ref()
                        .is_none_or(|n| snapshot.generation() >= n.generation());
                    if newer {
                        newest = Some(snapshot);
                    }
                }
                Request::Flush(reply) => waiters.push(reply),
            }
        }

        if let Some(snapshot) = newest {
            match save_snapshot(db, &snapshot) {
                Ok(count) => debug!(
                    store = db.name(),
                    generation = snapshot.generation(),
                    count,
                    "background save complete"
                ),
                Err(e) => {
                    warn!(store = db.name(), error = %e, "background save failed");
                    pending_error.get_or_insert(e);
                }
            }
        }

        for reply in waiters {
            let result = pending_error.take().map_or(Ok(()), Err);
            // A waiter that gave up is not an error.
            let _ = reply.send(result);
        }
    }
    pending_error
}
