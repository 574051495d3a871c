//! crates/manager/src/worker.rs
//! Delivery thread for deferred records.
//!
//! Consumes [`Message`] items from an unbounded channel and forwards each
//! record to the registry on a dedicated [`std::thread`], so callers never
//! block on destination I/O for deferred severities.
//!
//! # Thread Protocol
//!
//! ```text
//! Caller thread                      Delivery thread
//! ─────────────                      ───────────────
//! Record(r)    ─────────────────▶    forward to registry
//! ...          ─────────────────▶    (queue empty) flush destinations
//! Barrier(ack) ─────────────────▶    flush
//!              ◀─────────────────    ack
//! Shutdown     ─────────────────▶    flush, exit
//! ```
//!
//! Messages are handled in enqueue order, so a `Shutdown` terminates the
//! thread only after every record sent before it has been delivered.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use logging::LogRecord;

use crate::shared::Shared;

/// Name given to the delivery thread.
pub(crate) const THREAD_NAME: &str = "midilog-delivery";

pub(crate) enum Message {
    Record(Box<LogRecord>),
    /// Flush and acknowledge once every earlier message is handled.
    Barrier(Sender<()>),
    Shutdown,
}

/// Totals reported by the delivery thread when it exits.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct WorkerSummary {
    pub(crate) delivered: u64,
    pub(crate) failed: u64,
}

/// Sending half of the delivery channel.
#[derive(Clone, Debug)]
pub(crate) struct DeliveryQueue {
    tx: Sender<Message>,
}

impl DeliveryQueue {
    /// Queues `record`; hands it back if the thread is gone.
    pub(crate) fn send(&self, record: LogRecord) -> Result<(), LogRecord> {
        self.tx
            .send(Message::Record(Box::new(record)))
            .map_err(|error| match error.into_inner() {
                Message::Record(record) => *record,
                Message::Barrier(_) | Message::Shutdown => unreachable!("sent a record"),
            })
    }

    /// Blocks until every record queued so far has been delivered and flushed.
    pub(crate) fn barrier(&self) {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(Message::Barrier(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

#[derive(Debug)]
pub(crate) struct DeliveryWorker {
    queue: DeliveryQueue,
    join_handle: JoinHandle<WorkerSummary>,
}

impl DeliveryWorker {
    pub(crate) fn spawn(shared: Arc<Shared>) -> io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let join_handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || delivery_main(&rx, &shared))?;
        Ok(Self {
            queue: DeliveryQueue { tx },
            join_handle,
        })
    }

    pub(crate) const fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    /// Drains the queue and joins the thread.
    pub(crate) fn shutdown(self) -> WorkerSummary {
        let _ = self.queue.tx.send(Message::Shutdown);
        match self.join_handle.join() {
            Ok(summary) => summary,
            Err(_) => {
                tracing::warn!(thread = THREAD_NAME, "delivery worker panicked");
                WorkerSummary::default()
            }
        }
    }
}

/// Main loop of the delivery thread.
///
/// Destinations are flushed whenever the queue runs empty, so bursts are
/// written in one go and nothing lingers in buffers while the caller is quiet.
fn delivery_main(rx: &Receiver<Message>, shared: &Shared) -> WorkerSummary {
    let mut summary = WorkerSummary::default();
    let mut dirty = false;

    loop {
        let message = match rx.try_recv() {
            Ok(message) => message,
            Err(TryRecvError::Empty) => {
                if dirty {
                    shared.flush();
                    dirty = false;
                }
                match rx.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                }
            }
            Err(TryRecvError::Disconnected) => break,
        };

        match message {
            Message::Record(record) => {
                summary.delivered += 1;
                summary.failed += shared.deliver_deferred(&record) as u64;
                dirty = true;
            }
            Message::Barrier(ack) => {
                if dirty {
                    shared.flush();
                    dirty = false;
                }
                let _ = ack.send(());
            }
            Message::Shutdown => break,
        }
    }

    if dirty {
        shared.flush();
    }
    summary
}
