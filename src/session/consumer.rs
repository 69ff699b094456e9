//! Consume worker
//!
//! Instantiating a consumer can wait on the server: the engine may raise
//! `connect_needed` and block until `Connected` arrives on the control
//! channel. The receive transport therefore lives in its own task, off the
//! client's event loop:
//!
//! ```text
//!   Client ── submit(batch) ──► [worker: transport.consume() per descriptor]
//!     ▲                                       │
//!     └────────── Consumed { generation } ────┘
//! ```
//!
//! Batches are processed strictly in submission order, one descriptor at a
//! time. Dropping the worker aborts the task and drops the transport.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::engine::{Consumer, ReceiveTransport};
use crate::error::{Error, Result};
use crate::protocol::ConsumeDescriptor;

/// Outcome of consuming one descriptor
#[derive(Debug)]
pub(crate) struct Consumed<T> {
    /// Session generation the transport was built for
    pub generation: u64,
    pub descriptor: ConsumeDescriptor,
    pub result: Result<Consumer<T>>,
}

/// Handle to the task owning a session's receive transport
#[derive(Debug)]
pub struct ConsumeWorker {
    batches: mpsc::UnboundedSender<Vec<ConsumeDescriptor>>,
    task: JoinHandle<()>,
}

impl ConsumeWorker {
    /// Move `transport` into a new worker task
    pub(crate) fn start<X: ReceiveTransport>(
        generation: u64,
        mut transport: X,
        results: mpsc::UnboundedSender<Consumed<X::Track>>,
    ) -> Self {
        let (batches, mut rx) = mpsc::unbounded_channel::<Vec<ConsumeDescriptor>>();

        let task = tokio::spawn(async move {
            while let Some(batch) = rx.recv().await {
                for descriptor in batch {
                    let result = transport.consume(&descriptor).await;
                    let consumed = Consumed {
                        generation,
                        descriptor,
                        result,
                    };
                    if results.send(consumed).is_err() {
                        return;
                    }
                }
            }
        });

        Self { batches, task }
    }

    /// Queue a `Consuming` batch
    pub fn submit(&self, batch: Vec<ConsumeDescriptor>) -> Result<()> {
        self.batches.send(batch).map_err(|_| Error::ChannelClosed)
    }
}

impl Drop for ConsumeWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
