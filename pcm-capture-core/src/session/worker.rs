use std::sync::mpsc;
use std::thread;

use crate::models::error::CaptureError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A single background thread draining an unbounded FIFO of jobs.
///
/// Jobs run strictly in the order they were posted. Dropping the worker
/// runs whatever is still queued, then joins the thread.
pub struct SerialWorker {
    sender: Option<mpsc::Sender<Job>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SerialWorker {
    pub fn spawn(name: &str) -> Result<Self, CaptureError> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                for job in receiver {
                    job();
                }
            })
            .map_err(|e| CaptureError::ConfigurationFailed(format!("failed to spawn {} thread: {}", name, e)))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queue `job`. Returns `false` if the worker thread is gone.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> bool {
        match &self.sender {
            Some(sender) => sender.send(Box::new(job)).is_ok(),
            None => false,
        }
    }

    /// Block until every job posted before this call has run.
    pub fn wait_idle(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        if self.post(move || {
            let _ = done_tx.send(());
        }) {
            let _ = done_rx.recv();
        }
    }
}

impl Drop for SerialWorker {
    fn drop(&mut self) {
        // Closing the channel ends the receive loop once the queue is drained.
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Serial worker thread panicked");
            }
        }
    }
}
