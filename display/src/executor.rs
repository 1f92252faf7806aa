//! The single thread on which display state changes.
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};

use crate::config::DisplayConfig;
use crate::error::DisplayError;

/// A unit of work deferred onto the rendering thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on the designated rendering thread.
///
/// This is the host framework's deferred-execution primitive. Tasks run one at a time, in the
/// order they were submitted.
pub trait RenderExecutor: Send + Sync {
    /// Whether the calling thread is the rendering thread.
    fn is_render_thread(&self) -> bool;

    /// Queue a task without waiting for it.
    fn invoke_later(&self, task: Task) -> Result<(), DisplayError>;
}

/// A dedicated rendering thread draining a queue of tasks.
///
/// A task that panics is logged and does not stop the thread. Dropping the last handle lets the
/// queued tasks finish and joins the thread, unless the drop happens on the thread itself.
pub struct RenderThread {
    sender: Mutex<Option<mpsc::Sender<Task>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl RenderThread {
    /// Start a rendering thread with the given name.
    pub fn spawn(name: &str) -> Result<Self, DisplayError> {
        let (sender, receiver) = mpsc::channel::<Task>();

        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                for task in receiver {
                    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                        log::error!("A task panicked on the rendering thread");
                    }
                }

                log::debug!("Rendering thread drained its queue");
            })?;

        let thread_id = handle.thread().id();
        log::info!("Rendering thread {name} started");

        Ok(RenderThread {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
            thread_id,
        })
    }

    /// Start the rendering thread described by a configuration, validating it first.
    pub fn from_config(config: &DisplayConfig) -> Result<Self, DisplayError> {
        config.validate()?;
        Self::spawn(&config.render.thread_name)
    }

    /// Run a closure on the rendering thread and wait for its result.
    ///
    /// Called on the rendering thread itself, the closure runs immediately.
    pub fn run_and_wait<R, F>(&self, f: F) -> Result<R, DisplayError>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        if self.is_render_thread() {
            return Ok(f());
        }

        let (tx, rx) = mpsc::sync_channel(1);
        self.invoke_later(Box::new(move || {
            let _ = tx.send(f());
        }))?;

        rx.recv().map_err(|_| DisplayError::RenderThreadGone)
    }

    /// Wait until every task queued so far has run.
    pub fn flush(&self) -> Result<(), DisplayError> {
        self.run_and_wait(|| ())
    }

    /// Stop accepting tasks, let queued tasks finish, and join the thread.
    pub fn shutdown(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }

        if self.is_render_thread() {
            // The thread ends on its own once its queue is empty.
            return;
        }

        let handle = match self.handle.lock() {
            Ok(mut handle) => handle.take(),
            Err(_) => None,
        };

        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Rendering thread terminated abnormally");
            }
        }
    }
}

impl RenderExecutor for RenderThread {
    fn is_render_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    fn invoke_later(&self, task: Task) -> Result<(), DisplayError> {
        let sender = self
            .sender
            .lock()
            .map_err(|_| DisplayError::RenderThreadGone)?;

        match sender.as_ref() {
            Some(sender) => sender.send(task).map_err(|_| DisplayError::RenderThreadGone),
            None => Err(DisplayError::RenderThreadGone),
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
