//! One-shot completion channel between a task and its submitter.
//!
//! Built on a `crossbeam_channel::bounded(1)` pair. [`Reply::publish`]
//! consumes the reply, so a task can report at most once; dropping it
//! unpublished disconnects the channel, which the waiting side sees as
//! [`CompletionError::Abandoned`].

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::error::{CompletionError, TaskError};

/// Worker-side half: publishes the task's result.
pub struct Reply<R> {
    tx: Sender<Result<R, TaskError>>,
}

/// Submitter-side half: receives the task's result.
pub struct Completion<R> {
    rx: Receiver<Result<R, TaskError>>,
}

/// Create a connected reply/completion pair.
pub fn pair<R>() -> (Reply<R>, Completion<R>) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (Reply { tx }, Completion { rx })
}

impl<R> Reply<R> {
    /// Deliver the result. Never blocks: the channel has one slot and this
    /// is the only send. A submitter that already dropped its
    /// [`Completion`] is ignored.
    pub fn publish(self, result: Result<R, TaskError>) {
        let _ = self.tx.send(result);
    }
}

impl<R> Completion<R> {
    /// Block until the task completes.
    pub fn wait(self) -> Result<R, CompletionError> {
        match self.rx.recv() {
            Ok(result) => result.map_err(CompletionError::Failed),
            Err(_) => Err(CompletionError::Abandoned),
        }
    }

    /// Block for at most `timeout`. `Ok(None)` means still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<R>, CompletionError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result.map(Some).map_err(CompletionError::Failed),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(CompletionError::Abandoned),
        }
    }

    /// Check for a result without blocking. `Ok(None)` means still pending.
    ///
    /// Once a result has been taken, later calls report
    /// [`CompletionError::Abandoned`].
    pub fn try_wait(&self) -> Result<Option<R>, CompletionError> {
        match self.rx.try_recv() {
            Ok(result) => result.map(Some).map_err(CompletionError::Failed),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(CompletionError::Abandoned),
        }
    }
}

impl<R> std::fmt::Debug for Reply<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Reply")
    }
}

impl<R> std::fmt::Debug for Completion<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("ready", &!self.rx.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn published_value_is_received() {
        let (reply, done) = pair::<i64>();
        reply.publish(Ok(100));
        assert_eq!(done.wait(), Ok(100));
    }

    #[test]
    fn published_error_is_failed() {
        let (reply, done) = pair::<i64>();
        reply.publish(Err(TaskError::NonFinite { field: "total" }));
        assert_eq!(
            done.wait(),
            Err(CompletionError::Failed(TaskError::NonFinite { field: "total" }))
        );
    }

    #[test]
    fn dropped_reply_is_abandoned() {
        let (reply, done) = pair::<i64>();
        drop(reply);
        assert_eq!(done.wait(), Err(CompletionError::Abandoned));
    }

    #[test]
    fn try_wait_reports_pending_then_ready() {
        let (reply, done) = pair::<u8>();
        assert_eq!(done.try_wait(), Ok(None));
        reply.publish(Ok(3));
        assert_eq!(done.try_wait(), Ok(Some(3)));
        assert_eq!(done.try_wait(), Err(CompletionError::Abandoned));
    }

    #[test]
    fn wait_timeout_expires_while_pending() {
        let (reply, done) = pair::<u8>();
        assert_eq!(done.wait_timeout(Duration::from_millis(5)), Ok(None));
        let h = thread::spawn(move || reply.publish(Ok(9)));
        assert_eq!(done.wait_timeout(Duration::from_secs(5)), Ok(Some(9)));
        h.join().unwrap();
    }

    #[test]
    fn publish_after_completion_dropped_is_silent() {
        let (reply, done) = pair::<u8>();
        drop(done);
        reply.publish(Ok(1));
    }
}
