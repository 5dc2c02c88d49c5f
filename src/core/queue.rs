//! Thread-safe command queue
//!
//! This module provides the `CommandQueue` struct, the unbounded FIFO between
//! the single producer (the input loop) and the worker pool.
//!
//! # Design
//!
//! One `parking_lot::Mutex` guards both the pending commands and the
//! "accepting" flag, and one `Condvar` wakes idle workers. Keeping the flag
//! under the same lock as the items means a worker can never observe "closed"
//! without also observing every command enqueued before the close.
//!
//! # Shutdown
//!
//! `close()` stops new work. Consumers keep receiving commands until the
//! queue is empty; only then does [`CommandQueue::dequeue`] return `None`.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::types::{Command, LedgerError};

#[derive(Debug)]
struct QueueState {
    items: VecDeque<Command>,
    accepting: bool,
}

/// Unbounded multi-consumer FIFO of pending commands
#[derive(Debug)]
pub struct CommandQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl CommandQueue {
    /// Create an empty queue that accepts work
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                accepting: true,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a command to the tail and wake one waiting worker
    ///
    /// Never blocks on worker availability; the queue grows instead.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::QueueClosed` once [`close`](Self::close) has been
    /// called. The command is dropped in that case.
    pub fn enqueue(&self, command: Command) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        if !state.accepting {
            return Err(LedgerError::QueueClosed);
        }
        state.items.push_back(command);
        drop(state);

        self.available.notify_one();
        Ok(())
    }

    /// Remove the head without waiting
    ///
    /// Returns `None` if the queue is currently empty, whether or not it is
    /// still accepting work.
    pub fn try_dequeue(&self) -> Option<Command> {
        self.state.lock().items.pop_front()
    }

    /// Remove the head, waiting while the queue is empty but still open
    ///
    /// Returns `None` only when the queue is closed and fully drained.
    pub fn dequeue(&self) -> Option<Command> {
        let mut state = self.state.lock();
        loop {
            if let Some(command) = state.items.pop_front() {
                return Some(command);
            }
            if !state.accepting {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Stop accepting commands and wake every waiting worker
    ///
    /// Commands already queued stay queued and are still handed out.
    pub fn close(&self) {
        self.state.lock().accepting = false;
        self.available.notify_all();
    }

    pub fn is_accepting(&self) -> bool {
        self.state.lock().accepting
    }

    /// Number of commands waiting for a worker
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
