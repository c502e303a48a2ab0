//! Concurrent FIFO queue shared by the crawl and rank worker pools
//!
//! This module handles:
//! - Thread-safe enqueue and waiting dequeue, with or without a timeout
//! - Outstanding-work accounting for the self-feeding crawl queue
//! - Closing, which lets waiters drain what is left and then stop

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

/// Outcome of a bounded wait on the queue
#[derive(Debug, PartialEq, Eq)]
pub enum Pop<T> {
    /// An item was dequeued
    Item(T),
    /// The queue is closed and empty; no more items will ever arrive
    Closed,
    /// Nothing arrived within the timeout, but the queue is still open
    Idle,
}

/// A FIFO queue with close semantics and an outstanding-work counter
///
/// Every `push` counts one unit of outstanding work and every `task_done`
/// retires one. A queue built with [`WorkQueue::auto_close`] closes itself
/// when the count returns to zero: at that point the queue is empty and no
/// consumer is still holding an item that could produce more. This is how
/// the crawl pool knows crawling is over even though workers feed the queue
/// they consume from.
#[derive(Debug)]
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    outstanding: AtomicUsize,
    closed: AtomicBool,
    auto_close: bool,
    notify: Notify,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    /// Creates a queue that stays open until [`close`](Self::close) is called
    pub fn new() -> Self {
        Self::with_auto_close(false)
    }

    /// Creates a queue that closes once all outstanding work is done
    pub fn auto_close() -> Self {
        Self::with_auto_close(true)
    }

    fn with_auto_close(auto_close: bool) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            outstanding: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            auto_close,
            notify: Notify::new(),
        }
    }

    /// Enqueues an item
    ///
    /// Returns false (dropping the item) if the queue is already closed.
    pub fn push(&self, item: T) -> bool {
        {
            let mut items = self.lock();
            if self.is_closed() {
                return false;
            }
            items.push_back(item);
            self.outstanding.fetch_add(1, Ordering::SeqCst);
        }
        self.notify.notify_one();
        true
    }

    /// Dequeues an item without waiting
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Waits for the next item
    ///
    /// Returns None once the queue is closed and every remaining item has
    /// been handed out.
    pub async fn pop(&self) -> Option<T> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a close or push between the check
            // and the await still wakes us.
            notified.as_mut().enable();

            if let Some(item) = self.try_pop() {
                return Some(item);
            }
            if self.is_closed() {
                return None;
            }

            notified.await;
        }
    }

    /// Waits for the next item for at most `timeout`
    pub async fn pop_timeout(&self, timeout: Duration) -> Pop<T> {
        match tokio::time::timeout(timeout, self.pop()).await {
            Ok(Some(item)) => Pop::Item(item),
            Ok(None) => Pop::Closed,
            Err(_) => Pop::Idle,
        }
    }

    /// Retires one unit of outstanding work
    ///
    /// Must be called exactly once for every item taken off the queue, after
    /// any items it produced have been pushed.
    pub fn task_done(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match previous {
            Ok(1) if self.auto_close => {
                tracing::trace!("All queued work done, closing queue");
                self.close();
            }
            Ok(_) => {}
            Err(_) => tracing::warn!("task_done called with no outstanding work"),
        }
    }

    /// Closes the queue and wakes every waiter
    ///
    /// Items already queued are still handed out; new pushes are refused.
    pub fn close(&self) {
        {
            let _items = self.lock();
            self.closed.store(true, Ordering::SeqCst);
        }
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of items waiting in the queue
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Units of work pushed but not yet retired (queued plus in progress)
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> WorkQueue<T> {
    /// Copies the queued items in FIFO order, for inspection and tests
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }
}
