//! One-shot deferred navigation after an explosion.
//!
//! The swarm never navigates itself. On a successful activation it asks a
//! [`RedirectScheduler`] to fire after the explosion duration. The browser
//! host backs this with `setTimeout`; [`TimerQueue`] is a manual clock for
//! headless runs and tests.

use std::cell::RefCell;
use std::rc::Rc;

/// Host capability that performs a navigation once `delay_ms` has elapsed.
pub trait RedirectScheduler {
    /// `now` is the host clock at scheduling time, in milliseconds.
    fn schedule(&mut self, now: f64, delay_ms: f64, url: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingRedirect {
    pub due_at: f64,
    pub url: String,
}

#[derive(Debug, Default)]
struct Queue {
    pending: Vec<PendingRedirect>,
    fired: Vec<PendingRedirect>,
}

/// Manually advanced timer queue.
///
/// Clones share the same queue, so a test can hand one clone to the swarm and
/// keep another to inspect and advance.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    inner: Rc<RefCell<Queue>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirects scheduled but not yet fired, in scheduling order.
    pub fn pending(&self) -> Vec<PendingRedirect> {
        self.inner.borrow().pending.clone()
    }

    /// Redirects that have fired so far, in firing order.
    pub fn fired(&self) -> Vec<PendingRedirect> {
        self.inner.borrow().fired.clone()
    }

    /// Fires every redirect due at or before `now` and returns them.
    pub fn advance(&self, now: f64) -> Vec<PendingRedirect> {
        let mut queue = self.inner.borrow_mut();
        let (due, waiting): (Vec<_>, Vec<_>) = queue
            .pending
            .drain(..)
            .partition(|r| r.due_at <= now);
        queue.pending = waiting;
        queue.fired.extend(due.iter().cloned());
        due
    }
}

impl RedirectScheduler for TimerQueue {
    fn schedule(&mut self, now: f64, delay_ms: f64, url: &str) {
        self.inner.borrow_mut().pending.push(PendingRedirect {
            due_at: now + delay_ms,
            url: url.to_owned(),
        });
    }
}
