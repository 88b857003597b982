//! Pattern registry
//!
//! Maps address patterns to the listeners bound to them. Several patterns
//! may match one address; every listener of every matching pattern is
//! visited.

use oscline_core::{OscAddress, OscMessage};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::BindError;

/// Receives messages whose address matches a bound pattern
pub trait OscListener: Send + Sync {
    fn on_message(&self, pattern: &OscAddress, message: &OscMessage);
}

impl<F> OscListener for F
where
    F: Fn(&OscAddress, &OscMessage) + Send + Sync,
{
    fn on_message(&self, pattern: &OscAddress, message: &OscMessage) {
        self(pattern, message)
    }
}

/// Shared listener handle. Two handles are the same listener when they point
/// at the same allocation.
pub type ListenerHandle = Arc<dyn OscListener>;

/// Wrap a closure as a listener handle
pub fn listener<F>(f: F) -> ListenerHandle
where
    F: Fn(&OscAddress, &OscMessage) + Send + Sync + 'static,
{
    Arc::new(f)
}

#[inline]
fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Pattern to listener bindings
#[derive(Default)]
pub struct PatternRegistry {
    bindings: HashMap<OscAddress, Vec<ListenerHandle>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `listener` to `pattern`.
    ///
    /// Binding the same pair twice is a no-op.
    pub fn bind(&mut self, pattern: OscAddress, listener: ListenerHandle) -> Result<(), BindError> {
        if !pattern.is_valid_pattern() {
            return Err(BindError::InvalidPattern(pattern));
        }

        let listeners = self.bindings.entry(pattern).or_default();
        if !listeners.iter().any(|l| same_listener(l, &listener)) {
            listeners.push(listener);
        }
        Ok(())
    }

    /// Remove one binding. Returns whether it existed.
    pub fn unbind(&mut self, pattern: &OscAddress, listener: &ListenerHandle) -> bool {
        let Some(listeners) = self.bindings.get_mut(pattern) else {
            return false;
        };

        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        let removed = listeners.len() != before;

        if listeners.is_empty() {
            self.bindings.remove(pattern);
        }
        removed
    }

    /// Remove every listener bound to `pattern`, returning how many there were
    pub fn unbind_all(&mut self, pattern: &OscAddress) -> usize {
        self.bindings.remove(pattern).map_or(0, |l| l.len())
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Number of distinct patterns with at least one listener
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of listeners bound to `pattern`
    pub fn listener_count(&self, pattern: &OscAddress) -> usize {
        self.bindings.get(pattern).map_or(0, Vec::len)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &OscAddress> {
        self.bindings.keys()
    }

    /// Call `f` for every (pattern, listener) pair whose pattern matches
    /// `address`. Returns the number of calls.
    pub fn for_each_match<F>(&self, address: &OscAddress, mut f: F) -> usize
    where
        F: FnMut(&OscAddress, &ListenerHandle),
    {
        let mut calls = 0;
        for (pattern, listeners) in &self.bindings {
            if !pattern.matches(address) {
                continue;
            }
            for l in listeners {
                f(pattern, l);
                calls += 1;
            }
        }
        calls
    }
}

impl std::fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|(p, l)| (p.path(), l.len())))
            .finish()
    }
}
