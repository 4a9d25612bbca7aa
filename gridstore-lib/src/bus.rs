//! Action bus
//!
//! A synchronous publish/subscribe channel. Each dispatched payload reaches
//! every registered listener exactly once, in registration order, before
//! `dispatch` returns. Dispatching from inside a listener is refused.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::DispatchError;

/// Handle returned by [`Dispatcher::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchToken(u64);

impl DispatchToken {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for DispatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID_{}", self.0)
    }
}

type Listener<P> = Box<dyn FnMut(&P) + Send>;

/// Synchronous, ordered, re-entrancy guarded dispatcher.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use gridstore_lib::bus::Dispatcher;
///
/// let bus = Dispatcher::<String>::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// bus.register(move |payload: &String| sink.lock().unwrap().push(payload.clone()))
///     .unwrap();
///
/// bus.dispatch(&"hello".to_string()).unwrap();
/// assert_eq!(*seen.lock().unwrap(), ["hello"]);
/// ```
pub struct Dispatcher<P> {
    listeners: Mutex<Vec<(DispatchToken, Listener<P>)>>,
    dispatching: AtomicBool,
}

impl<P> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("dispatching", &self.is_dispatching())
            .finish_non_exhaustive()
    }
}

impl<P> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Dispatcher<P> {
    /// Creates a dispatcher with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            dispatching: AtomicBool::new(false),
        }
    }

    /// Registers a listener that receives every subsequent payload.
    pub fn register<F>(&self, listener: F) -> Result<DispatchToken, DispatchError>
    where
        F: FnMut(&P) + Send + 'static,
    {
        if self.is_dispatching() {
            return Err(DispatchError::Reentrant);
        }
        let token = DispatchToken::new();
        self.lock().push((token, Box::new(listener)));
        Ok(token)
    }

    /// Removes a listener.
    pub fn unregister(&self, token: DispatchToken) -> Result<(), DispatchError> {
        if self.is_dispatching() {
            return Err(DispatchError::Reentrant);
        }
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(t, _)| *t != token);
        if listeners.len() == before {
            return Err(DispatchError::UnknownToken(token.0));
        }
        Ok(())
    }

    /// Delivers `payload` to every listener.
    ///
    /// Fails fast with [`DispatchError::Reentrant`] if a dispatch is already
    /// in progress; nothing is delivered in that case.
    pub fn dispatch(&self, payload: &P) -> Result<(), DispatchError> {
        if self.dispatching.swap(true, Ordering::SeqCst) {
            log::error!("[bus] dispatch refused: already dispatching");
            return Err(DispatchError::Reentrant);
        }
        let _guard = DispatchGuard(&self.dispatching);

        let mut listeners = self.lock();
        for (_, listener) in listeners.iter_mut() {
            listener(payload);
        }
        Ok(())
    }

    /// Returns `true` while a dispatch is in progress.
    pub fn is_dispatching(&self) -> bool {
        self.dispatching.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(DispatchToken, Listener<P>)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the dispatching flag even if a listener panics.
struct DispatchGuard<'a>(&'a AtomicBool);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_delivers_in_registration_order() {
        let bus = Dispatcher::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            bus.register(move |n: &u32| seen.lock().unwrap().push(format!("{tag}{n}")))
                .unwrap();
        }

        bus.dispatch(&1).unwrap();
        bus.dispatch(&2).unwrap();

        assert_eq!(*seen.lock().unwrap(), ["a1", "b1", "a2", "b2"]);
    }

    #[test]
    fn test_reentrant_dispatch_fails_fast() {
        let bus = Arc::new(Dispatcher::<u32>::new());
        let inner = Arc::clone(&bus);
        let result = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&result);
        bus.register(move |n: &u32| {
            if *n == 1 {
                *sink.lock().unwrap() = Some(inner.dispatch(&2));
            }
        })
        .unwrap();

        bus.dispatch(&1).unwrap();

        assert_eq!(*result.lock().unwrap(), Some(Err(DispatchError::Reentrant)));
        assert!(!bus.is_dispatching());
    }

    #[test]
    fn test_unregister() {
        let bus = Dispatcher::<u32>::new();
        let token = bus.register(|_: &u32| {}).unwrap();
        assert!(bus.unregister(token).is_ok());
        assert!(matches!(
            bus.unregister(token),
            Err(DispatchError::UnknownToken(_))
        ));
    }
}
