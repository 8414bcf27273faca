use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};

use dbreflect_core::{Error, Result};

/// A connection shared by one request at a time.
///
/// A request future dropped before [`Session::finish`] (a cancelled import
/// racing a describe, for instance) leaves an undrained TDS stream behind.
/// The connection is then marked abandoned and every later request fails
/// instead of reading the previous request's leftovers.
pub(crate) struct Exclusive<T> {
    inner: Mutex<T>,
    abandoned: AtomicBool,
}

pub(crate) struct Session<'a, T> {
    guard: MutexGuard<'a, T>,
    abandoned: &'a AtomicBool,
}

impl<T> Exclusive<T> {
    pub(crate) fn new(inner: T) -> Self {
        Self {
            inner: Mutex::new(inner),
            abandoned: AtomicBool::new(false),
        }
    }

    pub(crate) async fn lock(&self) -> Result<Session<'_, T>> {
        let guard = self.inner.lock().await;
        if self.abandoned.swap(true, Ordering::SeqCst) {
            return Err(Error::Db(
                "connection abandoned by an interrupted request; reconnect".to_string(),
            ));
        }
        Ok(Session {
            guard,
            abandoned: &self.abandoned,
        })
    }
}

impl<T> Session<'_, T> {
    /// Release the connection after the request ran to completion.
    pub(crate) fn finish<R>(self, result: R) -> R {
        self.abandoned.store(false, Ordering::SeqCst);
        result
    }
}

impl<T> Deref for Session<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for Session<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
