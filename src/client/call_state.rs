//! Observable state for a single logical API call
//!
//! A [`CallState`] is owned by one call site and tracks the familiar
//! data/loading/error triple across triggers. Completions carry a
//! generation token: a trigger that has been superseded by a newer trigger
//! or by [`CallState::reset`] cannot overwrite the newer state when it
//! eventually finishes.

use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Point-in-time view of a call's state
#[derive(Debug, Clone, PartialEq)]
pub struct CallSnapshot<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for CallSnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

struct CallInner<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

/// Shared data/loading/error container around an async operation
pub struct CallState<T> {
    inner: Arc<Mutex<CallInner<T>>>,
}

impl<T> Clone for CallState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for CallState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CallState<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CallInner {
                data: None,
                loading: false,
                error: None,
                generation: 0,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CallInner<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Restore the initial state unconditionally.
    ///
    /// An operation still in flight is not cancelled, but its completion
    /// carries a stale generation and will not resurrect the old state.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.data = None;
        inner.loading = false;
        inner.error = None;
    }
}

impl<T: Clone> CallState<T> {
    pub fn data(&self) -> Option<T> {
        self.lock().data.clone()
    }

    pub fn snapshot(&self) -> CallSnapshot<T> {
        let inner = self.lock();
        CallSnapshot {
            data: inner.data.clone(),
            loading: inner.loading,
            error: inner.error.clone(),
        }
    }

    /// Run one operation, capturing its outcome into the state.
    ///
    /// While the operation is outstanding `loading` is true and `error` is
    /// cleared. Success stores the value; failure stores the extracted
    /// message and leaves `data` as it was. The error is captured, never
    /// re-thrown: callers needing to react to failure read `error`.
    ///
    /// If a newer trigger (or a reset) has taken over by the time the
    /// operation finishes, the completion is discarded.
    pub async fn trigger<Fut>(&self, operation: Fut) -> Option<T>
    where
        Fut: std::future::Future<Output = Result<T>>,
    {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.loading = true;
            inner.error = None;
            inner.generation
        };

        match operation.await {
            Ok(value) => {
                let mut inner = self.lock();
                if inner.generation == generation {
                    inner.data = Some(value.clone());
                    inner.loading = false;
                }
                Some(value)
            }
            Err(err) => {
                let message = err.user_message();
                log::warn!("api call failed: {}", message);

                let mut inner = self.lock();
                if inner.generation == generation {
                    inner.error = Some(message);
                    inner.loading = false;
                }
                None
            }
        }
    }
}

impl<T: Clone + Send + 'static> CallState<T> {
    /// Construct a state and fire `operation` exactly once immediately.
    pub fn eager<Fut>(operation: Fut) -> Self
    where
        Fut: std::future::Future<Output = Result<T>> + Send + 'static,
    {
        let state = Self::new();
        let handle = state.clone();
        tokio::spawn(async move {
            handle.trigger(operation).await;
        });
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, Error};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_initial_state() {
        let state: CallState<u32> = CallState::new();
        let snap = state.snapshot();

        assert_eq!(snap.data, None);
        assert!(!snap.loading);
        assert_eq!(snap.error, None);
    }

    #[tokio::test]
    async fn test_trigger_success_sets_data() {
        let state: CallState<u32> = CallState::new();

        let returned = state.trigger(async { Ok(42) }).await;

        assert_eq!(returned, Some(42));
        let snap = state.snapshot();
        assert_eq!(snap.data, Some(42));
        assert!(!snap.loading);
        assert_eq!(snap.error, None);
    }

    #[tokio::test]
    async fn test_trigger_failure_keeps_prior_data() {
        let state: CallState<u32> = CallState::new();
        state.trigger(async { Ok(1) }).await;

        let returned = state
            .trigger(async { Err(Error::Api(ApiError::ServerError("falló".to_string()))) })
            .await;

        // Error captured, not propagated; stale data retained for display
        assert_eq!(returned, None);
        let snap = state.snapshot();
        assert_eq!(snap.data, Some(1));
        assert!(!snap.loading);
        assert_eq!(snap.error.as_deref(), Some("falló"));
    }

    #[tokio::test]
    async fn test_loading_during_flight() {
        let state: CallState<u32> = CallState::new();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .trigger(async {
                        rx.await.ok();
                        Ok(7)
                    })
                    .await
            })
        };

        // Wait until the trigger has marked itself loading
        while !state.loading() {
            tokio::task::yield_now().await;
        }
        assert!(state.error().is_none());

        tx.send(()).ok();
        handle.await.unwrap();
        assert!(!state.loading());
        assert_eq!(state.data(), Some(7));
    }

    #[tokio::test]
    async fn test_reset_restores_initial() {
        let state: CallState<u32> = CallState::new();
        state.trigger(async { Ok(5) }).await;
        state
            .trigger(async { Err(Error::Other("x".to_string())) })
            .await;

        state.reset();

        assert_eq!(state.snapshot(), CallSnapshot::default());
    }

    #[tokio::test]
    async fn test_stale_completion_after_reset_ignored() {
        let state: CallState<u32> = CallState::new();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .trigger(async {
                        rx.await.ok();
                        Ok(99)
                    })
                    .await
            })
        };

        while !state.loading() {
            tokio::task::yield_now().await;
        }

        state.reset();
        tx.send(()).ok();
        let returned = handle.await.unwrap();

        // The operation itself still yields its value to its caller,
        // but the shared state stays reset
        assert_eq!(returned, Some(99));
        assert_eq!(state.snapshot(), CallSnapshot::default());
    }

    #[tokio::test]
    async fn test_superseded_trigger_loses_to_newer() {
        let state: CallState<&'static str> = CallState::new();
        let (tx_old, rx_old) = oneshot::channel::<()>();

        let old = {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .trigger(async {
                        rx_old.await.ok();
                        Ok("old")
                    })
                    .await
            })
        };

        while !state.loading() {
            tokio::task::yield_now().await;
        }

        // Newer trigger completes first
        state.trigger(async { Ok("new") }).await;
        assert_eq!(state.data(), Some("new"));

        // Old trigger resolving late must not overwrite
        tx_old.send(()).ok();
        old.await.unwrap();
        assert_eq!(state.data(), Some("new"));
        assert!(!state.loading());
    }

    #[tokio::test]
    async fn test_eager_fires_once_on_creation() {
        let state = CallState::eager(async { Ok(11u32) });

        // Spawned trigger runs on the same runtime; give it a beat
        for _ in 0..100 {
            if state.data().is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(state.data(), Some(11));
        assert!(!state.loading());
    }
}
