use std::sync::{Arc, Mutex, PoisonError};

use composer_core::{update, ComposerSession, ComposerView, Effect, Msg, Notice};

use crate::NoticeSink;

/// The page-level session shared by the orchestrators.
///
/// The lock is only ever held inside the closures below, never across an
/// `.await`.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<ComposerSession>>,
    notices: Arc<dyn NoticeSink>,
}

impl SharedSession {
    pub fn new(session: ComposerSession, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            notices,
        }
    }

    /// Runs a message through `update` and forwards the resulting notices.
    pub fn dispatch(&self, msg: Msg) {
        let effects = {
            let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let state = std::mem::take(&mut *guard);
            let (state, effects) = update(state, msg);
            *guard = state;
            effects
        };
        for effect in effects {
            match effect {
                Effect::Notify(notice) => self.notify(notice),
            }
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ComposerSession) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn view(&self) -> ComposerView {
        self.with(|session| session.view())
    }

    /// The current view if anything changed since the last call.
    pub fn changed_view(&self) -> Option<ComposerView> {
        self.with(|session| session.consume_dirty().then(|| session.view()))
    }

    pub fn notify(&self, notice: Notice) {
        self.notices.notify(notice);
    }
}
