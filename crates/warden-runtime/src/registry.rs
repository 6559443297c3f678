use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::scope::CommandScope;

/// Tracks the resource scope owned by each in-flight invocation.
///
/// Keyed by message id. Insert happens before the interpreter runs so that
/// shutdown can always find and release the scope; removal is
/// first-remover-wins, which makes concurrent completion and shutdown drain
/// of the same entry safe (the loser observes `None` and does nothing).
///
/// Injectable rather than global so tests can run isolated instances.
#[derive(Default)]
pub struct InFlightRegistry {
    scopes: Mutex<HashMap<u64, Arc<dyn CommandScope>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, message_id: u64, scope: Arc<dyn CommandScope>) {
        let mut scopes = self.scopes.lock().expect("in-flight registry poisoned");
        scopes.insert(message_id, scope);
    }

    /// Removes and returns the scope for `message_id`, if still tracked.
    pub fn remove(&self, message_id: u64) -> Option<Arc<dyn CommandScope>> {
        let mut scopes = self.scopes.lock().expect("in-flight registry poisoned");
        scopes.remove(&message_id)
    }

    /// Removes every tracked scope. Used by the shutdown drain.
    pub fn drain(&self) -> Vec<(u64, Arc<dyn CommandScope>)> {
        let mut scopes = self.scopes.lock().expect("in-flight registry poisoned");
        scopes.drain().collect()
    }

    pub fn len(&self) -> usize {
        self.scopes.lock().expect("in-flight registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
