//! Client-side navigation seam. The pipeline redirects to the login route when a
//! session expires and logout sends the user to a landing page; embedders
//! decide what "navigate" means (a router push, a printed hint, ...).

use std::sync::{Mutex, MutexGuard, PoisonError};

pub trait Navigator: Send + Sync {
    /// Route the user is currently on.
    fn current_path(&self) -> String;

    /// Moves to `target`, a route path or an absolute URL.
    fn navigate(&self, target: &str);
}

#[derive(Debug, Default)]
struct Location {
    current: String,
    history: Vec<String>,
}

/// Navigator that only records where it was sent.
#[derive(Debug)]
pub struct MemoryNavigator {
    location: Mutex<Location>,
}

impl MemoryNavigator {
    pub fn new(start: &str) -> Self {
        Self {
            location: Mutex::new(Location {
                current: start.to_string(),
                history: Vec::new(),
            }),
        }
    }

    /// Every target passed to `navigate`, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Location> {
        self.location.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.lock().current.clone()
    }

    fn navigate(&self, target: &str) {
        let mut location = self.lock();
        location.current = target.to_string();
        location.history.push(target.to_string());
    }
}
