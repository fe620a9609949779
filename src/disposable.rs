use std::fmt;

use log::debug;

/// A host resource that must be released exactly once
pub trait Disposable {
    fn dispose(&mut self);
}

/// Named handle returned by a host registration call
pub struct Registration {
    name: String,
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl Registration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cleanup: None,
        }
    }

    pub fn with_cleanup(name: impl Into<String>, cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            name: name.into(),
            cleanup: Some(Box::new(cleanup)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("pending_cleanup", &self.cleanup.is_some())
            .finish()
    }
}

impl Disposable for Registration {
    fn dispose(&mut self) {
        debug!("releasing {}", self.name);
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

/// Scoped list of registrations, released newest first.
///
/// Anything still held is released on drop.
#[derive(Default)]
pub struct Subscriptions {
    items: Vec<Box<dyn Disposable>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: impl Disposable + 'static) {
        self.items.push(Box::new(item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn dispose_all(&mut self) {
        while let Some(mut item) = self.items.pop() {
            item.dispose();
        }
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("len", &self.items.len())
            .finish()
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
