//! Owning LIFO of windows
//!
//! Only the head is live; every window below it is suspended with its state
//! frozen until it becomes the head again.

use heapless::Vec;
use log::debug;
use thiserror_no_std::Error;

use super::{Window, WindowWrapper};
use crate::config::MAX_WINDOW_DEPTH;

/// Identity of a pushed window, unique for the lifetime of the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(u32);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStackError {
    #[error("window stack is full")]
    Full,
}

pub struct WindowStack<const N: usize = MAX_WINDOW_DEPTH> {
    entries: Vec<(WindowId, WindowWrapper), N>,
    next_id: u32,
}

impl<const N: usize> WindowStack<N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Push a window on top; the previous head is suspended beneath it.
    ///
    /// When the stack is full the window is dropped and `Full` is returned.
    pub fn push(&mut self, window: WindowWrapper) -> Result<WindowId, WindowStackError> {
        let id = WindowId(self.next_id);
        debug!("Pushing window {} as {:?}", window.title(), id);
        if self.entries.push((id, window)).is_err() {
            return Err(WindowStackError::Full);
        }
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    /// Pop the head, but only when it is the window identified by `id`.
    ///
    /// Any other id leaves the stack untouched.
    pub fn pop_specific(&mut self, id: WindowId) -> bool {
        match self.entries.last() {
            Some((head, _)) if *head == id => {
                self.entries.pop();
                debug!("Popped window {:?} (depth {})", id, self.entries.len());
                true
            }
            _ => false,
        }
    }

    /// Drop every window, head first.
    pub fn teardown(&mut self) {
        while self.entries.pop().is_some() {}
    }

    pub fn peek(&self) -> Option<&WindowWrapper> {
        self.entries.last().map(|(_, window)| window)
    }

    pub fn peek_mut(&mut self) -> Option<&mut WindowWrapper> {
        self.entries.last_mut().map(|(_, window)| window)
    }

    pub fn head_id(&self) -> Option<WindowId> {
        self.entries.last().map(|(id, _)| *id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> Default for WindowStack<N> {
    fn default() -> Self {
        Self::new()
    }
}
