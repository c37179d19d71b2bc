use crate::constants::TOAST_QUEUE_LIMIT;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

/// Transient notification shown to the user
#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// Bounded queue of transient notifications
///
/// Toasts live until the renderer drains them; the oldest are dropped first
/// when the queue is full.
#[derive(Default)]
pub struct ToastManager {
    pub toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_success(&mut self, message: &str) {
        self.push(ToastKind::Success, message);
    }

    pub fn show_info(&mut self, message: &str) {
        self.push(ToastKind::Info, message);
    }

    pub fn show_error(&mut self, message: &str) {
        self.push(ToastKind::Error, message);
    }

    fn push(&mut self, kind: ToastKind, message: &str) {
        if self.toasts.len() >= TOAST_QUEUE_LIMIT {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            kind,
            message: message.to_string(),
        });
    }

    /// Hand every pending toast to the caller (headless rendering)
    pub fn drain(&mut self) -> Vec<Toast> {
        self.toasts.drain(..).collect()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
