/// Services module - business logic layer
///
/// Services hold the client-side state that sits between the backend
/// gateway and whatever renders it, keeping the rendering layer thin.

pub mod favorites;

// Re-export commonly used types
pub use favorites::{FavoritesManager, LoadState, ToggleResult};
