//! Favorites client for a service marketplace backed by a hosted backend.
//!
//! The backend owns authentication, storage and change notifications; this
//! crate keeps a signed-in user's favorited service ids cached and
//! consistent with it.

pub mod api;
pub mod config;
pub mod constants;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use api::{ChangeNotifier, FavoritesGateway};
pub use services::FavoritesManager;
