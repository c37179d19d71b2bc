// Data models for marketplace backend entities

pub mod favorite;
pub mod service;
pub mod user;

// Re-export commonly used types
pub use favorite::{Favorite, FavoriteRow};
pub use service::{Service, ServiceId};
pub use user::UserId;
