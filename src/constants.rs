//! Application constants and configuration values

// === Backend Tables ===
pub const FAVORITES_TABLE: &str = "favorites";
pub const SERVICES_TABLE: &str = "services";

// === Backend Endpoints ===
pub const REST_PATH: &str = "/rest/v1";
pub const AUTH_USER_PATH: &str = "/auth/v1/user";

// === Toasts ===
pub const TOAST_QUEUE_LIMIT: usize = 5;

// === User-facing Messages ===
pub const MSG_NEEDS_AUTH: &str = "Sign in to favorite services";
pub const MSG_INVALID_TARGET: &str = "Favorites are only available for published services";
pub const MSG_ADDED: &str = "Added to favorites";
pub const MSG_REMOVED: &str = "Removed from favorites";
pub const MSG_UPDATE_FAILED: &str = "Could not update favorite";
pub const MSG_WATCH_FAILED: &str = "Could not subscribe to favorite updates";
pub const MSG_LOAD_FAILED: &str = "Could not load favorites";

// === Favorite Button Hints ===
pub const HINT_ADD: &str = "Add to favorites";
pub const HINT_REMOVE: &str = "Remove from favorites";
