pub mod favorite_button;
pub mod session;
pub mod toasts;

pub use favorite_button::FavoriteButton;
pub use session::Session;
pub use toasts::{Toast, ToastKind, ToastManager};
