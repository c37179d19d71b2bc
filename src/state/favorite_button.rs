use crate::constants::{HINT_ADD, HINT_REMOVE, MSG_INVALID_TARGET, MSG_NEEDS_AUTH};

/// What a favorite (heart) button should show for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteButton {
    /// Clicking is allowed (signed in and the id is a persisted record)
    pub enabled: bool,
    /// The service is in the cached favorites
    pub active: bool,
    /// Hover hint
    pub title: &'static str,
}

impl FavoriteButton {
    pub fn new(signed_in: bool, recognized: bool, active: bool) -> Self {
        let title = if !signed_in {
            MSG_NEEDS_AUTH
        } else if !recognized {
            MSG_INVALID_TARGET
        } else if active {
            HINT_REMOVE
        } else {
            HINT_ADD
        };

        Self {
            enabled: signed_in && recognized,
            active: active && signed_in,
            title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_button_is_disabled() {
        let button = FavoriteButton::new(false, true, true);
        assert!(!button.enabled);
        assert!(!button.active);
        assert_eq!(button.title, MSG_NEEDS_AUTH);
    }

    #[test]
    fn placeholder_service_is_disabled() {
        let button = FavoriteButton::new(true, false, false);
        assert!(!button.enabled);
        assert_eq!(button.title, MSG_INVALID_TARGET);
    }

    #[test]
    fn hint_follows_membership() {
        assert_eq!(FavoriteButton::new(true, true, false).title, HINT_ADD);
        let active = FavoriteButton::new(true, true, true);
        assert!(active.enabled && active.active);
        assert_eq!(active.title, HINT_REMOVE);
    }
}
