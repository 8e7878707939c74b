use flashcart_core::UserId;

/// The shopper a request acts for.
///
/// Resolved once per request by [`crate::middleware::user_context_middleware`];
/// handlers never look at the raw query or headers themselves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: UserId,
}

impl UserContext {
    /// Used when the request names no user.
    pub const DEFAULT_USER: UserId = UserId::new(1);

    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new(Self::DEFAULT_USER)
    }
}
