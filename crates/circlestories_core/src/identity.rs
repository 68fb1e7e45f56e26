//! Seam to the external identity provider.
//!
//! The core only needs to know who is asking. Credentials, sessions and
//! user records live entirely outside this crate.

use crate::model::user::UserId;

/// Resolves the user behind the current request, if any.
pub trait IdentityProvider {
    fn resolve_current_user(&self) -> Option<UserId>;
}

/// Identity fixed at construction time; used by the CLI and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity(Option<UserId>);

impl StaticIdentity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(user: UserId) -> Self {
        Self(Some(user))
    }
}

impl IdentityProvider for StaticIdentity {
    fn resolve_current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}

impl<F> IdentityProvider for F
where
    F: Fn() -> Option<UserId>,
{
    fn resolve_current_user(&self) -> Option<UserId> {
        self()
    }
}
