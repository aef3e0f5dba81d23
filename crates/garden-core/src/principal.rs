//! Owner identity carried through every core operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The resolved principal (user identity) a request acts as.
///
/// Every gateway and service call takes a `Principal` instead of a bare
/// `Uuid`, so an operation that forgets owner scoping fails to compile
/// rather than leaking across tenants. Constructed once at the boundary
/// after authentication resolves the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(Uuid);

impl Principal {
    /// Bind a resolved user id as the acting principal.
    pub fn new(user_id: Uuid) -> Self {
        Self(user_id)
    }

    /// The underlying user id, for query binding.
    pub fn user_id(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Principal> for Uuid {
    fn from(p: Principal) -> Self {
        p.0
    }
}
