//! Shared authentication types

use std::collections::HashSet;

use storekeeper_db::Role;

use crate::token::AccessClaims;

/// Identity attached to a request after token verification.
///
/// Built from token claims alone; the store is not consulted per request.
/// Lives in the request's extensions, so it is request-local by
/// construction.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The principal's email (token subject)
    pub subject: String,
    /// Authorities granted at token issuance
    pub roles: HashSet<Role>,
}

impl AuthenticatedUser {
    /// Whether the identity holds the given role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether the identity holds the ADMIN role
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

impl From<AccessClaims> for AuthenticatedUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            subject: claims.sub,
            roles: claims.authorities,
        }
    }
}
