//! Actors, roles and the pluggable authenticator.
//!
//! Services never look at HTTP headers. They receive a `&dyn RoleChecker`
//! and gate privileged operations on a role name. The HTTP layer turns a
//! request into an [`Actor`] through whatever [`Authenticator`] was
//! injected at startup.

use std::collections::BTreeSet;

use axum::http::HeaderMap;

use crate::ServiceError;

/// Role that satisfies every role check.
pub const ROOT_ROLE: &str = "*";

/// Answers "does the current actor hold this role?".
pub trait RoleChecker: Send + Sync {
    fn has_role(&self, role: &str) -> bool;

    /// Fail with `PermissionDenied` unless the actor holds `role`.
    fn require_role(&self, role: &str, action: &str) -> Result<(), ServiceError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "{action} requires role '{role}'"
            )))
        }
    }
}

/// The user on whose behalf an operation runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub roles: BTreeSet<String>,
}

impl Actor {
    pub fn new<I, S>(id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Superuser actor, holds [`ROOT_ROLE`].
    pub fn root() -> Self {
        Self::new("root", [ROOT_ROLE])
    }
}

impl RoleChecker for Actor {
    fn has_role(&self, role: &str) -> bool {
        self.roles.contains(ROOT_ROLE) || self.roles.contains(role)
    }
}

/// Resolves the request headers to an actor.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, ServiceError>;
}

/// Every request runs as [`Actor::root`]. Tests and single-user setups.
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Actor, ServiceError> {
        Ok(Actor::root())
    }
}

/// Rejects every request.
pub struct DenyAll;

impl Authenticator for DenyAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Actor, ServiceError> {
        Err(ServiceError::Unauthorized("access denied".into()))
    }
}
