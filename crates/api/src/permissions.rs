//! Authorization engine.
//!
//! Pure decision functions over the presented identity; no I/O and no side
//! effects. Mutations go through these predicates, while read policy is
//! deliberately asymmetric: category reads require nothing, user reads
//! require only an authenticated active identity.

use gxi_core::Role;

use crate::models::{CurrentUser, User};

/// True iff an identity is present, carries a role, and is active.
///
/// An identity without an activation flag counts as active; only an
/// explicit `false` (a deactivated account) denies.
#[must_use]
pub fn is_authenticated_and_active(identity: Option<&CurrentUser>) -> bool {
    identity.is_some_and(|user| user.role.is_some() && user.is_active.unwrap_or(true))
}

/// True iff the identity is an active superadmin.
#[must_use]
pub fn is_superadmin(identity: Option<&CurrentUser>) -> bool {
    is_authenticated_and_active(identity)
        && identity.is_some_and(|user| user.role == Some(Role::Superadmin))
}

/// True iff the identity is an active customer.
#[must_use]
pub fn is_customer(identity: Option<&CurrentUser>) -> bool {
    is_authenticated_and_active(identity)
        && identity.is_some_and(|user| user.role == Some(Role::Customer))
}

/// True iff the identity may create, update, or delete categories.
#[must_use]
pub fn can_mutate_category(identity: Option<&CurrentUser>) -> bool {
    is_superadmin(identity)
}

/// General role-creation rule: a superadmin may create a customer; nothing
/// else is permitted through this predicate.
///
/// Registration does not consult this predicate: the bootstrap superadmin
/// and self-service customer signup are explicit state transitions gated on
/// store cardinality, handled in the credential store.
#[must_use]
pub const fn can_create_role(creator: Role, target: Role) -> bool {
    matches!((creator, target), (Role::Superadmin, Role::Customer))
}

/// True iff `requester` may edit or delete `target`: superadmins always,
/// otherwise only the target's direct parent in the ownership forest.
#[must_use]
pub fn can_manage_user(requester: &CurrentUser, target: &User) -> bool {
    if is_superadmin(Some(requester)) {
        return true;
    }
    is_authenticated_and_active(Some(requester)) && target.parent_id == Some(requester.id)
}
