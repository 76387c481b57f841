//! The [`Actor`] trait implemented by the host's membership provider.

use crate::id::AccountId;

/// An entity performing an action that regions may restrict.
///
/// The engine never enumerates an actor's groups. It only asks whether
/// the actor holds a specific group, so providers can answer from
/// whatever permission backend they use.
///
/// # Thread Safety
///
/// Queries may run on any thread, but an actor is only borrowed for the
/// duration of one query, so no `Send`/`Sync` bound is imposed.
pub trait Actor {
    /// Stable account identifier.
    fn unique_id(&self) -> AccountId;

    /// Current display name, matched case-sensitively against the legacy
    /// name lists of a [`Domain`](crate::Domain).
    fn name(&self) -> &str;

    /// Whether the actor currently holds `group`.
    ///
    /// `group` is always passed in lower case.
    fn has_group(&self, group: &str) -> bool;
}

impl<T: Actor + ?Sized> Actor for &T {
    fn unique_id(&self) -> AccountId {
        (**self).unique_id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn has_group(&self, group: &str) -> bool {
        (**self).has_group(group)
    }
}

/// How an actor relates to a region.
///
/// Owners are implicitly members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Association {
    /// The actor is an owner of the region or one of its ancestors.
    Owner,
    /// The actor is a member (but not an owner).
    Member,
    /// The actor has no membership. Also used for queries without an actor.
    NonMember,
}

impl Association {
    /// Whether this association counts as membership.
    pub fn is_member(self) -> bool {
        matches!(self, Self::Owner | Self::Member)
    }
}
