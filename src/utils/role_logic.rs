/// Pure functions for birthday role logic (Discord-agnostic)
use std::collections::HashSet;
use std::hash::Hash;

/// Role grants and revocations needed to reach today's target state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChanges<T> {
    pub to_grant: Vec<T>,
    pub to_revoke: Vec<T>,
}

impl<T> RoleChanges<T> {
    /// Check if any role changes are needed
    pub fn is_empty(&self) -> bool {
        self.to_grant.is_empty() && self.to_revoke.is_empty()
    }
}

/// Calculate which users need the role granted and which need it revoked.
///
/// Celebrants missing the role get it, in celebrant order; every holder who
/// is not celebrating loses it, in holder order.
pub fn calculate_role_changes<T: Clone + Eq + Hash>(
    celebrants: &[T],
    holders: &[T],
) -> RoleChanges<T> {
    let celebrant_set: HashSet<&T> = celebrants.iter().collect();
    let holder_set: HashSet<&T> = holders.iter().collect();

    let mut seen = HashSet::new();
    let to_grant = celebrants
        .iter()
        .filter(|c| !holder_set.contains(c) && seen.insert(*c))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let to_revoke = holders
        .iter()
        .filter(|h| !celebrant_set.contains(h) && seen.insert(*h))
        .cloned()
        .collect();

    RoleChanges { to_grant, to_revoke }
}
