//! # Role Registry
//!
//! Four role memberships plus a fixed administrative owner. Only the owner
//! grants or revokes; any account may renounce a role it holds.

use super::errors::SupplyChainError;
use super::value_objects::Action;
use shared_types::{Identity, Role};
use std::collections::{BTreeSet, HashMap};

/// Mapping of identity to held roles.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    owner: Identity,
    members: HashMap<Identity, BTreeSet<Role>>,
}

impl RoleRegistry {
    /// Create a registry administered by `owner`. The owner holds no roles.
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            members: HashMap::new(),
        }
    }

    /// Registry administrator.
    pub fn owner(&self) -> Identity {
        self.owner
    }

    /// Does `identity` hold `role`?
    pub fn has_role(&self, identity: &Identity, role: Role) -> bool {
        self.members
            .get(identity)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// Does `identity` hold any of `roles`?
    pub fn has_any_role(&self, identity: &Identity, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(identity, *role))
    }

    /// Roles held by `identity`, in declaration order.
    pub fn roles_of(&self, identity: &Identity) -> Vec<Role> {
        self.members
            .get(identity)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Grant a role. Returns `true` if newly granted, `false` if already held.
    pub fn grant(
        &mut self,
        caller: &Identity,
        identity: Identity,
        role: Role,
    ) -> Result<bool, SupplyChainError> {
        self.require_owner(caller, Action::GrantRole)?;
        Ok(self.members.entry(identity).or_default().insert(role))
    }

    /// Revoke a role. Returns `true` if it was held.
    pub fn revoke(
        &mut self,
        caller: &Identity,
        identity: &Identity,
        role: Role,
    ) -> Result<bool, SupplyChainError> {
        self.require_owner(caller, Action::RevokeRole)?;
        Ok(self.remove(identity, role))
    }

    /// Drop one of the caller's own roles. Returns `true` if it was held.
    pub fn renounce(&mut self, caller: &Identity, role: Role) -> bool {
        self.remove(caller, role)
    }

    /// Number of identities holding at least one role.
    pub fn member_count(&self) -> usize {
        self.members.values().filter(|roles| !roles.is_empty()).count()
    }

    fn remove(&mut self, identity: &Identity, role: Role) -> bool {
        let Some(roles) = self.members.get_mut(identity) else {
            return false;
        };
        let removed = roles.remove(&role);
        if roles.is_empty() {
            self.members.remove(identity);
        }
        removed
    }

    fn require_owner(&self, caller: &Identity, action: Action) -> Result<(), SupplyChainError> {
        if *caller != self.owner {
            return Err(SupplyChainError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }
}
