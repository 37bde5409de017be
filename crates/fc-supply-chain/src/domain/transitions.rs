//! # Transition Table
//!
//! Declarative rules for every lifecycle action: which entity it touches,
//! the state it starts from and lands in, which roles may perform it, and
//! whether the caller must also be the item owner. The gateway checks these
//! generically instead of hand-coding a guard per operation.

use super::errors::SupplyChainError;
use super::roles::RoleRegistry;
use super::value_objects::{Action, EntityKind, FabricState, Stage, YarnState};
use serde::{Deserialize, Serialize};
use shared_types::{Identity, Role, TypeParseError, Upc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Who may list a packed fabric for sale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "SellPolicyRepr")]
pub enum SellPolicy {
    /// Only the owning producer.
    OwnerOnly,
    /// Any holder of one of these roles, owner or not. Never empty.
    AnyOf(Vec<Role>),
}

/// Wire shape of [`SellPolicy`] before the role list is checked.
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum SellPolicyRepr {
    OwnerOnly,
    AnyOf(Vec<Role>),
}

impl TryFrom<SellPolicyRepr> for SellPolicy {
    type Error = TypeParseError;

    fn try_from(repr: SellPolicyRepr) -> Result<Self, Self::Error> {
        match repr {
            SellPolicyRepr::OwnerOnly => Ok(Self::OwnerOnly),
            SellPolicyRepr::AnyOf(roles) if roles.is_empty() => {
                Err(TypeParseError::UnknownRole("empty any_of role list".to_string()))
            }
            SellPolicyRepr::AnyOf(roles) => Ok(Self::AnyOf(roles)),
        }
    }
}

impl Default for SellPolicy {
    fn default() -> Self {
        Self::AnyOf(vec![Role::Producer, Role::Consumer])
    }
}

impl fmt::Display for SellPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnerOnly => f.write_str("owner"),
            Self::AnyOf(roles) => {
                let names: Vec<_> = roles.iter().map(Role::as_str).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

impl FromStr for SellPolicy {
    type Err = TypeParseError;

    /// `owner` / `owner_only`, or a comma-separated role list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("owner") || trimmed.eq_ignore_ascii_case("owner_only") {
            return Ok(Self::OwnerOnly);
        }
        let roles = trimmed
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Role::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if roles.is_empty() {
            return Err(TypeParseError::UnknownRole(s.to_string()));
        }
        Ok(Self::AnyOf(roles))
    }
}

/// One row of the transition table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionRule {
    /// Gateway action.
    pub action: Action,
    /// Table the action touches.
    pub entity: EntityKind,
    /// Required current state; `None` for creation.
    pub from: Option<Stage>,
    /// Resulting state.
    pub to: Stage,
    /// Caller must hold at least one of these.
    pub roles: Vec<Role>,
    /// Caller must also be the item's current owner.
    pub owner_only: bool,
}

impl TransitionRule {
    fn new(action: Action, from: Option<Stage>, to: Stage, role: Role, owner_only: bool) -> Self {
        Self {
            action,
            entity: to.entity(),
            from,
            to,
            roles: vec![role],
            owner_only,
        }
    }

    /// State a yarn rule lands on.
    pub fn yarn_target(&self) -> Result<YarnState, SupplyChainError> {
        match self.to {
            Stage::Yarn(state) => Ok(state),
            Stage::Fabric(_) => Err(self.wrong_entity(EntityKind::Yarn)),
        }
    }

    /// State a fabric rule lands on.
    pub fn fabric_target(&self) -> Result<FabricState, SupplyChainError> {
        match self.to {
            Stage::Fabric(state) => Ok(state),
            Stage::Yarn(_) => Err(self.wrong_entity(EntityKind::Fabric)),
        }
    }

    /// Creation rules have no starting state.
    pub fn is_creation(&self) -> bool {
        self.from.is_none()
    }

    /// Role gate.
    pub fn authorize_role(
        &self,
        registry: &RoleRegistry,
        caller: &Identity,
    ) -> Result<(), SupplyChainError> {
        if registry.has_any_role(caller, &self.roles) {
            Ok(())
        } else {
            Err(self.unauthorized(caller))
        }
    }

    /// Custody gate; a no-op for rules that are not owner-only.
    pub fn authorize_owner(
        &self,
        caller: &Identity,
        owner: &Identity,
    ) -> Result<(), SupplyChainError> {
        if self.owner_only && caller != owner {
            return Err(self.unauthorized(caller));
        }
        Ok(())
    }

    /// State gate.
    pub fn check_stage(&self, upc: Upc, actual: Stage) -> Result<(), SupplyChainError> {
        match self.from {
            Some(expected) if expected == actual => Ok(()),
            Some(expected) => Err(SupplyChainError::InvalidState {
                entity: self.entity,
                upc,
                expected: expected.to_string(),
                actual: actual.to_string(),
            }),
            None => Err(SupplyChainError::AlreadyExists {
                entity: self.entity,
                upc,
            }),
        }
    }

    fn wrong_entity(&self, wanted: EntityKind) -> SupplyChainError {
        SupplyChainError::InvalidInput(format!(
            "{} moves a {}, not a {wanted}",
            self.action, self.entity
        ))
    }

    fn unauthorized(&self, caller: &Identity) -> SupplyChainError {
        SupplyChainError::Unauthorized {
            caller: *caller,
            action: self.action,
        }
    }
}

/// All lifecycle rules, keyed by action.
#[derive(Clone, Debug)]
pub struct TransitionTable {
    rules: HashMap<Action, TransitionRule>,
}

impl TransitionTable {
    /// Build the table. Only the Sell row depends on configuration.
    pub fn new(sell_policy: &SellPolicy) -> Self {
        use FabricState as F;
        use YarnState as Y;

        let yarn = |s| Some(Stage::Yarn(s));
        let fabric = |s| Some(Stage::Fabric(s));

        let mut sell = TransitionRule::new(
            Action::SellFabric,
            fabric(F::Packed),
            Stage::Fabric(F::ForSale),
            Role::Producer,
            true,
        );
        if let SellPolicy::AnyOf(roles) = sell_policy {
            sell.roles = roles.clone();
            sell.owner_only = false;
        }

        #[rustfmt::skip]
        let rules = [
            TransitionRule::new(Action::PlantYarn, None, Stage::Yarn(Y::Planted), Role::Textile, false),
            TransitionRule::new(Action::AcquireYarn, yarn(Y::Planted), Stage::Yarn(Y::Acquired), Role::Textile, true),
            TransitionRule::new(Action::AuditYarn, yarn(Y::Acquired), Stage::Yarn(Y::Audited), Role::QualityChecker, false),
            TransitionRule::new(Action::ProcessYarn, yarn(Y::Audited), Stage::Yarn(Y::Processed), Role::Textile, true),
            TransitionRule::new(Action::CreateFabric, None, Stage::Fabric(F::Created), Role::Producer, false),
            TransitionRule::new(Action::CutFabric, fabric(F::Created), Stage::Fabric(F::Cut), Role::Producer, true),
            TransitionRule::new(Action::ProduceFabric, fabric(F::Cut), Stage::Fabric(F::Produced), Role::Producer, true),
            TransitionRule::new(Action::CertifyFabric, fabric(F::Produced), Stage::Fabric(F::Certified), Role::QualityChecker, false),
            TransitionRule::new(Action::PackFabric, fabric(F::Certified), Stage::Fabric(F::Packed), Role::Producer, true),
            sell,
            TransitionRule::new(Action::BuyFabric, fabric(F::ForSale), Stage::Fabric(F::Purchased), Role::Consumer, false),
        ];

        Self {
            rules: rules.into_iter().map(|rule| (rule.action, rule)).collect(),
        }
    }

    /// Rule for a lifecycle action.
    pub fn rule(&self, action: Action) -> Result<&TransitionRule, SupplyChainError> {
        self.rules
            .get(&action)
            .ok_or_else(|| SupplyChainError::InvalidInput(format!("{action} is not a lifecycle action")))
    }

    /// Iterate over every rule.
    pub fn rules(&self) -> impl Iterator<Item = &TransitionRule> {
        self.rules.values()
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new(&SellPolicy::default())
    }
}
