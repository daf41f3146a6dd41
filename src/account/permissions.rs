use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::submission::Confirmation;

pub const ADMIN_CONFIRMATION: &str = "Tem certeza de que este usuário será um Administrador?\nEle poderá alterar a senha de outros usuários e terá acesso completo à todas as funções da aplicação.";

/// Permission that can be granted to an operator account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Administrador,
    AlterarAcolhido,
    ConsultarAcolhido,
    CadastrarAcolhido,
}

/// What granting a role implies.
#[derive(Debug, Clone, Copy)]
pub struct Dependency {
    /// Roles checked together with this one.
    pub grants: &'static [Role],
    /// Prompt that must be accepted before the grant takes effect.
    pub confirm: Option<&'static str>,
}

impl Role {
    /// All roles in display order.
    pub const ALL: [Role; 4] = [
        Role::Administrador,
        Role::AlterarAcolhido,
        Role::ConsultarAcolhido,
        Role::CadastrarAcolhido,
    ];

    pub fn dependency(self) -> Dependency {
        match self {
            Role::Administrador => Dependency {
                grants: &[
                    Role::AlterarAcolhido,
                    Role::ConsultarAcolhido,
                    Role::CadastrarAcolhido,
                ],
                confirm: Some(ADMIN_CONFIRMATION),
            },
            Role::AlterarAcolhido => Dependency {
                grants: &[Role::ConsultarAcolhido],
                confirm: None,
            },
            Role::ConsultarAcolhido | Role::CadastrarAcolhido => Dependency {
                grants: &[],
                confirm: None,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Administrador => "ADMINISTRADOR",
            Role::AlterarAcolhido => "ALTERAR_ACOLHIDO",
            Role::ConsultarAcolhido => "CONSULTAR_ACOLHIDO",
            Role::CadastrarAcolhido => "CADASTRAR_ACOLHIDO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Administrador => "Administrador",
            Role::AlterarAcolhido => "Alterar acolhido",
            Role::ConsultarAcolhido => "Consultar acolhido",
            Role::CadastrarAcolhido => "Cadastrar acolhido",
        }
    }

    /// The role and everything it grants, transitively.
    fn grant_closure(self) -> BTreeSet<Role> {
        let mut closure = BTreeSet::from([self]);
        let mut pending = vec![self];
        while let Some(role) = pending.pop() {
            for granted in role.dependency().grants {
                if closure.insert(*granted) {
                    pending.push(*granted);
                }
            }
        }
        closure
    }

    /// The role and every role that grants it, transitively.
    fn revoke_closure(self) -> BTreeSet<Role> {
        Role::ALL
            .into_iter()
            .filter(|candidate| candidate.grant_closure().contains(&self))
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single checkbox change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Applied {
        granted: Vec<Role>,
        revoked: Vec<Role>,
    },
    /// The confirmation prompt was declined; the role stays unchecked.
    Declined,
}

/// Checked roles of the account form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: BTreeSet<Role>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state taken from a stored account, as is.
    pub fn from_roles(roles: &[Role]) -> Self {
        Self {
            granted: roles.iter().copied().collect(),
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.granted.contains(&role)
    }

    /// Checked roles in display order.
    pub fn roles(&self) -> Vec<Role> {
        self.granted.iter().copied().collect()
    }

    /// Applies a checkbox change and its dependents. Checking grants the
    /// role's closure once any confirmation is accepted; unchecking revokes
    /// the role and every role that implies it.
    pub fn toggle(
        &mut self,
        role: Role,
        checked: bool,
        confirmation: &mut impl Confirmation,
    ) -> ToggleOutcome {
        if checked {
            if let Some(message) = role.dependency().confirm {
                if !confirmation.confirm(message) {
                    self.granted.remove(&role);
                    tracing::debug!(%role, "role grant declined");
                    return ToggleOutcome::Declined;
                }
            }
            let granted = role
                .grant_closure()
                .into_iter()
                .filter(|candidate| self.granted.insert(*candidate))
                .collect();
            ToggleOutcome::Applied {
                granted,
                revoked: Vec::new(),
            }
        } else {
            let revoked = role
                .revoke_closure()
                .into_iter()
                .filter(|candidate| self.granted.remove(candidate))
                .collect();
            ToggleOutcome::Applied {
                granted: Vec::new(),
                revoked,
            }
        }
    }
}
