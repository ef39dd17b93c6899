pub mod baseline;
pub mod compiler;
pub mod document;
pub mod errors;
pub mod pattern;
pub mod privileges;
pub mod roles;
pub mod targets;
pub mod types;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use types::{Privilege, PrivilegeIndex, Role, User};

/// Fully resolved security model compiled from one security.xml.
/// Immutable once built; a refresh replaces it as a whole.
#[derive(Debug, Clone, Default)]
pub struct ResolvedModel {
    /// username -> User (never contains "anonymous")
    pub users: HashMap<String, User>,
    /// group name -> flattened, consolidated Role
    pub roles: HashMap<String, Arc<Role>>,
    /// canonical name -> Privilege
    pub privileges: HashMap<String, Arc<Privilege>>,
    /// raw privilege id -> ref, including synthesized view refs
    pub privilege_refs: PrivilegeIndex,
}

/// Counts and notable entries of a model, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub users: usize,
    pub roles: usize,
    pub privileges: usize,
    pub privilege_refs: usize,
    pub admin_roles: Vec<String>,
    /// Privileges whose target patterns could not be converted
    pub unconverted_privileges: Vec<String>,
}

impl ResolvedModel {
    pub fn summary(&self) -> ModelSummary {
        let mut admin_roles: Vec<String> = self
            .roles
            .values()
            .filter(|r| r.admin)
            .map(|r| r.group_name.clone())
            .collect();
        admin_roles.sort();

        let mut unconverted_privileges: Vec<String> = self
            .privileges
            .values()
            .filter(|p| p.conversion.as_ref().is_some_and(|c| c.is_failed()))
            .map(|p| p.name.clone())
            .collect();
        unconverted_privileges.sort();

        ModelSummary {
            users: self.users.len(),
            roles: self.roles.len(),
            privileges: self.privileges.len(),
            privilege_refs: self.privilege_refs.len(),
            admin_roles,
            unconverted_privileges,
        }
    }
}
