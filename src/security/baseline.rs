//! Built-in targets, privileges and roles that document data is layered on.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::security::pattern::PatternConverter;
use crate::security::targets::build_target;
use crate::security::types::*;

/// Provider of built-in definitions. Each stage receives the resolved output
/// of the previous one; document entries override built-ins by key.
pub trait Baseline {
    fn targets(&self) -> HashMap<String, Target> {
        HashMap::new()
    }

    fn privileges(&self, _targets: &HashMap<String, Target>) -> HashMap<String, Arc<Privilege>> {
        HashMap::new()
    }

    fn privilege_refs(&self, _privileges: &HashMap<String, Arc<Privilege>>) -> PrivilegeIndex {
        PrivilegeIndex::new()
    }

    fn roles(&self, _refs: &PrivilegeIndex) -> HashMap<String, Role> {
        HashMap::new()
    }
}

/// No built-ins at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBaseline;

impl Baseline for NoBaseline {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinTarget {
    pub name: String,
    pub content_type: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinPrivilege {
    /// Ref id roles use to point at this privilege
    pub id: String,
    pub name: String,
    pub method: String,
    /// Name of a target, built-in or user-defined
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default = "default_repo_ref")]
    pub repo_ref: String,
}

fn default_repo_ref() -> String {
    ANY_REPOSITORY.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinRole {
    pub group_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub privileges: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub admin: bool,
}

/// Built-in definitions declared up front (typically from settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineDefinitions {
    #[serde(default)]
    pub targets: Vec<BuiltinTarget>,
    #[serde(default)]
    pub privileges: Vec<BuiltinPrivilege>,
    #[serde(default)]
    pub roles: Vec<BuiltinRole>,
}

/// Baseline backed by static definitions. Targets are converted once, up
/// front, with the same converter used for document targets.
#[derive(Debug, Clone, Default)]
pub struct StaticBaseline {
    targets: HashMap<String, Target>,
    privileges: Vec<BuiltinPrivilege>,
    roles: Vec<BuiltinRole>,
}

impl StaticBaseline {
    pub fn new(definitions: &BaselineDefinitions, converter: &dyn PatternConverter) -> Self {
        let targets = definitions
            .targets
            .iter()
            .map(|t| {
                let target = build_target(
                    t.name.clone(),
                    t.content_type.clone(),
                    t.patterns.clone(),
                    converter,
                );
                (target.name.clone(), target)
            })
            .collect();

        Self {
            targets,
            privileges: definitions.privileges.clone(),
            roles: definitions.roles.clone(),
        }
    }
}

impl Baseline for StaticBaseline {
    fn targets(&self) -> HashMap<String, Target> {
        self.targets.clone()
    }

    fn privileges(&self, targets: &HashMap<String, Target>) -> HashMap<String, Arc<Privilege>> {
        let mut privileges = HashMap::new();
        for def in &self.privileges {
            privileges.entry(def.name.clone()).or_insert_with(|| {
                let privilege = Privilege::new(def.name.clone(), def.repo_ref.clone()).builtin();
                let privilege = match def.target.as_ref().and_then(|t| targets.get(t)) {
                    Some(target) => privilege.with_target(target),
                    None => privilege,
                };
                Arc::new(privilege)
            });
        }
        privileges
    }

    fn privilege_refs(&self, privileges: &HashMap<String, Arc<Privilege>>) -> PrivilegeIndex {
        self.privileges
            .iter()
            .filter_map(|def| {
                let privilege = privileges.get(&def.name)?;
                let privref = PrivilegeRef::loose(def.id.clone(), def.method.clone(), privilege.clone());
                Some((def.id.clone(), Arc::new(privref)))
            })
            .collect()
    }

    fn roles(&self, refs: &PrivilegeIndex) -> HashMap<String, Role> {
        self.roles
            .iter()
            .map(|def| {
                let mut role = Role::new(def.group_name.clone());
                role.description = def.description.clone();
                role.privileges = def
                    .privileges
                    .iter()
                    .filter_map(|id| refs.get(id).cloned())
                    .collect();
                role.roles = def.roles.clone();
                role.admin = def.admin;
                role.builtin = true;
                (role.group_name.clone(), role)
            })
            .collect()
    }
}
