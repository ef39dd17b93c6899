use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Wildcard repository reference for privileges not bound to a repository.
pub const ANY_REPOSITORY: &str = "*";

/// Privilege-ref index: raw privilege id -> shared reference.
pub type PrivilegeIndex = HashMap<String, Arc<PrivilegeRef>>;

/// Outcome of converting a target's patterns into include/exclude matchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternConversion {
    Resolved {
        include: Vec<String>,
        exclude: Vec<String>,
    },
    /// Conversion failed; the message is kept so the failure can be reported
    /// downstream instead of aborting the run.
    Failed { message: String },
}

impl PatternConversion {
    pub fn is_failed(&self) -> bool {
        matches!(self, PatternConversion::Failed { .. })
    }

    pub fn include(&self) -> &[String] {
        match self {
            PatternConversion::Resolved { include, .. } => include,
            PatternConversion::Failed { .. } => &[],
        }
    }

    pub fn exclude(&self) -> &[String] {
        match self {
            PatternConversion::Resolved { exclude, .. } => exclude,
            PatternConversion::Failed { .. } => &[],
        }
    }
}

/// A named repository target: content class plus path patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    /// e.g. "maven2", "npm", "any"
    pub content_type: String,
    pub patterns: Vec<String>,
    pub conversion: PatternConversion,
}

/// A named capability bound to a repository scope. Target fields are inlined
/// on construction so the privilege is self-contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privilege {
    /// Canonical name, with any method suffix stripped
    pub name: String,
    /// Repository id, repository-group id, or `*`
    pub repo_ref: String,
    pub builtin: bool,
    pub content_type: Option<String>,
    pub patterns: Vec<String>,
    pub conversion: Option<PatternConversion>,
}

impl Privilege {
    pub fn new(name: impl Into<String>, repo_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo_ref: repo_ref.into(),
            builtin: false,
            content_type: None,
            patterns: Vec::new(),
            conversion: None,
        }
    }

    /// Inline the target's content type and patterns.
    pub fn with_target(mut self, target: &Target) -> Self {
        self.content_type = Some(target.content_type.clone());
        self.patterns = target.patterns.clone();
        self.conversion = Some(target.conversion.clone());
        self
    }

    pub fn builtin(mut self) -> Self {
        self.builtin = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// One per-method observation, not yet consolidated
    LooseTarget,
    /// Consolidated target capability with a composite method descriptor
    Target,
    /// Synthetic visibility of one destination repository
    View,
}

/// A role's pointer to a privilege, qualified by method and kind.
///
/// Refs are shared through `Arc`; two refs are "the same" only when they are
/// the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeRef {
    pub id: String,
    pub method: Option<String>,
    pub kind: RefKind,
    pub privilege: Arc<Privilege>,
    pub needs_admin: bool,
}

impl PrivilegeRef {
    pub fn loose(id: impl Into<String>, method: impl Into<String>, privilege: Arc<Privilege>) -> Self {
        Self {
            id: id.into(),
            method: Some(method.into()),
            kind: RefKind::LooseTarget,
            privilege,
            needs_admin: false,
        }
    }
}

/// A named, inheritable bundle of privilege refs.
#[derive(Debug, Clone)]
pub struct Role {
    pub group_name: String,
    pub description: String,
    pub privileges: Vec<Arc<PrivilegeRef>>,
    /// Child role names; empty once the role graph is resolved
    pub roles: Vec<String>,
    pub admin: bool,
    pub builtin: bool,
}

impl Role {
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            description: String::new(),
            privileges: Vec::new(),
            roles: Vec::new(),
            admin: false,
            builtin: false,
        }
    }

    pub fn has_privilege(&self, privref: &Arc<PrivilegeRef>) -> bool {
        self.privileges.iter().any(|p| Arc::ptr_eq(p, privref))
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub email: Option<String>,
    pub enabled: bool,
    /// "internal" for locally managed users, otherwise the lower-cased source
    pub realm: String,
    pub roles: Vec<Arc<Role>>,
    pub builtin: bool,
}

impl User {
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.group_name.as_str()).collect()
    }
}

/// A destination-system repository, used only to synthesize view privileges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
}

impl Repository {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
