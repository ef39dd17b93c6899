//! Typed view of a Nexus `security.xml` document.
//!
//! Every section is optional. Required text elements are kept as `Option` so
//! that the resolvers can report exactly which field was missing.

use std::path::Path;

use serde::Deserialize;

use crate::security::errors::SecurityError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename = "security")]
pub struct SecurityDocument {
    #[serde(rename = "repositoryTargets")]
    pub repository_targets: Option<RepositoryTargetsSection>,
    pub privileges: Option<PrivilegesSection>,
    pub roles: Option<RolesSection>,
    pub users: Option<UsersSection>,
    #[serde(rename = "userRoleMappings")]
    pub user_role_mappings: Option<UserRoleMappingsSection>,
}

impl SecurityDocument {
    pub fn parse(source: &str) -> Result<Self, SecurityError> {
        Ok(quick_xml::de::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, SecurityError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| SecurityError::ReadError {
                path: path.display().to_string(),
                source,
            })?;
        Self::parse(&contents)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryTargetsSection {
    #[serde(rename = "repositoryTarget", default)]
    pub targets: Vec<RepositoryTargetRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryTargetRecord {
    pub id: Option<String>,
    #[serde(rename = "contentClass")]
    pub content_class: Option<String>,
    #[serde(default)]
    pub patterns: PatternList,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatternList {
    #[serde(rename = "pattern", default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrivilegesSection {
    #[serde(rename = "privilege", default)]
    pub privileges: Vec<PrivilegeRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrivilegeRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub properties: PropertyList,
}

#[derive(Debug, Default, Deserialize)]
pub struct PropertyList {
    #[serde(rename = "property", default)]
    pub properties: Vec<PropertyRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PropertyRecord {
    pub key: Option<String>,
    /// `None` when the `<value>` element itself is absent
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RolesSection {
    #[serde(rename = "role", default)]
    pub roles: Vec<RoleRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleRecord {
    pub id: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub privileges: PrivilegeIdList,
    #[serde(default)]
    pub roles: RoleNameList,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrivilegeIdList {
    #[serde(rename = "privilege", default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleNameList {
    #[serde(rename = "role", default)]
    pub names: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersSection {
    #[serde(rename = "user", default)]
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserRecord {
    pub id: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserRoleMappingsSection {
    #[serde(rename = "userRoleMapping", default)]
    pub mappings: Vec<UserRoleMappingRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserRoleMappingRecord {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub roles: RoleNameList,
}
