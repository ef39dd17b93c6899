use std::collections::HashMap;
use std::sync::Arc;

use crate::security::document::{UserRoleMappingsSection, UsersSection};
use crate::security::errors::SecurityError;
use crate::security::types::{Role, User};

pub const ANONYMOUS: &str = "anonymous";
pub const INTERNAL_REALM: &str = "internal";

/// Merge identity records and role mappings into users keyed by username.
///
/// A missing `users` section only skips the identity pass. Without a
/// `userRoleMappings` section no users are produced at all, even if identity
/// records exist.
pub fn resolve_users(
    users: Option<&UsersSection>,
    mappings: Option<&UserRoleMappingsSection>,
    roles: &HashMap<String, Arc<Role>>,
) -> Result<HashMap<String, User>, SecurityError> {
    let mut resolved: HashMap<String, User> = HashMap::new();
    let identities = users.map(|u| u.users.as_slice()).unwrap_or_default();

    for record in identities {
        let username = record.id.clone().ok_or(SecurityError::MissingField {
            record: "user",
            field: "id",
        })?;
        if username == ANONYMOUS {
            continue;
        }
        tracing::debug!(user = %username, "Extracting user");

        resolved.insert(
            username.clone(),
            User {
                username,
                email: record.email.clone(),
                enabled: record.status.as_deref() == Some("active"),
                realm: INTERNAL_REALM.to_string(),
                roles: Vec::new(),
                builtin: false,
            },
        );
    }

    let Some(mappings) = mappings else {
        return Ok(HashMap::new());
    };

    for mapping in &mappings.mappings {
        let username = mapping.user_id.clone().ok_or(SecurityError::MissingField {
            record: "userRoleMapping",
            field: "userId",
        })?;
        if username == ANONYMOUS {
            continue;
        }
        tracing::debug!(user = %username, "Extracting role mapping");
        let source = mapping.source.as_deref().ok_or(SecurityError::MissingField {
            record: "userRoleMapping",
            field: "source",
        })?;

        let user = resolved.entry(username.clone()).or_insert_with(|| User {
            username,
            email: None,
            enabled: true,
            realm: INTERNAL_REALM.to_string(),
            roles: Vec::new(),
            builtin: false,
        });
        user.realm = normalize_realm(source);
        user.roles = mapping
            .roles
            .names
            .iter()
            .filter_map(|name| roles.get(name).cloned())
            .collect();
    }

    Ok(resolved)
}

/// Lower-case a mapping source, folding Nexus's `default` realm into `internal`.
pub fn normalize_realm(source: &str) -> String {
    let realm = source.to_lowercase();
    if realm == "default" {
        INTERNAL_REALM.to_string()
    } else {
        realm
    }
}
