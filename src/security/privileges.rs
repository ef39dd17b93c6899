use std::collections::HashMap;
use std::sync::Arc;

use crate::security::document::{PrivilegeRecord, PrivilegesSection};
use crate::security::errors::SecurityError;
use crate::security::types::*;

/// Privileges keyed by canonical name, plus loose refs keyed by raw id.
#[derive(Debug, Default)]
pub struct ResolvedPrivileges {
    pub privileges: HashMap<String, Arc<Privilege>>,
    pub refs: PrivilegeIndex,
}

/// Extract target privileges from the document.
///
/// Records sharing a canonical name (e.g. "Jars - (read)" and
/// "Jars - (create)") collapse into one `Privilege`; each record still gets its
/// own loose ref carrying its method.
pub fn resolve_privileges(
    section: Option<&PrivilegesSection>,
    targets: &HashMap<String, Target>,
) -> Result<ResolvedPrivileges, SecurityError> {
    let mut resolved = ResolvedPrivileges::default();
    let Some(section) = section else {
        return Ok(resolved);
    };

    for record in &section.privileges {
        let id = record.id.clone().ok_or(SecurityError::MissingField {
            record: "privilege",
            field: "id",
        })?;
        let raw_name = record.name.as_deref().ok_or(SecurityError::MissingField {
            record: "privilege",
            field: "name",
        })?;
        tracing::debug!(privilege = %raw_name, "Extracting privilege");

        let props = read_properties(record)?;
        let method = props
            .get("method")
            .cloned()
            .ok_or_else(|| SecurityError::MissingProperty {
                privilege: raw_name.to_string(),
                key: "method",
            })?;
        let method = effective_method(&method);
        let name = canonical_name(raw_name, method);

        let privilege = resolved
            .privileges
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(new_privilege(name, &props, targets)))
            .clone();

        resolved
            .refs
            .insert(id.clone(), Arc::new(PrivilegeRef::loose(id, method, privilege)));
    }

    Ok(resolved)
}

/// Strip the `,read` companion from a method pair like `create,read`.
pub fn effective_method(method: &str) -> &str {
    match method.split_once(',') {
        Some((first, "read")) => first,
        _ => method,
    }
}

/// `"<base> - (<method>)"` becomes `<base>`; any other name is kept as is.
pub fn canonical_name<'a>(raw: &'a str, method: &str) -> &'a str {
    raw.strip_suffix(&format!(" - ({method})"))
        .filter(|base| !base.is_empty())
        .unwrap_or(raw)
}

/// Synthesize one view ref per destination repository.
pub fn build_view_privileges(repositories: &[Repository]) -> PrivilegeIndex {
    repositories
        .iter()
        .map(|repo| {
            let id = format!("repository-{}", repo.id);
            let privref = PrivilegeRef {
                id: id.clone(),
                method: None,
                kind: RefKind::View,
                privilege: Arc::new(Privilege::new(id.clone(), repo.id.clone())),
                needs_admin: false,
            };
            (id, Arc::new(privref))
        })
        .collect()
}

type Properties = HashMap<String, String>;

fn read_properties(record: &PrivilegeRecord) -> Result<Properties, SecurityError> {
    let mut props = HashMap::new();
    for prop in &record.properties.properties {
        let Some(value) = &prop.value else {
            tracing::error!(
                privilege = ?record.name,
                key = ?prop.key,
                "No value element found for privilege property, skipping"
            );
            continue;
        };
        let key = prop.key.clone().ok_or(SecurityError::MissingField {
            record: "property",
            field: "key",
        })?;
        props.insert(key, value.clone());
    }
    Ok(props)
}

fn new_privilege(name: &str, props: &Properties, targets: &HashMap<String, Target>) -> Privilege {
    let non_blank = |key: &str| {
        props
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    };
    let repo_ref = non_blank("repositoryId")
        .or_else(|| non_blank("repositoryGroupId"))
        .unwrap_or(ANY_REPOSITORY);

    let privilege = Privilege::new(name, repo_ref);
    match non_blank("repositoryTargetId").and_then(|id| targets.get(id)) {
        Some(target) => privilege.with_target(target),
        None => {
            tracing::debug!(privilege = %name, "Privilege has no known repository target");
            privilege
        }
    }
}
