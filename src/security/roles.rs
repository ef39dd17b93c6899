use std::collections::HashMap;
use std::sync::Arc;

use crate::security::document::RolesSection;
use crate::security::errors::SecurityError;
use crate::security::types::*;

/// Extract roles from the document. Privilege ids are resolved against
/// `index` right away (unknown ids are dropped); child roles stay as names
/// until the graph is flattened.
pub fn resolve_roles(
    section: Option<&RolesSection>,
    index: &PrivilegeIndex,
) -> Result<HashMap<String, Role>, SecurityError> {
    let mut roles = HashMap::new();
    let Some(section) = section else {
        return Ok(roles);
    };

    for record in &section.roles {
        let group_name = record.id.clone().ok_or(SecurityError::MissingField {
            record: "role",
            field: "id",
        })?;
        tracing::debug!(role = %group_name, "Extracting role");

        let mut role = Role::new(group_name);
        role.description = record.description.clone().unwrap_or_default();
        role.privileges = record
            .privileges
            .ids
            .iter()
            .filter_map(|id| index.get(id).cloned())
            .collect();
        role.roles = record.roles.names.clone();

        roles.insert(role.group_name.clone(), role);
    }

    Ok(roles)
}

#[derive(Debug, Clone, Default)]
struct Flattened {
    privileges: Vec<Arc<PrivilegeRef>>,
    admin: bool,
}

impl Flattened {
    /// Append refs not already present by identity.
    fn absorb(&mut self, refs: &[Arc<PrivilegeRef>]) {
        for privref in refs {
            if !self.privileges.iter().any(|p| Arc::ptr_eq(p, privref)) {
                self.privileges.push(privref.clone());
            }
        }
    }

    fn merge(&mut self, other: &Flattened) {
        self.admin |= other.admin;
        self.absorb(&other.privileges);
    }
}

/// DFS bookkeeping for roles whose component is still open.
#[derive(Debug, Default)]
struct Visit {
    counter: usize,
    index: HashMap<String, usize>,
    stack: Vec<String>,
    partial: HashMap<String, Flattened>,
}

/// Role inheritance graph, keyed by group name.
///
/// Each role's effective privilege set is computed at most once and memoized,
/// so a role shared by several parents is never re-descended. Roles that
/// inherit from each other in a cycle form one strongly connected component
/// and all end up with the component's union.
#[derive(Debug)]
pub struct RoleGraph {
    roles: HashMap<String, Role>,
    resolved: HashMap<String, Flattened>,
    visit: Visit,
}

impl RoleGraph {
    pub fn new(roles: HashMap<String, Role>) -> Self {
        Self {
            roles,
            resolved: HashMap::new(),
            visit: Visit::default(),
        }
    }

    /// Effective privilege refs of `name`: its own refs followed by every
    /// inherited ref not already present. Unknown roles have none.
    pub fn flatten(&mut self, name: &str) -> Vec<Arc<PrivilegeRef>> {
        self.flatten_entry(name)
            .map(|f| f.privileges)
            .unwrap_or_default()
    }

    /// Whether `name` is administrative once inheritance is applied.
    pub fn is_admin(&mut self, name: &str) -> bool {
        self.flatten_entry(name).is_some_and(|f| f.admin)
    }

    fn flatten_entry(&mut self, name: &str) -> Option<Flattened> {
        if !self.resolved.contains_key(name) && self.roles.contains_key(name) {
            self.connect(name);
        }
        self.resolved.get(name).cloned()
    }

    /// Tarjan-style visit of an unvisited role. Returns its low link; every
    /// role on the stack is either a DFS ancestor or in an open component.
    fn connect(&mut self, name: &str) -> usize {
        let Some(role) = self.roles.get(name) else {
            return usize::MAX;
        };
        let mut flat = Flattened {
            privileges: Vec::new(),
            admin: role.admin,
        };
        flat.absorb(&role.privileges);
        // Last-listed child first.
        let children: Vec<String> = role.roles.iter().rev().cloned().collect();

        let index = self.visit.counter;
        self.visit.counter += 1;
        self.visit.index.insert(name.to_string(), index);
        self.visit.stack.push(name.to_string());
        let mut low = index;

        for child in children {
            if let Some(done) = self.resolved.get(&child) {
                flat.merge(done);
                continue;
            }
            if !self.roles.contains_key(&child) {
                tracing::debug!(role = %name, child = %child, "Skipping unresolved child role");
                continue;
            }
            match self.visit.index.get(&child).copied() {
                None => {
                    low = low.min(self.connect(&child));
                    let inherited = self
                        .resolved
                        .get(&child)
                        .or_else(|| self.visit.partial.get(&child));
                    if let Some(inherited) = inherited {
                        flat.merge(inherited);
                    }
                }
                // Still open: folded in when its component closes.
                Some(child_index) => low = low.min(child_index),
            }
        }

        if low < index {
            self.visit.partial.insert(name.to_string(), flat);
            return low;
        }

        let split = self
            .visit
            .stack
            .iter()
            .rposition(|n| n == name)
            .unwrap_or(self.visit.stack.len());
        let members = self.visit.stack.split_off(split);
        if members.len() > 1 {
            tracing::warn!(
                role = %name,
                members = ?members,
                "Cyclic role inheritance, merging roles in the cycle"
            );
        }
        for member in members.iter().skip(1) {
            if let Some(partial) = self.visit.partial.remove(member) {
                flat.merge(&partial);
            }
        }
        for member in members {
            self.resolved.insert(member, flat.clone());
        }
        low
    }

    /// Flatten and consolidate every role, returning the finished role map.
    pub fn into_roles(mut self) -> HashMap<String, Arc<Role>> {
        let mut names: Vec<String> = self.roles.keys().cloned().collect();
        names.sort();
        for name in &names {
            self.flatten_entry(name);
        }

        let mut roles = std::mem::take(&mut self.roles);
        roles
            .drain()
            .map(|(name, mut role)| {
                if let Some(flat) = self.resolved.remove(&name) {
                    role.privileges = flat.privileges;
                    role.admin = flat.admin;
                }
                role.roles.clear();
                consolidate_privileges(&mut role);
                (name, Arc::new(role))
            })
            .collect()
    }
}

/// Replace a role's loose refs with one `Target` ref per privilege, carrying
/// a composite method descriptor. Other refs pass through unchanged, after the
/// consolidated ones.
pub fn consolidate_privileges(role: &mut Role) {
    let mut groups: Vec<(Arc<Privilege>, Vec<&str>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut passthrough = Vec::new();

    for privref in &role.privileges {
        if privref.kind != RefKind::LooseTarget {
            passthrough.push(privref.clone());
            continue;
        }
        let slot = *positions
            .entry(privref.privilege.name.clone())
            .or_insert_with(|| {
                groups.push((privref.privilege.clone(), Vec::new()));
                groups.len() - 1
            });
        if let Some(method) = privref.method.as_deref() {
            groups[slot].1.push(method);
        }
    }

    let mut consolidated: Vec<Arc<PrivilegeRef>> = groups
        .into_iter()
        .map(|(privilege, methods)| {
            Arc::new(PrivilegeRef {
                id: privilege.name.clone(),
                method: method_descriptor(&methods),
                kind: RefKind::Target,
                privilege,
                needs_admin: false,
            })
        })
        .collect();
    consolidated.extend(passthrough);
    role.privileges = consolidated;
}

/// Composite descriptor for a set of observed methods: `r` for any method,
/// `w` for create/update, `d` for delete/update, then `n` and `m` whenever
/// writes are granted.
pub fn method_descriptor(methods: &[&str]) -> Option<String> {
    let mut descriptor = String::new();
    if !methods.is_empty() {
        descriptor.push('r');
    }
    if methods.iter().any(|m| *m == "create" || *m == "update") {
        descriptor.push('w');
    }
    if methods.iter().any(|m| *m == "delete" || *m == "update") {
        descriptor.push('d');
    }
    if descriptor.contains('w') {
        descriptor.push('n');
    }
    if descriptor.contains('w') {
        descriptor.push('m');
    }

    if descriptor.is_empty() {
        None
    } else {
        Some(descriptor)
    }
}
