use std::path::Path;

use tempfile::TempDir;

/// Builder for a repository target entry
pub struct TargetBuilder {
    id: String,
    content_class: String,
    patterns: Vec<String>,
}

impl TargetBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            content_class: "maven2".to_string(),
            patterns: Vec::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    fn to_xml(&self) -> String {
        let patterns: String = self
            .patterns
            .iter()
            .map(|p| format!("<pattern>{p}</pattern>"))
            .collect();
        format!(
            "<repositoryTarget><id>{}</id><contentClass>{}</contentClass><patterns>{}</patterns></repositoryTarget>",
            self.id, self.content_class, patterns
        )
    }
}

/// Builder for a target privilege entry
pub struct PrivilegeBuilder {
    id: String,
    name: String,
    method: String,
    target: Option<String>,
    repository: Option<String>,
    group: Option<String>,
}

impl PrivilegeBuilder {
    pub fn new(id: &str, name: &str, method: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            method: method.to_string(),
            target: None,
            repository: None,
            group: None,
        }
    }

    pub fn on_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn on_repository(mut self, repository: &str) -> Self {
        self.repository = Some(repository.to_string());
        self
    }

    pub fn on_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    fn to_xml(&self) -> String {
        let prop = |key: &str, value: &Option<String>| {
            format!(
                "<property><key>{key}</key><value>{}</value></property>",
                value.as_deref().unwrap_or("")
            )
        };
        format!(
            "<privilege><id>{}</id><name>{}</name><type>target</type><properties>{}{}{}{}</properties></privilege>",
            self.id,
            self.name,
            prop("method", &Some(self.method.clone())),
            prop("repositoryTargetId", &self.target),
            prop("repositoryId", &self.repository),
            prop("repositoryGroupId", &self.group),
        )
    }
}

/// Builder for a role entry
pub struct RoleBuilder {
    id: String,
    description: Option<String>,
    privileges: Vec<String>,
    roles: Vec<String>,
}

impl RoleBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            description: None,
            privileges: Vec::new(),
            roles: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_privilege(mut self, id: &str) -> Self {
        self.privileges.push(id.to_string());
        self
    }

    pub fn with_role(mut self, name: &str) -> Self {
        self.roles.push(name.to_string());
        self
    }

    fn to_xml(&self) -> String {
        let description = self
            .description
            .as_ref()
            .map(|d| format!("<description>{d}</description>"))
            .unwrap_or_default();
        let privileges: String = self
            .privileges
            .iter()
            .map(|p| format!("<privilege>{p}</privilege>"))
            .collect();
        let roles: String = self.roles.iter().map(|r| format!("<role>{r}</role>")).collect();
        format!(
            "<role><id>{}</id><name>{}</name>{}<privileges>{}</privileges><roles>{}</roles></role>",
            self.id, self.id, description, privileges, roles
        )
    }
}

/// Builds a security.xml document, optionally writing it into a fake Nexus
/// work directory.
#[derive(Default)]
pub struct SecurityXmlBuilder {
    targets: Option<Vec<TargetBuilder>>,
    privileges: Option<Vec<PrivilegeBuilder>>,
    roles: Option<Vec<RoleBuilder>>,
    users: Option<Vec<(String, String)>>,
    mappings: Option<Vec<(String, String, Vec<String>)>>,
}

impl SecurityXmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: TargetBuilder) -> Self {
        self.targets.get_or_insert_with(Vec::new).push(target);
        self
    }

    pub fn privilege(mut self, privilege: PrivilegeBuilder) -> Self {
        self.privileges.get_or_insert_with(Vec::new).push(privilege);
        self
    }

    pub fn role(mut self, role: RoleBuilder) -> Self {
        self.roles.get_or_insert_with(Vec::new).push(role);
        self
    }

    pub fn user(mut self, id: &str, status: &str) -> Self {
        self.users
            .get_or_insert_with(Vec::new)
            .push((id.to_string(), status.to_string()));
        self
    }

    pub fn mapping(mut self, user: &str, source: &str, roles: &[&str]) -> Self {
        self.mappings.get_or_insert_with(Vec::new).push((
            user.to_string(),
            source.to_string(),
            roles.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    /// Emit an empty `<userRoleMappings/>` section.
    pub fn empty_mappings(mut self) -> Self {
        self.mappings.get_or_insert_with(Vec::new);
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<security><version>2.0.5</version>");
        if let Some(users) = &self.users {
            xml.push_str("<users>");
            for (id, status) in users {
                xml.push_str(&format!(
                    "<user><id>{id}</id><firstName>{id}</firstName><email>{id}@example.org</email><status>{status}</status></user>"
                ));
            }
            xml.push_str("</users>");
        }
        if let Some(roles) = &self.roles {
            xml.push_str("<roles>");
            roles.iter().for_each(|r| xml.push_str(&r.to_xml()));
            xml.push_str("</roles>");
        }
        if let Some(privileges) = &self.privileges {
            xml.push_str("<privileges>");
            privileges.iter().for_each(|p| xml.push_str(&p.to_xml()));
            xml.push_str("</privileges>");
        }
        if let Some(targets) = &self.targets {
            xml.push_str("<repositoryTargets>");
            targets.iter().for_each(|t| xml.push_str(&t.to_xml()));
            xml.push_str("</repositoryTargets>");
        }
        if let Some(mappings) = &self.mappings {
            xml.push_str("<userRoleMappings>");
            for (user, source, roles) in mappings {
                let roles: String = roles.iter().map(|r| format!("<role>{r}</role>")).collect();
                xml.push_str(&format!(
                    "<userRoleMapping><userId>{user}</userId><source>{source}</source><roles>{roles}</roles></userRoleMapping>"
                ));
            }
            xml.push_str("</userRoleMappings>");
        }
        xml.push_str("</security>");
        xml
    }

    /// Write the document to `<tempdir>/conf/security.xml`.
    pub fn write_instance(&self) -> TempDir {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_security_xml(dir.path(), &self.to_xml());
        dir
    }
}

pub fn write_security_xml(instance: &Path, contents: &str) {
    let conf = instance.join("conf");
    std::fs::create_dir_all(&conf).expect("Failed to create conf dir");
    std::fs::write(conf.join("security.xml"), contents).expect("Failed to write security.xml");
}
