use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::RefreshError;
use crate::security::baseline::Baseline;
use crate::security::document::SecurityDocument;
use crate::security::errors::SecurityError;
use crate::security::pattern::PatternConverter;
use crate::security::privileges::{build_view_privileges, resolve_privileges};
use crate::security::roles::{resolve_roles, RoleGraph};
use crate::security::targets::resolve_targets;
use crate::security::types::{Repository, Target};
use crate::security::users::resolve_users;
use crate::security::ResolvedModel;

/// Location of the security config inside a Nexus work directory.
pub fn security_config_path(instance: &Path) -> PathBuf {
    instance.join("conf").join("security.xml")
}

/// Compiles security.xml into a `ResolvedModel` and holds the latest
/// successful result. A failed refresh leaves the held model untouched.
pub struct SecurityCompiler {
    baseline: Box<dyn Baseline + Send + Sync>,
    converter: Box<dyn PatternConverter + Send + Sync>,
    model: RwLock<Option<Arc<ResolvedModel>>>,
}

impl SecurityCompiler {
    pub fn new<B, C>(baseline: B, converter: C) -> Self
    where
        B: Baseline + Send + Sync + 'static,
        C: PatternConverter + Send + Sync + 'static,
    {
        Self {
            baseline: Box::new(baseline),
            converter: Box::new(converter),
            model: RwLock::new(None),
        }
    }

    /// Drop the held model.
    pub fn initialize(&self) {
        *self.model.write() = None;
    }

    /// The most recent successfully compiled model, if any.
    pub fn model(&self) -> Option<Arc<ResolvedModel>> {
        self.model.read().clone()
    }

    /// Read `<instance>/conf/security.xml` and replace the held model with its
    /// resolution. Details of any failure are logged; callers only get the
    /// generic `RefreshError`.
    pub fn refresh(
        &self,
        instance: &Path,
        user_targets: HashMap<String, Target>,
        repositories: &[Repository],
    ) -> Result<(), RefreshError> {
        let config = security_config_path(instance);
        tracing::info!(path = %config.display(), "Reading security config");
        if !config.is_file() {
            tracing::error!(path = %config.display(), "Security config file does not exist");
            return Err(RefreshError::NotAnInstance);
        }

        let model = SecurityDocument::load(&config)
            .and_then(|doc| self.compile(&doc, user_targets, repositories))
            .map_err(|e| {
                tracing::error!(error = ?e, "Error reading security config: {e}");
                RefreshError::InvalidConfig
            })?;

        tracing::info!(
            users = model.users.len(),
            roles = model.roles.len(),
            privileges = model.privileges.len(),
            privilege_refs = model.privilege_refs.len(),
            "Successfully read security config"
        );
        *self.model.write() = Some(Arc::new(model));
        Ok(())
    }

    /// Resolve a parsed document. Built-ins come first at every stage and are
    /// overridden by document entries with the same key.
    pub fn compile(
        &self,
        document: &SecurityDocument,
        user_targets: HashMap<String, Target>,
        repositories: &[Repository],
    ) -> Result<ResolvedModel, SecurityError> {
        let mut targets = self.baseline.targets();
        targets.extend(resolve_targets(
            document.repository_targets.as_ref(),
            self.converter.as_ref(),
        )?);
        targets.extend(user_targets);

        let mut privileges = self.baseline.privileges(&targets);
        let mut privilege_refs = self.baseline.privilege_refs(&privileges);
        privilege_refs.extend(build_view_privileges(repositories));

        let resolved = resolve_privileges(document.privileges.as_ref(), &targets)?;
        privileges.extend(resolved.privileges);
        privilege_refs.extend(resolved.refs);

        let mut roles = self.baseline.roles(&privilege_refs);
        roles.extend(resolve_roles(document.roles.as_ref(), &privilege_refs)?);
        let roles = RoleGraph::new(roles).into_roles();

        let users = resolve_users(
            document.users.as_ref(),
            document.user_role_mappings.as_ref(),
            &roles,
        )?;

        Ok(ResolvedModel {
            users,
            roles,
            privileges,
            privilege_refs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::baseline::{BaselineDefinitions, BuiltinPrivilege, BuiltinRole, NoBaseline, StaticBaseline};
    use crate::security::pattern::GlobPatternConverter;
    use crate::security::types::{PatternConversion, RefKind};

    const DOC: &str = r#"<security>
  <repositoryTargets>
    <repositoryTarget>
      <id>T</id>
      <contentClass>maven2</contentClass>
      <patterns><pattern>**/*.jar</pattern></patterns>
    </repositoryTarget>
  </repositoryTargets>
  <privileges>
    <privilege>
      <id>t-read</id>
      <name>Read T - (read)</name>
      <properties>
        <property><key>method</key><value>read</value></property>
        <property><key>repositoryTargetId</key><value>T</value></property>
        <property><key>repositoryId</key><value></value></property>
        <property><key>repositoryGroupId</key><value></value></property>
      </properties>
    </privilege>
  </privileges>
  <roles>
    <role>
      <id>dev</id>
      <privileges><privilege>t-read</privilege></privileges>
      <roles><role>nx-admin</role></roles>
    </role>
  </roles>
  <users>
    <user><id>alice</id><email>alice@example.org</email><status>active</status></user>
  </users>
  <userRoleMappings>
    <userRoleMapping>
      <userId>alice</userId>
      <source>default</source>
      <roles><role>dev</role></roles>
    </userRoleMapping>
  </userRoleMappings>
</security>"#;

    fn compiler() -> SecurityCompiler {
        SecurityCompiler::new(NoBaseline, GlobPatternConverter::default())
    }

    #[test]
    fn test_compile_document() {
        let doc = SecurityDocument::parse(DOC).unwrap();
        let model = compiler()
            .compile(&doc, HashMap::new(), &[Repository::new("libs")])
            .unwrap();

        let read_t = &model.privileges["Read T"];
        assert_eq!(read_t.repo_ref, "*");
        assert_eq!(read_t.patterns, vec!["**/*.jar"]);

        let dev = &model.roles["dev"];
        assert_eq!(dev.privileges.len(), 1);
        assert_eq!(dev.privileges[0].kind, RefKind::Target);
        assert_eq!(dev.privileges[0].method.as_deref(), Some("r"));

        assert_eq!(model.privilege_refs["repository-libs"].kind, RefKind::View);
        assert_eq!(model.users["alice"].realm, "internal");
        assert!(Arc::ptr_eq(&model.users["alice"].roles[0], dev));
    }

    #[test]
    fn test_user_targets_override_document_targets() {
        let doc = SecurityDocument::parse(DOC).unwrap();
        let override_t = Target {
            name: "T".into(),
            content_type: "npm".into(),
            patterns: vec![],
            conversion: PatternConversion::Resolved {
                include: vec![],
                exclude: vec![],
            },
        };
        let model = compiler()
            .compile(&doc, HashMap::from([("T".to_string(), override_t)]), &[])
            .unwrap();
        assert_eq!(model.privileges["Read T"].content_type.as_deref(), Some("npm"));
    }

    #[test]
    fn test_baseline_roles_are_inherited() {
        let defs = BaselineDefinitions {
            targets: vec![],
            privileges: vec![BuiltinPrivilege {
                id: "admin-all".into(),
                name: "Administrator".into(),
                method: "update".into(),
                target: None,
                repo_ref: "*".into(),
            }],
            roles: vec![BuiltinRole {
                group_name: "nx-admin".into(),
                description: String::new(),
                privileges: vec!["admin-all".into()],
                roles: vec![],
                admin: true,
            }],
        };
        let converter = GlobPatternConverter::default();
        let compiler = SecurityCompiler::new(StaticBaseline::new(&defs, &converter), converter);
        let doc = SecurityDocument::parse(DOC).unwrap();
        let model = compiler.compile(&doc, HashMap::new(), &[]).unwrap();

        let dev = &model.roles["dev"];
        assert!(dev.admin);
        assert!(!dev.builtin);
        assert_eq!(dev.privileges.len(), 2);
        assert!(model.roles["nx-admin"].builtin);
        let admin_ref = dev
            .privileges
            .iter()
            .find(|p| p.id == "Administrator")
            .unwrap();
        assert_eq!(admin_ref.method.as_deref(), Some("rwdnm"));
    }

    #[test]
    fn test_refresh_missing_instance_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = compiler();
        let err = compiler.refresh(dir.path(), HashMap::new(), &[]).unwrap_err();
        assert_eq!(err, RefreshError::NotAnInstance);
        assert!(compiler.model().is_none());
    }

    #[test]
    fn test_refresh_invalid_config_keeps_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("conf");
        std::fs::create_dir_all(&conf).unwrap();
        std::fs::write(conf.join("security.xml"), DOC).unwrap();

        let compiler = compiler();
        compiler.refresh(dir.path(), HashMap::new(), &[]).unwrap();
        let before = compiler.model().unwrap();

        std::fs::write(conf.join("security.xml"), "<security><roles><role></roles>").unwrap();
        let err = compiler.refresh(dir.path(), HashMap::new(), &[]).unwrap_err();
        assert_eq!(err, RefreshError::InvalidConfig);
        assert!(Arc::ptr_eq(&before, &compiler.model().unwrap()));

        compiler.initialize();
        assert!(compiler.model().is_none());
    }
}
