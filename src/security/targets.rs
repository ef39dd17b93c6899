use std::collections::HashMap;

use crate::security::document::RepositoryTargetsSection;
use crate::security::errors::SecurityError;
use crate::security::pattern::PatternConverter;
use crate::security::types::{PatternConversion, Target};

/// Extract repository targets from the document. A missing section yields no
/// targets; a target whose patterns fail to convert is kept with a
/// `PatternConversion::Failed` marker.
pub fn resolve_targets(
    section: Option<&RepositoryTargetsSection>,
    converter: &dyn PatternConverter,
) -> Result<HashMap<String, Target>, SecurityError> {
    let mut targets = HashMap::new();
    let Some(section) = section else {
        return Ok(targets);
    };

    for record in &section.targets {
        let name = record.id.clone().ok_or(SecurityError::MissingField {
            record: "repositoryTarget",
            field: "id",
        })?;
        tracing::debug!(repository_target = %name, "Extracting repository target");
        let content_type = record.content_class.clone().ok_or(SecurityError::MissingField {
            record: "repositoryTarget",
            field: "contentClass",
        })?;

        let target = build_target(name, content_type, record.patterns.patterns.clone(), converter);
        targets.insert(target.name.clone(), target);
    }

    Ok(targets)
}

/// Build a target, converting its patterns through `converter`.
pub fn build_target(
    name: String,
    content_type: String,
    patterns: Vec<String>,
    converter: &dyn PatternConverter,
) -> Target {
    let conversion = match converter.convert(&patterns) {
        Ok((include, exclude)) => PatternConversion::Resolved { include, exclude },
        Err(e) => {
            if tracing::enabled!(tracing::Level::DEBUG) {
                tracing::debug!(
                    repository_target = %name,
                    error = ?e,
                    "Unable to convert patterns for repository target"
                );
            } else {
                tracing::warn!(
                    repository_target = %name,
                    "Unable to convert patterns for repository target: {e}"
                );
            }
            PatternConversion::Failed {
                message: e.to_string(),
            }
        }
    };

    Target {
        name,
        content_type,
        patterns,
        conversion,
    }
}
