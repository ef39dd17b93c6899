use crate::security::errors::PatternError;

/// Default cap on patterns per target.
pub const DEFAULT_MAX_PATTERNS: usize = 10;

/// Converts a target's pattern list into include and exclude matcher sets.
pub trait PatternConverter {
    fn convert(&self, patterns: &[String]) -> Result<(Vec<String>, Vec<String>), PatternError>;
}

/// Glob-based converter. A leading `!` marks an exclusion; every pattern must
/// be a valid glob.
#[derive(Debug, Clone, Copy)]
pub struct GlobPatternConverter {
    max_patterns: usize,
}

impl GlobPatternConverter {
    pub fn new(max_patterns: usize) -> Self {
        Self { max_patterns }
    }
}

impl Default for GlobPatternConverter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PATTERNS)
    }
}

impl PatternConverter for GlobPatternConverter {
    fn convert(&self, patterns: &[String]) -> Result<(Vec<String>, Vec<String>), PatternError> {
        if patterns.len() > self.max_patterns {
            return Err(PatternError::TooMany {
                count: patterns.len(),
                max: self.max_patterns,
            });
        }

        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for raw in patterns {
            let raw = raw.trim();
            let (glob, negated) = match raw.strip_prefix('!') {
                Some(rest) => (rest.trim_start(), true),
                None => (raw, false),
            };
            if glob.is_empty() {
                return Err(PatternError::Empty);
            }
            glob::Pattern::new(glob).map_err(|e| PatternError::Syntax {
                pattern: raw.to_string(),
                message: e.to_string(),
            })?;
            if negated {
                exclude.push(glob.to_string());
            } else {
                include.push(glob.to_string());
            }
        }

        Ok((include, exclude))
    }
}
