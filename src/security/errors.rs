use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SecurityError {
    #[error("Failed to read security config `{path}`")]
    #[diagnostic(
        code(security_resolver::security::read),
        help("Check that the file is readable by the current user")
    )]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed security config: {0}")]
    #[diagnostic(
        code(security_resolver::security::xml),
        help("The file must be a well-formed Nexus security.xml document")
    )]
    Xml(#[from] quick_xml::DeError),

    #[error("{record} record is missing required element `{field}`")]
    #[diagnostic(
        code(security_resolver::security::missing_field),
        help("Every {record} in security.xml must carry a `{field}` element")
    )]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("Privilege `{privilege}` is missing required property `{key}`")]
    #[diagnostic(
        code(security_resolver::security::missing_property),
        help("Target privileges need a <property> with <key>{key}</key> and a <value>")
    )]
    MissingProperty { privilege: String, key: &'static str },
}

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("too many patterns ({count}, at most {max} are supported)")]
    #[diagnostic(code(security_resolver::pattern::too_many))]
    TooMany { count: usize, max: usize },

    #[error("empty pattern")]
    #[diagnostic(code(security_resolver::pattern::empty))]
    Empty,

    #[error("invalid pattern `{pattern}`: {message}")]
    #[diagnostic(
        code(security_resolver::pattern::syntax),
        help("Patterns are globs such as `**/*.jar`; prefix with `!` to exclude")
    )]
    Syntax { pattern: String, message: String },
}
