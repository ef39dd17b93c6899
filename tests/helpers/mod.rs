pub mod builders;

pub use builders::{
    write_security_xml, PrivilegeBuilder, RoleBuilder, SecurityXmlBuilder, TargetBuilder,
};
