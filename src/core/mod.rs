pub mod config;
pub mod directives;
pub mod policy;

pub use config::{CspConfig, CspConfigBuilder, CspPolicySettings};
pub use directives::{Directive, DirectiveField, DirectiveKind, DirectiveValue, SourceSet};
pub use policy::{CspPolicy, CspPolicyBuilder};
