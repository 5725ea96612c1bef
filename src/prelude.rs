pub use crate::constants::{NONE, SELF, STRICT_DYNAMIC, UNSAFE_INLINE};
pub use crate::core::{
    CspConfig, CspConfigBuilder, CspPolicy, CspPolicyBuilder, CspPolicySettings, Directive,
    SourceSet,
};
pub use crate::middleware::{configure_csp, csp_middleware, CspExtensions, CspMiddleware};
pub use crate::security::{NonceGenerator, NonceTarget};
