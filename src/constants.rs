pub(crate) const HEADER_CSP: &str = "content-security-policy";
pub(crate) const HEADER_CSP_REPORT_ONLY: &str = "content-security-policy-report-only";

// Fetch directives
pub(crate) const CHILD_SRC: &str = "child-src";
pub(crate) const CONNECT_SRC: &str = "connect-src";
pub(crate) const DEFAULT_SRC: &str = "default-src";
pub(crate) const FONT_SRC: &str = "font-src";
pub(crate) const FRAME_SRC: &str = "frame-src";
pub(crate) const IMG_SRC: &str = "img-src";
pub(crate) const MANIFEST_SRC: &str = "manifest-src";
pub(crate) const MEDIA_SRC: &str = "media-src";
pub(crate) const OBJECT_SRC: &str = "object-src";
pub(crate) const SCRIPT_SRC: &str = "script-src";
pub(crate) const STYLE_SRC: &str = "style-src";
pub(crate) const WORKER_SRC: &str = "worker-src";

// Document directives
pub(crate) const BASE_URI: &str = "base-uri";
pub(crate) const PLUGIN_TYPES: &str = "plugin-types";
pub(crate) const SANDBOX: &str = "sandbox";
pub(crate) const DISOWN_OPENER: &str = "disown-opener";

// Navigation directives
pub(crate) const FORM_ACTION: &str = "form-action";
pub(crate) const FRAME_ANCESTORS: &str = "frame-ancestors";

// Reporting directives
pub(crate) const REPORT_URI: &str = "report-uri";
pub(crate) const REPORT_TO: &str = "report-to";

// Other directives
pub(crate) const BLOCK_ALL_MIXED_CONTENT: &str = "block-all-mixed-content";
pub(crate) const REQUIRE_SRI_FOR: &str = "require-sri-for";
pub(crate) const UPGRADE_INSECURE_REQUESTS: &str = "upgrade-insecure-requests";

/// The `'self'` source expression.
pub const SELF: &str = "'self'";
/// The `'unsafe-inline'` source expression.
pub const UNSAFE_INLINE: &str = "'unsafe-inline'";
/// The `'none'` source expression.
pub const NONE: &str = "'none'";
/// The `'strict-dynamic'` source expression.
pub const STRICT_DYNAMIC: &str = "'strict-dynamic'";

pub(crate) const NONCE_PREFIX: &str = "'nonce-";
pub(crate) const SUFFIX_QUOTE: &str = "'";

pub(crate) const DIRECTIVE_SEPARATOR: u8 = b';';
pub(crate) const DEFAULT_NONCE_LENGTH: usize = 16;
pub const MIN_NONCE_LENGTH: usize = 16;
pub(crate) const DEFAULT_BUFFER_CAPACITY: usize = 256;
