//! Content Security Policy headers for Actix Web.
//!
//! A process-wide default [`CspPolicy`] is configured once at startup and
//! wrapped in [`CspMiddleware`]. Handlers that need a different policy for
//! one request (extra sources, a nonce for inline markup) use
//! [`CspExtensions`]; the request then gets its own copy of the default and
//! the default itself is never modified.
//!
//! ```no_run
//! use actix_content_security::prelude::*;
//! use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
//!
//! async fn index(req: HttpRequest) -> actix_web::Result<HttpResponse> {
//!     let nonce = req.csp_nonce("script")?;
//!     Ok(HttpResponse::Ok().body(format!("<script nonce=\"{nonce}\"></script>")))
//! }
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     HttpServer::new(|| {
//!         let policy = CspPolicyBuilder::new()
//!             .default_src([SELF])
//!             .object_src([NONE])
//!             .build_unchecked();
//!
//!         App::new()
//!             .wrap(csp_middleware(policy))
//!             .route("/", web::get().to(index))
//!     })
//!     .bind(("127.0.0.1", 8080))?
//!     .run()
//!     .await
//! }
//! ```

pub mod constants;
pub mod core;
pub mod error;
pub mod middleware;
pub mod prelude;
pub mod security;

pub use constants::{NONE, SELF, STRICT_DYNAMIC, UNSAFE_INLINE};
pub use crate::core::{
    CspConfig, CspConfigBuilder, CspPolicy, CspPolicyBuilder, CspPolicySettings, Directive,
    DirectiveField, DirectiveKind, DirectiveValue, SourceSet,
};
pub use error::CspError;
pub use middleware::{configure_csp, csp_middleware, CspExtensions, CspMiddleware};
pub use security::{NonceGenerator, NonceTarget, RequestNonce};
