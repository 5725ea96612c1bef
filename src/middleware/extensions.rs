use crate::core::policy::CspPolicy;
use crate::error::CspError;
use crate::middleware::scope::RequestScope;
use crate::security::nonce::NonceTarget;
use actix_web::HttpMessage;
use std::rc::Rc;

/// Request-side access to the CSP state attached by
/// [`CspMiddleware`](super::CspMiddleware).
///
/// None of these methods keep the request extensions borrowed after they
/// return, so they may be freely combined, including from inside the
/// [`csp_policy`](Self::csp_policy) closure.
pub trait CspExtensions {
    /// Runs `f` against this request's own policy.
    ///
    /// The first call forks the default policy; changes never reach the
    /// default or any other request. While `f` runs, a nested `csp_policy`
    /// or `csp_nonce` on the same request fails with
    /// [`CspError::PolicyInUse`].
    fn csp_policy<R, F>(&self, f: F) -> Result<R, CspError>
    where
        F: FnOnce(&mut CspPolicy) -> R;

    /// Whether this request has forked its own policy.
    fn has_custom_csp_policy(&self) -> bool;

    /// Returns the request nonce and allows it for `target` (`"script"` or
    /// `"style"`).
    ///
    /// A request gets one nonce, no matter how often or for which target it
    /// is asked for.
    fn csp_nonce(&self, target: &str) -> Result<String, CspError>;

    /// The nonce of this request, if one was generated.
    fn get_nonce(&self) -> Option<String>;
}

fn request_scope<T: HttpMessage>(msg: &T) -> Option<Rc<RequestScope>> {
    msg.extensions().get::<Rc<RequestScope>>().cloned()
}

impl<T> CspExtensions for T
where
    T: HttpMessage,
{
    fn csp_policy<R, F>(&self, f: F) -> Result<R, CspError>
    where
        F: FnOnce(&mut CspPolicy) -> R,
    {
        request_scope(self)
            .ok_or(CspError::MissingScope)?
            .with_policy(f)
    }

    fn has_custom_csp_policy(&self) -> bool {
        request_scope(self).is_some_and(|scope| scope.has_custom_policy())
    }

    fn csp_nonce(&self, target: &str) -> Result<String, CspError> {
        let target: NonceTarget = target.parse()?;
        request_scope(self)
            .ok_or(CspError::MissingScope)?
            .nonce_for(target)
    }

    fn get_nonce(&self) -> Option<String> {
        request_scope(self).and_then(|scope| scope.nonce().map(str::to_owned))
    }
}
