use crate::core::config::CspConfig;
use crate::core::policy::CspPolicy;
use crate::error::CspError;
use crate::security::nonce::{nonce_source, NonceTarget, RequestNonce};
use log::debug;
use std::cell::{OnceCell, RefCell};
use std::sync::Arc;

/// Per-request CSP state, stored in the request extensions as an
/// `Rc<RequestScope>` by [`CspMiddleware`](super::CspMiddleware).
///
/// `policy` stays `None` until something asks for a mutable policy; the
/// default is forked at that point, never before. The nonce is written once.
pub(crate) struct RequestScope {
    config: Arc<CspConfig>,
    policy: RefCell<Option<CspPolicy>>,
    nonce: OnceCell<RequestNonce>,
}

impl RequestScope {
    pub(crate) fn new(config: Arc<CspConfig>) -> Self {
        Self {
            config,
            policy: RefCell::new(None),
            nonce: OnceCell::new(),
        }
    }

    /// Runs `f` against the request policy, forking the default first if
    /// needed. Fails with [`CspError::PolicyInUse`] when called from inside
    /// another `with_policy`.
    pub(crate) fn with_policy<R, F>(&self, f: F) -> Result<R, CspError>
    where
        F: FnOnce(&mut CspPolicy) -> R,
    {
        let mut slot = self
            .policy
            .try_borrow_mut()
            .map_err(|_| CspError::PolicyInUse)?;
        let policy = slot.get_or_insert_with(|| {
            debug!("forking default CSP policy for request");
            self.config.default_policy().fork()
        });
        Ok(f(policy))
    }

    /// A policy that is currently borrowed has necessarily been forked.
    pub(crate) fn has_custom_policy(&self) -> bool {
        self.policy.try_borrow().map_or(true, |slot| slot.is_some())
    }

    #[inline]
    pub(crate) fn nonce(&self) -> Option<&str> {
        self.nonce.get().map(|nonce| nonce.as_str())
    }

    /// Returns the request's nonce, generating it on first use, and registers
    /// it with the `target` directive of the request policy.
    pub(crate) fn nonce_for(&self, target: NonceTarget) -> Result<String, CspError> {
        self.with_policy(|policy| -> Result<String, CspError> {
            let nonce = match self.nonce.get() {
                Some(nonce) => nonce,
                None => {
                    let fresh = self.config.generate_nonce()?;
                    self.nonce.get_or_init(|| RequestNonce(fresh))
                }
            };

            policy
                .sources(target.directive())?
                .insert(nonce_source(nonce.as_str()));
            Ok(nonce.0.clone())
        })?
    }

    /// Hands out the forked policy, if the request made one.
    pub(crate) fn take_policy(&self) -> Option<CspPolicy> {
        self.policy.try_borrow_mut().ok().and_then(|mut slot| slot.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SELF;
    use crate::core::directives::Directive;

    fn scope_with_default() -> RequestScope {
        let mut policy = CspPolicy::default();
        policy.sources(Directive::DefaultSrc).unwrap().insert(SELF);
        RequestScope::new(Arc::new(CspConfig::new(policy)))
    }

    #[test]
    fn test_untouched_scope_has_no_fork() {
        let scope = scope_with_default();
        assert!(!scope.has_custom_policy());
        assert!(scope.nonce().is_none());
        assert!(scope.take_policy().is_none());
    }

    #[test]
    fn test_fork_does_not_touch_default() {
        let scope = scope_with_default();
        scope
            .with_policy(|policy| {
                policy
                    .sources(Directive::DefaultSrc)
                    .map(|sources| sources.insert("https://example.org"))
            })
            .unwrap()
            .unwrap();

        assert!(scope.has_custom_policy());
        assert_eq!(scope.config.default_policy().text(), "default-src 'self'");
        assert_eq!(
            scope.take_policy().unwrap().text(),
            "default-src 'self' https://example.org"
        );
    }

    #[test]
    fn test_nonce_is_shared_between_targets() {
        let scope = scope_with_default();
        let script = scope.nonce_for(NonceTarget::Script).unwrap();
        let style = scope.nonce_for(NonceTarget::Style).unwrap();
        let again = scope.nonce_for(NonceTarget::Script).unwrap();

        assert_eq!(script, style);
        assert_eq!(script, again);
        assert_eq!(scope.nonce(), Some(script.as_str()));

        let policy = scope.take_policy().unwrap();
        let source = nonce_source(&script);
        assert_eq!(policy.field(Directive::ScriptSrc).to_string(), format!("script-src {source}"));
        assert_eq!(policy.field(Directive::StyleSrc).to_string(), format!("style-src {source}"));
    }

    #[test]
    fn test_nested_access_is_rejected_without_panicking() {
        let scope = scope_with_default();

        let (nested_policy, nested_nonce, custom) = scope
            .with_policy(|_| {
                (
                    scope.with_policy(|_| ()),
                    scope.nonce_for(NonceTarget::Script),
                    scope.has_custom_policy(),
                )
            })
            .unwrap();

        assert!(matches!(nested_policy, Err(CspError::PolicyInUse)));
        assert!(matches!(nested_nonce, Err(CspError::PolicyInUse)));
        assert!(custom);
        assert!(scope.nonce().is_none());

        assert!(scope.nonce_for(NonceTarget::Script).is_ok());
    }
}
