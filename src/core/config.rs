use crate::core::directives::{Directive, DirectiveValue};
use crate::core::policy::CspPolicy;
use crate::error::CspError;
use crate::security::nonce::NonceGenerator;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Process-wide CSP configuration.
///
/// The default policy is frozen once the config is built; requests that
/// want to change it work on their own fork.
#[derive(Debug, Clone)]
pub struct CspConfig {
    default_policy: Arc<CspPolicy>,
    nonce_generator: NonceGenerator,
}

impl CspConfig {
    pub fn new(policy: CspPolicy) -> Self {
        Self {
            default_policy: Arc::new(policy),
            nonce_generator: NonceGenerator::default(),
        }
    }

    #[inline]
    pub fn default_policy(&self) -> &CspPolicy {
        &self.default_policy
    }

    #[inline]
    pub fn nonce_generator(&self) -> &NonceGenerator {
        &self.nonce_generator
    }

    #[inline]
    pub fn generate_nonce(&self) -> Result<String, CspError> {
        self.nonce_generator.generate()
    }
}

impl Default for CspConfig {
    fn default() -> Self {
        Self::new(CspPolicy::default())
    }
}

#[derive(Default)]
pub struct CspConfigBuilder {
    policy: Option<CspPolicy>,
    nonce_generator: Option<NonceGenerator>,
}

impl CspConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn policy(mut self, policy: CspPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Uses the policy returned by `factory` as the default.
    pub fn policy_with<F>(mut self, factory: F) -> Result<Self, CspError>
    where
        F: FnOnce() -> Result<CspPolicy, CspError>,
    {
        self.policy = Some(factory()?);
        Ok(self)
    }

    pub fn settings(mut self, settings: &CspPolicySettings) -> Result<Self, CspError> {
        self.policy = Some(settings.to_policy()?);
        Ok(self)
    }

    /// Fails with [`CspError::ConfigError`] for lengths below
    /// [`MIN_NONCE_LENGTH`](crate::constants::MIN_NONCE_LENGTH).
    pub fn with_nonce_length(mut self, length: usize) -> Result<Self, CspError> {
        self.nonce_generator = Some(NonceGenerator::new(length)?);
        Ok(self)
    }

    pub fn build(self) -> CspConfig {
        let mut config = CspConfig::new(self.policy.unwrap_or_default());

        if let Some(generator) = self.nonce_generator {
            config.nonce_generator = generator;
        }

        config
    }
}

/// Serializable form of a default policy, as found in application settings.
///
/// ```
/// use actix_content_security::CspPolicySettings;
///
/// let settings = CspPolicySettings::from_json(
///     r#"{"report_only": true, "directives": {"default-src": ["'self'"], "sandbox": "allow-forms"}}"#,
/// )?;
/// let policy = settings.to_policy()?;
///
/// assert!(policy.is_report_only());
/// assert_eq!(policy.text(), "default-src 'self';sandbox allow-forms");
/// # Ok::<(), actix_content_security::CspError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CspPolicySettings {
    pub report_only: bool,
    pub directives: IndexMap<String, serde_json::Value>,
}

impl CspPolicySettings {
    pub fn from_json(text: &str) -> Result<Self, CspError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_policy(&self) -> Result<CspPolicy, CspError> {
        let mut policy = CspPolicy::new(self.report_only);
        for (name, value) in &self.directives {
            let directive: Directive = name.parse()?;
            policy.set(directive, DirectiveValue::from_json(directive, value)?)?;
        }
        Ok(policy)
    }
}

impl From<&CspPolicy> for CspPolicySettings {
    fn from(policy: &CspPolicy) -> Self {
        use serde_json::Value;

        let directives = policy
            .fields()
            .filter(|field| field.is_active())
            .filter_map(|field| {
                let value = match field.value()? {
                    DirectiveValue::Set(sources) => Value::Array(
                        sources
                            .sorted()
                            .into_iter()
                            .map(|source| Value::String(source.to_owned()))
                            .collect(),
                    ),
                    DirectiveValue::Single(text) => Value::String(text.clone()),
                    DirectiveValue::Flag(flag) => Value::Bool(*flag),
                };
                Some((field.name().to_owned(), value))
            })
            .collect();

        Self {
            report_only: policy.is_report_only(),
            directives,
        }
    }
}
