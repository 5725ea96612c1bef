use actix_content_security::{
    CspConfigBuilder, CspError, CspPolicy, CspPolicySettings, Directive, SELF,
};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(value: serde_json::Value) -> CspPolicySettings {
        serde_json::from_value(value).expect("settings should deserialize")
    }

    #[test]
    fn test_settings_build_policy() {
        let policy = settings(json!({
            "directives": {
                "default-src": ["'self'", "https://example.org"],
                "report_uri": "/csp-report",
                "upgrade-insecure-requests": true
            }
        }))
        .to_policy()
        .unwrap();

        assert!(!policy.is_report_only());
        assert_eq!(
            policy.text(),
            "default-src 'self' https://example.org;report-uri /csp-report;upgrade-insecure-requests"
        );
    }

    #[test]
    fn test_settings_defaults() {
        let settings = CspPolicySettings::from_json("{}").unwrap();

        assert_eq!(settings, CspPolicySettings::default());
        assert!(settings.to_policy().unwrap().is_empty());
    }

    #[test]
    fn test_settings_reject_null() {
        let result = settings(json!({ "directives": { "block-all-mixed-content": null } })).to_policy();

        assert!(matches!(
            result,
            Err(CspError::TypeMismatch {
                directive: "block-all-mixed-content",
                found: "null",
                ..
            })
        ));
    }

    #[test]
    fn test_settings_reject_null_single_value() {
        let result = settings(json!({ "directives": { "sandbox": null } })).to_policy();
        assert!(matches!(result, Err(CspError::TypeMismatch { directive: "sandbox", .. })));
    }

    #[test]
    fn test_settings_reject_wrong_shapes() {
        for (name, value) in [
            ("img-src", json!("data:")),
            ("img-src", json!([1, 2])),
            ("report-to", json!(["endpoint"])),
            ("report-to", json!(42)),
            ("disown-opener", json!({ "enabled": true })),
        ] {
            let result = settings(json!({ "directives": { name: value } })).to_policy();
            assert!(
                matches!(result, Err(CspError::TypeMismatch { .. })),
                "{name} accepted a wrongly shaped value"
            );
        }
    }

    #[test]
    fn test_settings_reject_unknown_directive() {
        let result = settings(json!({ "directives": { "navigate-to": ["'self'"] } })).to_policy();
        assert!(matches!(result, Err(CspError::UnknownDirective(name)) if name == "navigate-to"));
    }

    #[test]
    fn test_settings_invalid_json() {
        assert!(matches!(
            CspPolicySettings::from_json("{ not json"),
            Err(CspError::ConfigError(_))
        ));
    }

    #[test]
    fn test_config_builder_from_settings() {
        let settings = settings(json!({
            "report_only": true,
            "directives": { "default-src": ["'self'"] }
        }));

        let config = CspConfigBuilder::new()
            .settings(&settings)
            .unwrap()
            .with_nonce_length(32)
            .unwrap()
            .build();

        assert!(config.default_policy().is_report_only());
        assert_eq!(config.default_policy().text(), "default-src 'self'");
        assert_eq!(config.nonce_generator().length(), 32);
    }

    #[test]
    fn test_config_builder_rejects_short_nonce_length() {
        let result = CspConfigBuilder::new().with_nonce_length(0);
        assert!(matches!(result, Err(CspError::ConfigError(_))));
    }

    #[test]
    fn test_config_builder_policy_with() {
        let config = CspConfigBuilder::new()
            .policy_with(|| {
                let mut policy = CspPolicy::default();
                policy.sources(Directive::DefaultSrc)?.insert(SELF);
                Ok(policy)
            })
            .unwrap()
            .build();

        assert_eq!(config.default_policy().text(), "default-src 'self'");
    }

    #[test]
    fn test_config_builder_policy_with_error() {
        let result = CspConfigBuilder::new()
            .policy_with(|| CspPolicy::from_directives(false, [("nope", true)]));

        assert!(matches!(result, Err(CspError::UnknownDirective(_))));
    }
}
