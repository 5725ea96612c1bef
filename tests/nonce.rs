use actix_content_security::security::{nonce_source, NonceGenerator, NonceTarget, RequestNonce};
use actix_content_security::{CspError, Directive};
use base64::{engine::general_purpose::STANDARD, Engine};

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_nonce_generator_default_length() {
        let generator = NonceGenerator::default();

        assert_eq!(generator.length(), 16);
        let nonce = generator.generate().unwrap();
        assert_eq!(STANDARD.decode(&nonce).unwrap().len(), 16);
    }

    #[test]
    fn test_nonce_generator_different_lengths() {
        let nonce_16 = NonceGenerator::new(16).unwrap().generate().unwrap();
        let nonce_24 = NonceGenerator::new(24).unwrap().generate().unwrap();
        let nonce_32 = NonceGenerator::new(32).unwrap().generate().unwrap();

        assert!(nonce_16.len() < nonce_24.len());
        assert!(nonce_24.len() < nonce_32.len());
        assert_eq!(STANDARD.decode(&nonce_32).unwrap().len(), 32);
    }

    #[test_case(0 ; "empty")]
    #[test_case(8 ; "half")]
    #[test_case(15 ; "one short")]
    fn test_nonce_generator_rejects_short_lengths(length: usize) {
        assert!(matches!(
            NonceGenerator::new(length),
            Err(CspError::ConfigError(message)) if message.contains("at least 16")
        ));
    }

    #[test]
    fn test_nonce_generator_multiple_generations() {
        let generator = NonceGenerator::default();
        let mut nonces: Vec<String> = (0..100).map(|_| generator.generate().unwrap()).collect();

        nonces.sort();
        nonces.dedup();
        assert_eq!(nonces.len(), 100);
    }

    #[test]
    fn test_nonce_target_parsing() {
        assert_eq!("script".parse::<NonceTarget>().unwrap(), NonceTarget::Script);
        assert_eq!("style".parse::<NonceTarget>().unwrap(), NonceTarget::Style);
        assert_eq!(NonceTarget::Script.directive(), Directive::ScriptSrc);
        assert_eq!(NonceTarget::Style.directive(), Directive::StyleSrc);
        assert_eq!(NonceTarget::Style.to_string(), "style");
    }

    #[test]
    fn test_nonce_target_rejects_other_values() {
        for target in ["img", "Script", "", "script-src"] {
            assert!(matches!(
                target.parse::<NonceTarget>(),
                Err(CspError::InvalidNonceTarget(value)) if value == target
            ));
        }
    }

    #[test]
    fn test_nonce_source() {
        assert_eq!(nonce_source("abc123"), "'nonce-abc123'");
    }

    #[test]
    fn test_request_nonce_deref() {
        let request_nonce = RequestNonce("test-nonce-789".to_string());

        assert_eq!(request_nonce.len(), 14);
        assert!(request_nonce.contains("nonce"));
    }
}
