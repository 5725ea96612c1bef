use crate::constants::{DEFAULT_NONCE_LENGTH, MIN_NONCE_LENGTH, NONCE_PREFIX, SUFFIX_QUOTE};
use crate::core::directives::Directive;
use crate::error::CspError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use getrandom::getrandom;
use log::trace;
use smallvec::{smallvec, SmallVec};
use std::{fmt, ops::Deref, str::FromStr};

/// Produces base64 nonces from the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceGenerator {
    length: usize,
}

impl NonceGenerator {
    /// `length` is the number of random bytes, before encoding. Anything
    /// shorter than [`MIN_NONCE_LENGTH`] is rejected.
    pub fn new(length: usize) -> Result<Self, CspError> {
        if length < MIN_NONCE_LENGTH {
            return Err(CspError::ConfigError(format!(
                "nonce length must be at least {MIN_NONCE_LENGTH} bytes, got {length}"
            )));
        }
        Ok(Self { length })
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> Result<String, CspError> {
        let mut buffer: SmallVec<[u8; 32]> = smallvec![0u8; self.length];
        getrandom(&mut buffer[..]).map_err(|err| CspError::CryptoError(err.to_string()))?;

        trace!("generated {}-byte CSP nonce", self.length);
        Ok(BASE64.encode(&buffer[..]))
    }
}

impl Default for NonceGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_NONCE_LENGTH,
        }
    }
}

/// The directives a nonce may be registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonceTarget {
    Script,
    Style,
}

impl NonceTarget {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
        }
    }

    pub const fn directive(self) -> Directive {
        match self {
            Self::Script => Directive::ScriptSrc,
            Self::Style => Directive::StyleSrc,
        }
    }
}

impl FromStr for NonceTarget {
    type Err = CspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "script" => Ok(Self::Script),
            "style" => Ok(Self::Style),
            other => Err(CspError::InvalidNonceTarget(other.to_owned())),
        }
    }
}

impl fmt::Display for NonceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps a raw nonce as a source expression: `'nonce-<value>'`.
pub fn nonce_source(nonce: &str) -> String {
    let mut source = String::with_capacity(NONCE_PREFIX.len() + nonce.len() + 1);
    source.push_str(NONCE_PREFIX);
    source.push_str(nonce);
    source.push_str(SUFFIX_QUOTE);
    source
}

/// The nonce memoized for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNonce(pub String);

impl Deref for RequestNonce {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
