pub mod nonce;

pub use nonce::{nonce_source, NonceGenerator, NonceTarget, RequestNonce};
