//! Key fixtures shared by unit tests.
//!
//! RSA key generation is slow, so each fixture is generated once per test
//! binary and reused.

use std::sync::OnceLock;

use crate::crypto::cipher::generate_key_pair;
use crate::keys::{KeyContext, KeyPair};

pub struct Fixture {
    pub pair: KeyPair,
    pub keys: KeyContext,
}

fn build() -> Fixture {
    let pair = generate_key_pair().expect("key generation");
    let keys = KeyContext::from_pair(&pair).expect("generated pair parses");
    Fixture { pair, keys }
}

/// The key pair most tests encrypt and decrypt with.
pub fn primary() -> &'static Fixture {
    static PRIMARY: OnceLock<Fixture> = OnceLock::new();
    PRIMARY.get_or_init(build)
}

/// An unrelated key pair, for cross-key failure cases.
pub fn secondary() -> &'static Fixture {
    static SECONDARY: OnceLock<Fixture> = OnceLock::new();
    SECONDARY.get_or_init(build)
}
