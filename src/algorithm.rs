//! Supported digest algorithms and their streaming accumulators.
//!
//! Algorithms are selected by the numeric code `shasum -a` uses (`1`, `256`,
//! ...) or by name. Every algorithm is driven through the same
//! [`Accumulator`] interface so the hasher never needs to know which one it
//! is feeding.

use std::fmt;
use std::str::FromStr;

use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use xxhash_rust::xxh3::Xxh3;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Sha1,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    /// 128-bit XXH3. Not cryptographic, but much faster for integrity checks.
    Xxh3,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Xxh3,
    ];

    /// Numeric selector accepted on the command line.
    pub fn code(self) -> &'static str {
        match self {
            Algorithm::Sha1 => "1",
            Algorithm::Sha224 => "224",
            Algorithm::Sha256 => "256",
            Algorithm::Sha384 => "384",
            Algorithm::Sha512 => "512",
            Algorithm::Xxh3 => "xxh3",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
            Algorithm::Xxh3 => "xxh3",
        }
    }

    /// Create a fresh accumulator for this algorithm.
    pub fn accumulator(self) -> Box<dyn Accumulator> {
        match self {
            Algorithm::Sha1 => Box::new(DigestAccumulator(Sha1::new())),
            Algorithm::Sha224 => Box::new(DigestAccumulator(Sha224::new())),
            Algorithm::Sha256 => Box::new(DigestAccumulator(Sha256::new())),
            Algorithm::Sha384 => Box::new(DigestAccumulator(Sha384::new())),
            Algorithm::Sha512 => Box::new(DigestAccumulator(Sha512::new())),
            Algorithm::Xxh3 => Box::new(Xxh3Accumulator(Xxh3::new())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.code() == wanted || alg.name() == wanted)
            .ok_or_else(|| ConfigError::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Opaque streaming hash state.
pub trait Accumulator: Send {
    fn update(&mut self, data: &[u8]);

    fn finalize(self: Box<Self>) -> Vec<u8>;
}

struct DigestAccumulator<D>(D);

impl<D: Digest + Send> Accumulator for DigestAccumulator<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

struct Xxh3Accumulator(Xxh3);

impl Accumulator for Xxh3Accumulator {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        // Canonical XXH128 representation is big-endian
        self.0.digest128().to_be_bytes().to_vec()
    }
}
