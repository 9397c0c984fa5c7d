use derive_more::{Display, From, Into};
use fnv::FnvHasher;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    convert::TryInto,
    fmt,
    hash::{Hash, Hasher},
};

/// RNG seed that drives every randomized process during generation. Storing
/// the seed is all that's needed to regenerate an identical city later.
///
/// Deserialization accepts either:
/// - An integer that fits into a `u64`, used as-is
/// - A string, which is parsed as a `u64` if possible, otherwise hashed
///
/// Seeds are always serialized as a **string**, because JSON and TOML can't
/// reliably carry the full range of `u64`. Parsing that string gives back the
/// exact same seed.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, From, Into)]
pub struct Seed(u64);

impl Seed {
    /// Build a seed from arbitrary text. Numeric text is used directly, so
    /// `"42"` and `42` are the same seed. Anything else gets hashed.
    pub fn from_text(text: &str) -> Self {
        match text.parse::<u64>() {
            Ok(value) => Self(value),
            Err(_) => {
                let mut hasher = FnvHasher::default();
                text.hash(&mut hasher);
                Self(hasher.finish())
            }
        }
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// Pick a seed at random. Every call gives a different city, so only use
    /// this when reproducibility doesn't matter (or log the result!).
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl From<&str> for Seed {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        // Could be an int or a string, so no type hint
        deserializer.deserialize_any(SeedVisitor)
    }
}

struct SeedVisitor;

impl SeedVisitor {
    fn from_int<T, E>(value: T) -> Result<Seed, E>
    where
        T: TryInto<u64> + fmt::Display + Copy,
        E: serde::de::Error,
    {
        value
            .try_into()
            .map(Seed)
            .map_err(|_| E::custom(format!("seed out of range: {}", value)))
    }
}

impl<'de> Visitor<'de> for SeedVisitor {
    type Value = Seed;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative integer or string")
    }

    fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Seed, E> {
        Ok(Seed(value))
    }

    fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Seed, E> {
        Self::from_int(value)
    }

    fn visit_u128<E: serde::de::Error>(self, value: u128) -> Result<Seed, E> {
        Self::from_int(value)
    }

    fn visit_i128<E: serde::de::Error>(self, value: i128) -> Result<Seed, E> {
        Self::from_int(value)
    }

    fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Seed, E> {
        Ok(Seed::from_text(value))
    }
}
