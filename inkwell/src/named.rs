//! Serde adapter for engine types that already have a string form.
//!
//! The engine crate does no I/O and doesn't depend on serde. Its enums and [`Color`](inkwell_core::Color)
//! round-trip through [`std::fmt::Display`] and [`std::str::FromStr`] instead, which is also the
//! friendliest form to hand-edit in a toml file.

use std::{fmt::Display, str::FromStr};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Named<T>(pub T);

impl<T: Display> serde::Serialize for Named<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self.0)
    }
}
impl<'de, T> serde::Deserialize<'de> for Named<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let str =
            <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        str.parse()
            .map(Named)
            .map_err(|err| serde::de::Error::custom(format!("{str:?}: {err}")))
    }
}
