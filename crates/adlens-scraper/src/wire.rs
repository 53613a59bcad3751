//! Serde helpers shared by the search-API response types.

use serde::{Deserialize, Deserializer};

/// Reads a list that upstreams sometimes send as `null`; absent and `null`
/// both become an empty `Vec`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
