/// Reading RON maps without losing repeated keys.
///
/// Deserializing straight into a map keeps only the last of two equal
/// keys. Table and locale files go through `MapPairs` instead, so their
/// loaders see every key and can reject repeats.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::marker::PhantomData;

/// The `(key, value)` pairs of a map, in source order, repeats included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPairs<V>(pub Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for MapPairs<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PairsVisitor(PhantomData))
    }
}

struct PairsVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for PairsVisitor<V> {
    type Value = MapPairs<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::new();
        while let Some(pair) = map.next_entry::<String, V>()? {
            pairs.push(pair);
        }
        Ok(MapPairs(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_survive() {
        let MapPairs(pairs) =
            ron::from_str::<MapPairs<u32>>(r#"{ "a": 1, "b": 2, "a": 3 }"#).unwrap();
        assert_eq!(
            pairs,
            vec![("a".to_string(), 1), ("b".to_string(), 2), ("a".to_string(), 3)]
        );
    }

    #[test]
    fn non_maps_are_rejected() {
        assert!(ron::from_str::<MapPairs<u32>>("[1, 2]").is_err());
    }
}
