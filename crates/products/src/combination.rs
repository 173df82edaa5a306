//! Combination engine: option values -> attribute combinations -> names and SKUs.
//!
//! Everything in this module is pure and allocation-bounded by its input. Callers
//! are expected to check [`count_combinations`] against their ceiling before
//! calling [`cartesian_product`]; see [`crate::generator::VariantGenerator`].
//!
//! ## Empty value lists
//!
//! An option whose value list is empty does not take part in the expansion: its
//! key never appears in any combination and it does not zero out the product.
//! Generation flows reject such options up front (`VariantError::EmptyOption`),
//! so this only matters for direct callers of the engine.

use core::fmt;
use core::iter::FusedIterator;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VariantError;
use crate::normalize::sku_token;

/// Separator between option values in a variant name ("Red / Large").
pub const NAME_SEPARATOR: &str = " / ";

/// Separator between SKU segments ("BASE-RED-LARGE").
pub const SKU_SEPARATOR: &str = "-";

/// Insertion-ordered mapping option key -> ordered values; the engine input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionValues {
    entries: Vec<(String, Vec<String>)>,
}

impl OptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option. A key pushed twice replaces the earlier values in place.
    pub fn push(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Options that contribute to the expansion (non-empty value lists).
    pub fn participating(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter().filter(|(_, values)| !values.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, Vec<V>)> for OptionValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        let mut values = OptionValues::new();
        for (key, vals) in iter {
            values.push(key, vals.into_iter().map(Into::into).collect());
        }
        values
    }
}

/// One selected value per participating option, in declaration order.
///
/// Only the engine builds these; they are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeCombination {
    entries: Vec<(String, String)>,
}

impl AttributeCombination {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeCombination {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Serialize for AttributeCombination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeCombination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CombinationVisitor;

        impl<'de> Visitor<'de> for CombinationVisitor {
            type Value = AttributeCombination;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of option key to option value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, String)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate option key `{key}`"
                        )));
                    }
                    entries.push((key, value));
                }
                Ok(AttributeCombination { entries })
            }
        }

        deserializer.deserialize_map(CombinationVisitor)
    }
}

/// Number of combinations `values` expands to, without building any of them.
///
/// Zero when no option participates. Saturates at `u64::MAX`.
pub fn count_combinations(values: &OptionValues) -> u64 {
    let mut participating = values.participating().peekable();
    if participating.peek().is_none() {
        return 0;
    }
    participating.fold(1u64, |acc, (_, vals)| {
        acc.saturating_mul(u64::try_from(vals.len()).unwrap_or(u64::MAX))
    })
}

/// Lazily walk the cross product in odometer order (last option fastest).
pub fn combinations(values: &OptionValues) -> Combinations<'_> {
    let dims: Vec<(&str, &[String])> = values.participating().collect();
    let remaining = count_combinations(values);
    Combinations {
        indices: vec![0; dims.len()],
        done: dims.is_empty(),
        dims,
        remaining,
    }
}

/// Materialize the full cross product.
///
/// Deterministic: identical input always yields an identical, identically
/// ordered list. An input without participating options yields an empty list.
pub fn cartesian_product(values: &OptionValues) -> Vec<AttributeCombination> {
    combinations(values).collect()
}

/// Iterator returned by [`combinations`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    dims: Vec<(&'a str, &'a [String])>,
    indices: Vec<usize>,
    remaining: u64,
    done: bool,
}

impl Combinations<'_> {
    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.dims[pos].1.len() {
                return;
            }
            self.indices[pos] = 0;
        }
        // Every wheel wrapped around.
        self.done = true;
    }
}

impl Iterator for Combinations<'_> {
    type Item = AttributeCombination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let combination = self
            .dims
            .iter()
            .zip(&self.indices)
            .map(|((key, vals), &idx)| (*key, vals[idx].as_str()))
            .collect();

        self.remaining = self.remaining.saturating_sub(1);
        self.advance();
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        match usize::try_from(self.remaining) {
            Ok(n) if self.remaining < u64::MAX => (n, Some(n)),
            _ => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Combinations<'_> {}

fn participating_value<'c>(
    combination: &'c AttributeCombination,
    key: &str,
) -> Result<&'c str, VariantError> {
    combination
        .get(key)
        .ok_or_else(|| VariantError::MalformedCombination {
            key: key.to_string(),
        })
}

/// Human-readable variant name: the combination's values joined with `" / "`
/// in option-declaration order.
///
/// Fails with [`VariantError::MalformedCombination`] if a participating option
/// has no value in `combination`.
pub fn generate_variant_name(
    combination: &AttributeCombination,
    options: &OptionValues,
) -> Result<String, VariantError> {
    let parts = options
        .participating()
        .map(|(key, _)| participating_value(combination, key))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(NAME_SEPARATOR))
}

/// SKU suffix for a combination: one [`sku_token`] per value, declaration order,
/// joined with `"-"`.
pub fn generate_variant_sku(
    combination: &AttributeCombination,
    options: &OptionValues,
) -> Result<String, VariantError> {
    let tokens = options
        .participating()
        .map(|(key, _)| participating_value(combination, key).map(sku_token))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tokens.join(SKU_SEPARATOR))
}

/// Final variant SKU: `"{base}-{suffix}"`, or the bare suffix when `base` is blank.
pub fn variant_sku(base: &str, suffix: &str) -> String {
    let base = base.trim();
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{base}{SKU_SEPARATOR}{suffix}")
    }
}
