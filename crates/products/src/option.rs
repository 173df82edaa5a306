//! Product options: user-defined dimensions such as Color or Size.

use serde::{Deserialize, Serialize};
use storefront_core::ValueObject;

use crate::combination::OptionValues;
use crate::error::VariantError;
use crate::normalize::option_key;

/// Normalized option identifier ("Tamaño" -> `tamano`).
///
/// Only constructible from a name, so every key in the system went through
/// the same normalization. Deserialization accepts already-normalized keys only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionKey(String);

impl OptionKey {
    pub fn from_name(name: &str) -> Result<Self, VariantError> {
        let key = option_key(name);
        if key.is_empty() {
            return Err(VariantError::InvalidOptionName {
                name: name.to_string(),
            });
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for OptionKey {}

impl TryFrom<String> for OptionKey {
    type Error = VariantError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        if key.is_empty() || option_key(&key) != key {
            return Err(VariantError::InvalidOptionKey { key });
        }
        Ok(Self(key))
    }
}

impl From<OptionKey> for String {
    fn from(key: OptionKey) -> Self {
        key.0
    }
}

impl core::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OptionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One configurable dimension of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductOptionRecord")]
pub struct ProductOption {
    name: String,
    key: OptionKey,
    values: Vec<String>,
}

/// Serialized form of [`ProductOption`], rebuilt through the same checks as
/// interactive input.
#[derive(Deserialize)]
struct ProductOptionRecord {
    name: String,
    key: OptionKey,
    #[serde(default)]
    values: Vec<String>,
}

impl TryFrom<ProductOptionRecord> for ProductOption {
    type Error = VariantError;

    fn try_from(record: ProductOptionRecord) -> Result<Self, Self::Error> {
        let option = Self::with_values(&record.name, &record.values)?;
        if option.key != record.key {
            return Err(VariantError::InvalidOptionKey {
                key: record.key.into(),
            });
        }
        Ok(option)
    }
}

impl ProductOption {
    /// New option without values. The display name is kept as typed (trimmed).
    pub fn new(name: &str) -> Result<Self, VariantError> {
        Ok(Self {
            key: OptionKey::from_name(name)?,
            name: name.trim().to_string(),
            values: Vec::new(),
        })
    }

    /// New option with an initial value list; duplicates and blanks are rejected.
    pub fn with_values<I, S>(name: &str, values: I) -> Result<Self, VariantError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut option = Self::new(name)?;
        for value in values {
            option.add_value(value.as_ref())?;
        }
        Ok(option)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &OptionKey {
        &self.key
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Append a value. Equality is case-sensitive: "Red" and "red" may coexist.
    pub fn add_value(&mut self, value: &str) -> Result<(), VariantError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(VariantError::EmptyValue {
                key: self.key.to_string(),
            });
        }
        if self.values.iter().any(|v| v == value) {
            return Err(VariantError::DuplicateValue {
                key: self.key.to_string(),
                value: value.to_string(),
            });
        }
        self.values.push(value.to_string());
        Ok(())
    }

    /// Remove a value; returns whether it was present.
    pub fn remove_value(&mut self, value: &str) -> bool {
        let before = self.values.len();
        self.values.retain(|v| v != value.trim());
        self.values.len() != before
    }
}

/// Ordered option set of one product; keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProductOption>", into = "Vec<ProductOption>")]
pub struct ProductOptions {
    options: Vec<ProductOption>,
}

impl ProductOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new, empty option from free-text input.
    pub fn define(&mut self, name: &str) -> Result<&mut ProductOption, VariantError> {
        let option = ProductOption::new(name)?;
        self.insert(option)
    }

    /// Add a fully-built option at the end of the declaration order.
    pub fn insert(&mut self, option: ProductOption) -> Result<&mut ProductOption, VariantError> {
        if self.contains(option.key().as_str()) {
            return Err(VariantError::DuplicateOptionKey {
                key: option.key().to_string(),
            });
        }
        self.options.push(option);
        let last = self.options.len() - 1;
        Ok(&mut self.options[last])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&ProductOption> {
        self.options.iter().find(|o| o.key.as_str() == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ProductOption> {
        self.options.iter_mut().find(|o| o.key.as_str() == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ProductOption> {
        let pos = self.options.iter().position(|o| o.key.as_str() == key)?;
        Some(self.options.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Engine input in declaration order.
    pub fn option_values(&self) -> OptionValues {
        self.options
            .iter()
            .map(|o| (o.key.as_str(), o.values.clone()))
            .collect()
    }

    /// Checks a generation request must pass: at least one option, and no
    /// option without values.
    pub fn ensure_generatable(&self) -> Result<(), VariantError> {
        if self.options.is_empty() {
            return Err(VariantError::NoOptions);
        }
        if let Some(empty) = self.options.iter().find(|o| !o.has_values()) {
            return Err(VariantError::EmptyOption {
                key: empty.key.to_string(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<ProductOption>> for ProductOptions {
    type Error = VariantError;

    fn try_from(list: Vec<ProductOption>) -> Result<Self, Self::Error> {
        let mut options = Self::new();
        for option in list {
            options.insert(option)?;
        }
        Ok(options)
    }
}

impl From<ProductOptions> for Vec<ProductOption> {
    fn from(options: ProductOptions) -> Self {
        options.options
    }
}

impl<'a> IntoIterator for &'a ProductOptions {
    type Item = &'a ProductOption;
    type IntoIter = core::slice::Iter<'a, ProductOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}
