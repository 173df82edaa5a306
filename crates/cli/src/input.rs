//! Product definition files consumed by `variantgen`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storefront_products::{ProductOption, ProductOptions, VariantError, VariantTemplate};

/// A product and its options, as written by an operator.
///
/// ```json
/// { "base_sku": "TEE", "price": 1999, "stock": 10,
///   "options": [{ "name": "Color", "values": ["Red", "Blue"] }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDefinition {
    #[serde(default)]
    pub base_sku: String,
    /// Price in smallest currency unit (e.g. cents).
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDefinition {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl ProductDefinition {
    /// Read a definition from a JSON file, or from stdin when `path` is `-`.
    pub fn read(path: &Path) -> Result<Self> {
        let content = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read product definition from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read product definition: {}", path.display()))?
        };

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse product definition JSON")
    }

    /// Build the validated option set (keys derived, duplicates rejected).
    pub fn options(&self) -> Result<ProductOptions, VariantError> {
        let mut options = ProductOptions::new();
        for def in &self.options {
            options.insert(ProductOption::with_values(&def.name, &def.values)?)?;
        }
        Ok(options)
    }

    pub fn template(&self) -> VariantTemplate {
        VariantTemplate {
            base_sku: self.base_sku.trim().to_string(),
            price: self.price,
            stock: self.stock,
        }
    }
}
