//! Variant drafts: candidate sellable variants produced by the generator.

use serde::{Deserialize, Serialize};
use storefront_core::Entity;

use crate::combination::AttributeCombination;

/// A candidate variant, editable until the surrounding product draft is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDraft {
    pub name: String,
    pub sku: String,
    /// Price in smallest currency unit (e.g. cents).
    pub price: u64,
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    pub attributes: AttributeCombination,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl VariantDraft {
    pub fn new(
        name: String,
        sku: String,
        price: u64,
        stock: u32,
        attributes: AttributeCombination,
    ) -> Self {
        Self {
            name,
            sku,
            price,
            stock,
            images: Vec::new(),
            attributes,
            available: true,
        }
    }

    /// Apply the fields present in `patch`; absent fields stay untouched.
    pub fn apply_patch(&mut self, patch: &VariantPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(images) = &patch.images {
            self.images = images.clone();
        }
    }
}

impl Entity for VariantDraft {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.sku
    }
}

/// Operator edit of a single variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl VariantPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none() && self.images.is_none()
    }
}
