//! Variant generator: guarded expansion of a product's options into drafts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::combination::{
    cartesian_product, count_combinations, generate_variant_name, generate_variant_sku,
    variant_sku,
};
use crate::error::VariantError;
use crate::option::ProductOptions;
use crate::variant::VariantDraft;

/// Default ceiling on the number of variants one generation may produce.
pub const DEFAULT_COMBINATION_LIMIT: u64 = 100;

/// Largest ceiling a caller may configure.
pub const MAX_COMBINATION_LIMIT: u64 = 10_000;

/// Upper bound on combinations per generation request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct CombinationLimit(u64);

impl CombinationLimit {
    pub fn new(limit: u64) -> Result<Self, VariantError> {
        if limit == 0 || limit > MAX_COMBINATION_LIMIT {
            return Err(VariantError::InvalidLimit { limit });
        }
        Ok(Self(limit))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn allows(self, count: u64) -> bool {
        count <= self.0
    }
}

impl Default for CombinationLimit {
    fn default() -> Self {
        Self(DEFAULT_COMBINATION_LIMIT)
    }
}

impl TryFrom<u64> for CombinationLimit {
    type Error = VariantError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CombinationLimit> for u64 {
    fn from(value: CombinationLimit) -> Self {
        value.0
    }
}

/// Base product fields copied into every generated variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantTemplate {
    pub base_sku: String,
    /// Price in smallest currency unit (e.g. cents).
    pub price: u64,
    pub stock: u32,
}

/// Result of a cheap pre-check; nothing is expanded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPreview {
    pub combinations: u64,
    pub limit: u64,
    /// Every option has at least one value.
    pub generatable: bool,
    pub within_limit: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VariantGenerator {
    limit: CombinationLimit,
}

impl VariantGenerator {
    pub fn new(limit: CombinationLimit) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> CombinationLimit {
        self.limit
    }

    /// `within_limit` holds only when `generate` would accept `options`.
    pub fn preview(&self, options: &ProductOptions) -> GenerationPreview {
        let combinations = count_combinations(&options.option_values());
        let generatable = options.ensure_generatable().is_ok();
        GenerationPreview {
            combinations,
            limit: self.limit.get(),
            generatable,
            within_limit: generatable && self.limit.allows(combinations),
        }
    }

    /// Expand `options` into variant drafts.
    ///
    /// The combination count is checked against the limit before anything is
    /// materialized. SKUs that collide after normalization ("Rojo" / "rojo")
    /// get `-2`, `-3`, ... appended in generation order.
    pub fn generate(
        &self,
        options: &ProductOptions,
        template: &VariantTemplate,
    ) -> Result<Vec<VariantDraft>, VariantError> {
        options.ensure_generatable()?;

        let values = options.option_values();
        let count = count_combinations(&values);
        if !self.limit.allows(count) {
            tracing::warn!(
                combinations = count,
                limit = self.limit.get(),
                "variant generation rejected: too many combinations"
            );
            return Err(VariantError::TooManyCombinations {
                count,
                limit: self.limit.get(),
            });
        }

        let capacity = usize::try_from(count.min(MAX_COMBINATION_LIMIT)).unwrap_or_default();
        let mut seen = HashSet::with_capacity(capacity);
        let mut drafts = Vec::with_capacity(capacity);

        for combination in cartesian_product(&values) {
            let name = generate_variant_name(&combination, &values)?;
            let suffix = generate_variant_sku(&combination, &values)?;
            let sku = unique_sku(&mut seen, variant_sku(&template.base_sku, &suffix));

            drafts.push(VariantDraft::new(
                name,
                sku,
                template.price,
                template.stock,
                combination,
            ));
        }

        tracing::info!(
            variants = drafts.len(),
            options = options.len(),
            base_sku = %template.base_sku,
            "generated variant drafts"
        );
        Ok(drafts)
    }
}

fn unique_sku(seen: &mut HashSet<String>, sku: String) -> String {
    if seen.insert(sku.clone()) {
        return sku;
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{sku}-{n}");
        if seen.insert(candidate.clone()) {
            tracing::debug!(sku = %sku, resolved = %candidate, "resolved SKU collision");
            return candidate;
        }
        n += 1;
    }
}
