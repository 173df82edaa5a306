//! Subcommand implementations. Each returns a serializable report; printing
//! is left to `main`.

use serde::Serialize;
use storefront_products::{
    CombinationLimit, GenerationPreview, VariantDraft, VariantError, VariantGenerator,
    count_combinations, option_key,
};

use crate::input::ProductDefinition;

/// Output of `variantgen count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountReport {
    pub options: usize,
    pub combinations: u64,
}

/// One row of `variantgen key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyReport {
    pub name: String,
    pub key: String,
}

/// Product of the value-list lengths; options without values are ignored.
pub fn count(def: &ProductDefinition) -> Result<CountReport, VariantError> {
    let options = def.options()?;
    Ok(CountReport {
        options: options.len(),
        combinations: count_combinations(&options.option_values()),
    })
}

pub fn preview(
    def: &ProductDefinition,
    limit: CombinationLimit,
) -> Result<GenerationPreview, VariantError> {
    let options = def.options()?;
    Ok(VariantGenerator::new(limit).preview(&options))
}

pub fn generate(
    def: &ProductDefinition,
    limit: CombinationLimit,
) -> Result<Vec<VariantDraft>, VariantError> {
    let options = def.options()?;
    VariantGenerator::new(limit).generate(&options, &def.template())
}

pub fn keys<I, S>(names: I) -> Vec<KeyReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| KeyReport {
            key: option_key(name.as_ref()),
            name: name.as_ref().to_string(),
        })
        .collect()
}
