//! Products domain module: options, variant generation, and product drafts.
//!
//! Pure, deterministic domain logic (no IO, no HTTP, no storage). The
//! combination engine lives in [`combination`]; [`generator`] wraps it with the
//! caller-side guards; [`draft`] is the event-sourced authoring aggregate.

pub mod combination;
pub mod draft;
pub mod error;
pub mod generator;
pub mod normalize;
pub mod option;
pub mod variant;

pub use combination::{
    AttributeCombination, Combinations, OptionValues, cartesian_product, combinations,
    count_combinations, generate_variant_name, generate_variant_sku, variant_sku,
};
pub use draft::{
    AddOptionValue, CreateDraft, DefineOption, DraftCommand, DraftCreated, DraftEvent, DraftId,
    DraftStatus, DraftSubmitted, GenerateVariants, OptionDefined, OptionRemoved, OptionValueAdded,
    OptionValueRemoved, ProductDraft, RemoveOption, RemoveOptionValue, RemoveVariant,
    SetVariantAvailability, SubmitDraft, UpdateVariant, VariantAvailabilityChanged,
    VariantRemoved, VariantUpdated, VariantsGenerated,
};
pub use error::VariantError;
pub use generator::{
    CombinationLimit, DEFAULT_COMBINATION_LIMIT, GenerationPreview, MAX_COMBINATION_LIMIT,
    VariantGenerator, VariantTemplate,
};
pub use normalize::{option_key, sku_token, strip_diacritics};
pub use option::{OptionKey, ProductOption, ProductOptions};
pub use variant::{VariantDraft, VariantPatch};
