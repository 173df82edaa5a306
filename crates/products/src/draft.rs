use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Event};

use crate::generator::{CombinationLimit, VariantGenerator, VariantTemplate};
use crate::option::{OptionKey, ProductOption, ProductOptions};
use crate::variant::{VariantDraft, VariantPatch};

/// Product draft identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(pub AggregateId);

impl DraftId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for DraftId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Draft lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Editing,
    Submitted,
}

/// Aggregate root: a product being authored, with its options and variant drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    id: DraftId,
    name: String,
    base_sku: String,
    price: u64,
    stock: u32,
    options: ProductOptions,
    variants: Vec<VariantDraft>,
    variants_stale: bool,
    status: DraftStatus,
    version: u64,
    created: bool,
}

impl ProductDraft {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: DraftId) -> Self {
        Self {
            id,
            name: String::new(),
            base_sku: String::new(),
            price: 0,
            stock: 0,
            options: ProductOptions::new(),
            variants: Vec::new(),
            variants_stale: false,
            status: DraftStatus::Editing,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> DraftId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_sku(&self) -> &str {
        &self.base_sku
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn options(&self) -> &ProductOptions {
        &self.options
    }

    pub fn variants(&self) -> &[VariantDraft] {
        &self.variants
    }

    pub fn variant(&self, sku: &str) -> Option<&VariantDraft> {
        self.variants.iter().find(|v| v.sku == sku)
    }

    /// Options changed after the last generation; the variant list no longer matches.
    pub fn variants_stale(&self) -> bool {
        self.variants_stale
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn template(&self) -> VariantTemplate {
        VariantTemplate {
            base_sku: self.base_sku.clone(),
            price: self.price,
            stock: self.stock,
        }
    }
}

impl AggregateRoot for ProductDraft {
    type Id = DraftId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateDraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDraft {
    pub draft_id: DraftId,
    pub name: String,
    pub base_sku: String,
    pub price: u64,
    pub stock: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DefineOption (free-text name; the key is derived).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineOption {
    pub draft_id: DraftId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddOptionValue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOptionValue {
    pub draft_id: DraftId,
    pub key: String,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveOptionValue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOptionValue {
    pub draft_id: DraftId,
    pub key: String,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveOption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOption {
    pub draft_id: DraftId,
    pub key: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: GenerateVariants (replaces any previously generated list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateVariants {
    pub draft_id: DraftId,
    pub limit: CombinationLimit,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateVariant {
    pub draft_id: DraftId,
    pub sku: String,
    pub patch: VariantPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetVariantAvailability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetVariantAvailability {
    pub draft_id: DraftId,
    pub sku: String,
    pub available: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveVariant {
    pub draft_id: DraftId,
    pub sku: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitDraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitDraft {
    pub draft_id: DraftId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftCommand {
    CreateDraft(CreateDraft),
    DefineOption(DefineOption),
    AddOptionValue(AddOptionValue),
    RemoveOptionValue(RemoveOptionValue),
    RemoveOption(RemoveOption),
    GenerateVariants(GenerateVariants),
    UpdateVariant(UpdateVariant),
    SetVariantAvailability(SetVariantAvailability),
    RemoveVariant(RemoveVariant),
    SubmitDraft(SubmitDraft),
}

/// Event: DraftCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftCreated {
    pub draft_id: DraftId,
    pub name: String,
    pub base_sku: String,
    pub price: u64,
    pub stock: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OptionDefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDefined {
    pub draft_id: DraftId,
    pub name: String,
    pub key: OptionKey,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OptionValueAdded (value already trimmed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValueAdded {
    pub draft_id: DraftId,
    pub key: OptionKey,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OptionValueRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValueRemoved {
    pub draft_id: DraftId,
    pub key: OptionKey,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OptionRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRemoved {
    pub draft_id: DraftId,
    pub key: OptionKey,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantsGenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantsGenerated {
    pub draft_id: DraftId,
    pub variants: Vec<VariantDraft>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantUpdated {
    pub draft_id: DraftId,
    pub sku: String,
    pub patch: VariantPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantAvailabilityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAvailabilityChanged {
    pub draft_id: DraftId,
    pub sku: String,
    pub available: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRemoved {
    pub draft_id: DraftId,
    pub sku: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DraftSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSubmitted {
    pub draft_id: DraftId,
    pub variant_count: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEvent {
    DraftCreated(DraftCreated),
    OptionDefined(OptionDefined),
    OptionValueAdded(OptionValueAdded),
    OptionValueRemoved(OptionValueRemoved),
    OptionRemoved(OptionRemoved),
    VariantsGenerated(VariantsGenerated),
    VariantUpdated(VariantUpdated),
    VariantAvailabilityChanged(VariantAvailabilityChanged),
    VariantRemoved(VariantRemoved),
    DraftSubmitted(DraftSubmitted),
}

impl Event for DraftEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DraftEvent::DraftCreated(_) => "products.draft.created",
            DraftEvent::OptionDefined(_) => "products.draft.option_defined",
            DraftEvent::OptionValueAdded(_) => "products.draft.option_value_added",
            DraftEvent::OptionValueRemoved(_) => "products.draft.option_value_removed",
            DraftEvent::OptionRemoved(_) => "products.draft.option_removed",
            DraftEvent::VariantsGenerated(_) => "products.draft.variants_generated",
            DraftEvent::VariantUpdated(_) => "products.draft.variant_updated",
            DraftEvent::VariantAvailabilityChanged(_) => {
                "products.draft.variant_availability_changed"
            }
            DraftEvent::VariantRemoved(_) => "products.draft.variant_removed",
            DraftEvent::DraftSubmitted(_) => "products.draft.submitted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DraftEvent::DraftCreated(e) => e.occurred_at,
            DraftEvent::OptionDefined(e) => e.occurred_at,
            DraftEvent::OptionValueAdded(e) => e.occurred_at,
            DraftEvent::OptionValueRemoved(e) => e.occurred_at,
            DraftEvent::OptionRemoved(e) => e.occurred_at,
            DraftEvent::VariantsGenerated(e) => e.occurred_at,
            DraftEvent::VariantUpdated(e) => e.occurred_at,
            DraftEvent::VariantAvailabilityChanged(e) => e.occurred_at,
            DraftEvent::VariantRemoved(e) => e.occurred_at,
            DraftEvent::DraftSubmitted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ProductDraft {
    type Command = DraftCommand;
    type Event = DraftEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DraftEvent::DraftCreated(e) => {
                self.id = e.draft_id;
                self.name = e.name.clone();
                self.base_sku = e.base_sku.clone();
                self.price = e.price;
                self.stock = e.stock;
                self.status = DraftStatus::Editing;
                self.created = true;
            }
            DraftEvent::OptionDefined(e) => {
                // handle_define_option already rejected invalid names and
                // duplicate keys, so both steps succeed for recorded events.
                let inserted = ProductOption::new(&e.name)
                    .and_then(|option| self.options.insert(option).map(|_| ()));
                debug_assert!(inserted.is_ok(), "OptionDefined replayed an invalid option");
                self.mark_stale();
            }
            DraftEvent::OptionValueAdded(e) => {
                // handle_add_value rejected blank and duplicate values.
                if let Some(option) = self.options.get_mut(e.key.as_str()) {
                    let added = option.add_value(&e.value);
                    debug_assert!(added.is_ok(), "OptionValueAdded replayed an invalid value");
                }
                self.mark_stale();
            }
            DraftEvent::OptionValueRemoved(e) => {
                if let Some(option) = self.options.get_mut(e.key.as_str()) {
                    option.remove_value(&e.value);
                }
                self.mark_stale();
            }
            DraftEvent::OptionRemoved(e) => {
                self.options.remove(e.key.as_str());
                self.mark_stale();
            }
            DraftEvent::VariantsGenerated(e) => {
                self.variants = e.variants.clone();
                self.variants_stale = false;
            }
            DraftEvent::VariantUpdated(e) => {
                if let Some(variant) = self.variant_mut(&e.sku) {
                    variant.apply_patch(&e.patch);
                }
            }
            DraftEvent::VariantAvailabilityChanged(e) => {
                if let Some(variant) = self.variant_mut(&e.sku) {
                    variant.available = e.available;
                }
            }
            DraftEvent::VariantRemoved(e) => {
                self.variants.retain(|v| v.sku != e.sku);
            }
            DraftEvent::DraftSubmitted(_) => {
                self.status = DraftStatus::Submitted;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DraftCommand::CreateDraft(cmd) => self.handle_create(cmd),
            DraftCommand::DefineOption(cmd) => self.handle_define_option(cmd),
            DraftCommand::AddOptionValue(cmd) => self.handle_add_value(cmd),
            DraftCommand::RemoveOptionValue(cmd) => self.handle_remove_value(cmd),
            DraftCommand::RemoveOption(cmd) => self.handle_remove_option(cmd),
            DraftCommand::GenerateVariants(cmd) => self.handle_generate(cmd),
            DraftCommand::UpdateVariant(cmd) => self.handle_update_variant(cmd),
            DraftCommand::SetVariantAvailability(cmd) => self.handle_set_availability(cmd),
            DraftCommand::RemoveVariant(cmd) => self.handle_remove_variant(cmd),
            DraftCommand::SubmitDraft(cmd) => self.handle_submit(cmd),
        }
    }
}

impl ProductDraft {
    fn mark_stale(&mut self) {
        if !self.variants.is_empty() {
            self.variants_stale = true;
        }
    }

    fn variant_mut(&mut self, sku: &str) -> Option<&mut VariantDraft> {
        self.variants.iter_mut().find(|v| v.sku == sku)
    }

    fn ensure_editable(&self, draft_id: DraftId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("product draft {draft_id}")));
        }
        if self.id != draft_id {
            return Err(DomainError::invariant("draft_id mismatch"));
        }
        if self.status == DraftStatus::Submitted {
            return Err(DomainError::invariant("submitted drafts cannot be modified"));
        }
        Ok(())
    }

    fn option(&self, key: &str) -> Result<&ProductOption, DomainError> {
        self.options
            .get(key)
            .ok_or_else(|| DomainError::not_found(format!("option `{key}`")))
    }

    fn existing_variant(&self, sku: &str) -> Result<&VariantDraft, DomainError> {
        self.variant(sku)
            .ok_or_else(|| DomainError::not_found(format!("variant `{sku}`")))
    }

    fn handle_create(&self, cmd: &CreateDraft) -> Result<Vec<DraftEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product draft already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.base_sku.trim().is_empty() {
            return Err(DomainError::validation("base SKU cannot be empty"));
        }

        Ok(vec![DraftEvent::DraftCreated(DraftCreated {
            draft_id: cmd.draft_id,
            name: cmd.name.trim().to_string(),
            base_sku: cmd.base_sku.trim().to_string(),
            price: cmd.price,
            stock: cmd.stock,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_define_option(&self, cmd: &DefineOption) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        let mut options = self.options.clone();
        let option = options.define(&cmd.name)?;

        Ok(vec![DraftEvent::OptionDefined(OptionDefined {
            draft_id: cmd.draft_id,
            name: option.name().to_string(),
            key: option.key().clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_value(&self, cmd: &AddOptionValue) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        let mut option = self.option(&cmd.key)?.clone();
        option.add_value(&cmd.value)?;

        Ok(vec![DraftEvent::OptionValueAdded(OptionValueAdded {
            draft_id: cmd.draft_id,
            key: option.key().clone(),
            value: cmd.value.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_value(&self, cmd: &RemoveOptionValue) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        let option = self.option(&cmd.key)?;
        let value = cmd.value.trim();
        if !option.values().iter().any(|v| v == value) {
            return Err(DomainError::not_found(format!(
                "value `{value}` in option `{}`",
                option.key()
            )));
        }

        Ok(vec![DraftEvent::OptionValueRemoved(OptionValueRemoved {
            draft_id: cmd.draft_id,
            key: option.key().clone(),
            value: value.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_option(&self, cmd: &RemoveOption) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        let option = self.option(&cmd.key)?;

        Ok(vec![DraftEvent::OptionRemoved(OptionRemoved {
            draft_id: cmd.draft_id,
            key: option.key().clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_generate(&self, cmd: &GenerateVariants) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        let variants = VariantGenerator::new(cmd.limit).generate(&self.options, &self.template())?;

        Ok(vec![DraftEvent::VariantsGenerated(VariantsGenerated {
            draft_id: cmd.draft_id,
            variants,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_variant(&self, cmd: &UpdateVariant) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        self.existing_variant(&cmd.sku)?;

        if cmd.patch.is_empty() {
            return Err(DomainError::validation("variant patch is empty"));
        }
        if cmd.patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DomainError::validation("variant name cannot be empty"));
        }

        Ok(vec![DraftEvent::VariantUpdated(VariantUpdated {
            draft_id: cmd.draft_id,
            sku: cmd.sku.clone(),
            patch: cmd.patch.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_availability(
        &self,
        cmd: &SetVariantAvailability,
    ) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        let variant = self.existing_variant(&cmd.sku)?;

        if variant.available == cmd.available {
            let state = if cmd.available { "available" } else { "disabled" };
            return Err(DomainError::conflict(format!(
                "variant `{}` is already {state}",
                cmd.sku
            )));
        }

        Ok(vec![DraftEvent::VariantAvailabilityChanged(
            VariantAvailabilityChanged {
                draft_id: cmd.draft_id,
                sku: cmd.sku.clone(),
                available: cmd.available,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_remove_variant(&self, cmd: &RemoveVariant) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        self.existing_variant(&cmd.sku)?;

        Ok(vec![DraftEvent::VariantRemoved(VariantRemoved {
            draft_id: cmd.draft_id,
            sku: cmd.sku.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit(&self, cmd: &SubmitDraft) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editable(cmd.draft_id)?;
        if self.variants.is_empty() {
            return Err(DomainError::validation(
                "generate at least one variant before submitting",
            ));
        }
        if self.variants_stale {
            return Err(DomainError::invariant(
                "options changed since variants were generated; regenerate before submitting",
            ));
        }
        if !self.variants.iter().any(|v| v.available) {
            return Err(DomainError::validation("at least one variant must be available"));
        }

        Ok(vec![DraftEvent::DraftSubmitted(DraftSubmitted {
            draft_id: cmd.draft_id,
            variant_count: self.variants.len(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draft_id() -> DraftId {
        DraftId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn create_cmd(draft_id: DraftId) -> DraftCommand {
        DraftCommand::CreateDraft(CreateDraft {
            draft_id,
            name: "Basic Tee".to_string(),
            base_sku: "TEE".to_string(),
            price: 1999,
            stock: 10,
            occurred_at: test_time(),
        })
    }

    fn define(draft_id: DraftId, name: &str) -> DraftCommand {
        DraftCommand::DefineOption(DefineOption {
            draft_id,
            name: name.to_string(),
            occurred_at: test_time(),
        })
    }

    fn add_value(draft_id: DraftId, key: &str, value: &str) -> DraftCommand {
        DraftCommand::AddOptionValue(AddOptionValue {
            draft_id,
            key: key.to_string(),
            value: value.to_string(),
            occurred_at: test_time(),
        })
    }

    fn generate(draft_id: DraftId) -> DraftCommand {
        DraftCommand::GenerateVariants(GenerateVariants {
            draft_id,
            limit: CombinationLimit::default(),
            occurred_at: test_time(),
        })
    }

    fn availability(draft_id: DraftId, sku: &str, available: bool) -> DraftCommand {
        DraftCommand::SetVariantAvailability(SetVariantAvailability {
            draft_id,
            sku: sku.to_string(),
            available,
            occurred_at: test_time(),
        })
    }

    fn submit(draft_id: DraftId) -> DraftCommand {
        DraftCommand::SubmitDraft(SubmitDraft {
            draft_id,
            occurred_at: test_time(),
        })
    }

    /// Draft with Color {Red, Blue} x Size {S, M} and generated variants.
    fn generated_draft() -> (ProductDraft, DraftId) {
        let draft_id = test_draft_id();
        let mut draft = ProductDraft::empty(draft_id);
        draft.execute(&create_cmd(draft_id)).unwrap();
        draft.execute(&define(draft_id, "Color")).unwrap();
        draft.execute(&add_value(draft_id, "color", "Red")).unwrap();
        draft.execute(&add_value(draft_id, "color", "Blue")).unwrap();
        draft.execute(&define(draft_id, "Size")).unwrap();
        draft.execute(&add_value(draft_id, "size", "S")).unwrap();
        draft.execute(&add_value(draft_id, "size", "M")).unwrap();
        draft.execute(&generate(draft_id)).unwrap();
        (draft, draft_id)
    }

    #[test]
    fn create_draft_emits_draft_created_event() {
        let draft_id = test_draft_id();
        let draft = ProductDraft::empty(draft_id);

        let events = draft.handle(&create_cmd(draft_id)).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DraftEvent::DraftCreated(e) => {
                assert_eq!(e.draft_id, draft_id);
                assert_eq!(e.base_sku, "TEE");
                assert_eq!(e.price, 1999);
            }
            _ => panic!("Expected DraftCreated event"),
        }
        assert_eq!(events[0].event_type(), "products.draft.created");
    }

    #[test]
    fn create_draft_rejects_blank_fields() {
        let draft_id = test_draft_id();
        let draft = ProductDraft::empty(draft_id);
        let cmd = DraftCommand::CreateDraft(CreateDraft {
            draft_id,
            name: "Tee".into(),
            base_sku: "  ".into(),
            price: 0,
            stock: 0,
            occurred_at: test_time(),
        });

        match draft.handle(&cmd).unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("base SKU")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_draft_rejects_duplicate_creation() {
        let draft_id = test_draft_id();
        let mut draft = ProductDraft::empty(draft_id);
        draft.execute(&create_cmd(draft_id)).unwrap();

        assert!(matches!(
            draft.handle(&create_cmd(draft_id)).unwrap_err(),
            DomainError::Conflict(_)
        ));
    }

    #[test]
    fn commands_before_creation_are_not_found() {
        let draft_id = test_draft_id();
        let draft = ProductDraft::empty(draft_id);
        assert!(matches!(
            draft.handle(&define(draft_id, "Color")).unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[test]
    fn commands_for_another_draft_are_rejected() {
        let (draft, _) = generated_draft();
        assert!(matches!(
            draft.handle(&define(test_draft_id(), "Material")).unwrap_err(),
            DomainError::InvariantViolation(_)
        ));
    }

    #[test]
    fn duplicate_option_names_conflict_after_normalization() {
        let (draft, draft_id) = generated_draft();
        match draft.handle(&define(draft_id, " COLOR ")).unwrap_err() {
            DomainError::Conflict(msg) => assert!(msg.contains("color")),
            other => panic!("Expected Conflict error, got {other:?}"),
        }
    }

    #[test]
    fn adding_a_value_to_unknown_option_is_not_found() {
        let (draft, draft_id) = generated_draft();
        assert!(matches!(
            draft.handle(&add_value(draft_id, "material", "Cotton")).unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[test]
    fn generate_produces_odometer_ordered_variants() {
        let (draft, _) = generated_draft();
        let names: Vec<&str> = draft.variants().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Red / S", "Red / M", "Blue / S", "Blue / M"]);
        assert_eq!(draft.variants()[0].sku, "TEE-RED-S");
        assert!(!draft.variants_stale());
    }

    #[test]
    fn generate_rejects_option_without_values() {
        let (mut draft, draft_id) = generated_draft();
        draft.execute(&define(draft_id, "Material")).unwrap();

        match draft.handle(&generate(draft_id)).unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("material")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn generate_respects_the_requested_limit() {
        let (draft, draft_id) = generated_draft();
        let cmd = DraftCommand::GenerateVariants(GenerateVariants {
            draft_id,
            limit: CombinationLimit::new(3).unwrap(),
            occurred_at: test_time(),
        });

        match draft.handle(&cmd).unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("too many combinations")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn option_edits_mark_variants_stale_until_regenerated() {
        let (mut draft, draft_id) = generated_draft();
        draft.execute(&add_value(draft_id, "size", "L")).unwrap();
        assert!(draft.variants_stale());

        match draft.handle(&submit(draft_id)).unwrap_err() {
            DomainError::InvariantViolation(msg) => assert!(msg.contains("regenerate")),
            other => panic!("Expected InvariantViolation error, got {other:?}"),
        }

        draft.execute(&generate(draft_id)).unwrap();
        assert!(!draft.variants_stale());
        assert_eq!(draft.variants().len(), 6);
    }

    #[test]
    fn removing_an_option_shrinks_the_next_generation() {
        let (mut draft, draft_id) = generated_draft();
        draft
            .execute(&DraftCommand::RemoveOption(RemoveOption {
                draft_id,
                key: "size".into(),
                occurred_at: test_time(),
            }))
            .unwrap();
        draft.execute(&generate(draft_id)).unwrap();

        let skus: Vec<&str> = draft.variants().iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["TEE-RED", "TEE-BLUE"]);
    }

    #[test]
    fn removing_a_missing_value_is_not_found() {
        let (draft, draft_id) = generated_draft();
        let cmd = DraftCommand::RemoveOptionValue(RemoveOptionValue {
            draft_id,
            key: "size".into(),
            value: "XL".into(),
            occurred_at: test_time(),
        });
        assert!(matches!(draft.handle(&cmd).unwrap_err(), DomainError::NotFound(_)));
    }

    #[test]
    fn update_variant_applies_patch() {
        let (mut draft, draft_id) = generated_draft();
        draft
            .execute(&DraftCommand::UpdateVariant(UpdateVariant {
                draft_id,
                sku: "TEE-BLUE-M".into(),
                patch: VariantPatch {
                    price: Some(2499),
                    stock: Some(0),
                    ..VariantPatch::default()
                },
                occurred_at: test_time(),
            }))
            .unwrap();

        let variant = draft.variant("TEE-BLUE-M").unwrap();
        assert_eq!(variant.price, 2499);
        assert_eq!(variant.stock, 0);
        assert_eq!(variant.name, "Blue / M");
    }

    #[test]
    fn update_variant_rejects_empty_patch_and_unknown_sku() {
        let (draft, draft_id) = generated_draft();
        let empty = DraftCommand::UpdateVariant(UpdateVariant {
            draft_id,
            sku: "TEE-RED-S".into(),
            patch: VariantPatch::default(),
            occurred_at: test_time(),
        });
        assert!(matches!(draft.handle(&empty).unwrap_err(), DomainError::Validation(_)));

        let unknown = DraftCommand::UpdateVariant(UpdateVariant {
            draft_id,
            sku: "TEE-GREEN-S".into(),
            patch: VariantPatch {
                stock: Some(1),
                ..VariantPatch::default()
            },
            occurred_at: test_time(),
        });
        assert!(matches!(draft.handle(&unknown).unwrap_err(), DomainError::NotFound(_)));
    }

    #[test]
    fn toggling_availability() {
        let (mut draft, draft_id) = generated_draft();
        draft.execute(&availability(draft_id, "TEE-RED-S", false)).unwrap();
        assert!(!draft.variant("TEE-RED-S").unwrap().available);

        assert!(matches!(
            draft.handle(&availability(draft_id, "TEE-RED-S", false)).unwrap_err(),
            DomainError::Conflict(_)
        ));

        draft.execute(&availability(draft_id, "TEE-RED-S", true)).unwrap();
        assert!(draft.variant("TEE-RED-S").unwrap().available);
    }

    #[test]
    fn remove_variant_drops_it() {
        let (mut draft, draft_id) = generated_draft();
        draft
            .execute(&DraftCommand::RemoveVariant(RemoveVariant {
                draft_id,
                sku: "TEE-RED-M".into(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(draft.variants().len(), 3);
        assert!(draft.variant("TEE-RED-M").is_none());
    }

    #[test]
    fn submit_requires_an_available_variant() {
        let (mut draft, draft_id) = generated_draft();
        for sku in ["TEE-RED-S", "TEE-RED-M", "TEE-BLUE-S", "TEE-BLUE-M"] {
            draft.execute(&availability(draft_id, sku, false)).unwrap();
        }
        assert!(matches!(
            draft.handle(&submit(draft_id)).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn submit_requires_generated_variants() {
        let draft_id = test_draft_id();
        let mut draft = ProductDraft::empty(draft_id);
        draft.execute(&create_cmd(draft_id)).unwrap();
        assert!(matches!(
            draft.handle(&submit(draft_id)).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn submitted_drafts_are_frozen() {
        let (mut draft, draft_id) = generated_draft();
        let events = draft.execute(&submit(draft_id)).unwrap();
        match &events[0] {
            DraftEvent::DraftSubmitted(e) => assert_eq!(e.variant_count, 4),
            _ => panic!("Expected DraftSubmitted event"),
        }
        assert_eq!(draft.status(), DraftStatus::Submitted);

        match draft.handle(&availability(draft_id, "TEE-RED-S", false)).unwrap_err() {
            DomainError::InvariantViolation(msg) => assert!(msg.contains("submitted")),
            other => panic!("Expected InvariantViolation error, got {other:?}"),
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "OptionDefined replayed an invalid option")]
    fn applying_an_unvalidated_option_event_is_caught_in_debug_builds() {
        let (mut draft, draft_id) = generated_draft();
        draft.apply(&DraftEvent::OptionDefined(OptionDefined {
            draft_id,
            name: "COLOR".into(),
            key: OptionKey::from_name("COLOR").unwrap(),
            occurred_at: test_time(),
        }));
    }

    #[test]
    fn version_increments_on_apply() {
        let (draft, _) = generated_draft();
        // create + 2 options + 4 values + generate
        assert_eq!(draft.version(), 8);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let (draft, draft_id) = generated_draft();
        let before = draft.clone();

        let events1 = draft.handle(&generate(draft_id));
        let events2 = draft.handle(&generate(draft_id));

        assert_eq!(draft, before);
        assert_eq!(
            events1.map(|e| e.len()),
            events2.map(|e| e.len())
        );
    }

    #[test]
    fn replaying_events_rebuilds_identical_state() {
        let draft_id = test_draft_id();
        let mut source = ProductDraft::empty(draft_id);
        let mut log = Vec::new();
        for cmd in [
            create_cmd(draft_id),
            define(draft_id, "Tamaño"),
            add_value(draft_id, "tamano", "Grande"),
            add_value(draft_id, "tamano", "Pequeño"),
            generate(draft_id),
            availability(draft_id, "TEE-PEQUENO", false),
        ] {
            log.extend(source.execute(&cmd).unwrap());
        }

        let mut replayed = ProductDraft::empty(draft_id);
        for event in &log {
            replayed.apply(event);
        }

        assert_eq!(replayed, source);
        assert_eq!(replayed.version(), log.len() as u64);
    }

    #[test]
    fn events_serialize_to_json() {
        let (mut draft, draft_id) = generated_draft();
        let events = draft.execute(&submit(draft_id)).unwrap();
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["DraftSubmitted"]["variant_count"], 4);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: the same commands produce the same variant list.
            #[test]
            fn generation_is_deterministic(
                colors in prop::collection::btree_set("[A-Za-z]{1,10}", 1..5),
                sizes in prop::collection::btree_set("[A-Z0-9]{1,4}", 1..5),
            ) {
                let build = || {
                    let draft_id = DraftId::new(AggregateId::from_uuid(Default::default()));
                    let mut draft = ProductDraft::empty(draft_id);
                    draft.execute(&create_cmd(draft_id)).unwrap();
                    draft.execute(&define(draft_id, "Color")).unwrap();
                    for c in &colors {
                        draft.execute(&add_value(draft_id, "color", c)).unwrap();
                    }
                    draft.execute(&define(draft_id, "Size")).unwrap();
                    for s in &sizes {
                        draft.execute(&add_value(draft_id, "size", s)).unwrap();
                    }
                    draft.execute(&generate(draft_id)).unwrap();
                    draft
                };

                let a = build();
                let b = build();
                prop_assert_eq!(a.variants(), b.variants());
                prop_assert_eq!(a.variants().len(), colors.len() * sizes.len());

                let mut skus: Vec<&str> = a.variants().iter().map(|v| v.sku.as_str()).collect();
                skus.sort_unstable();
                skus.dedup();
                prop_assert_eq!(skus.len(), a.variants().len());
            }
        }
    }
}
