use chrono::{DateTime, Utc};

use coinbook_core::{DomainResult, Entity, TransactionId};

use crate::asset::{AssetLeg, AssetLegs, Position};
use crate::entry::{EntryBuilder, LedgerEntry};
use crate::entry_config::EntryTemplate;

use super::TxType;

/// Ordered template groups: each position's templates, materialized in order.
pub type TemplateGroups = &'static [(Position, &'static [EntryTemplate])];

/// State shared by every transaction kind.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseTx {
    id: TransactionId,
    tx_type: TxType,
    occurred_at: DateTime<Utc>,
    legs: AssetLegs,
    entry_templates: TemplateGroups,
}

impl BaseTx {
    pub fn new(tx_type: TxType, legs: AssetLegs, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: TransactionId::new(),
            tx_type,
            occurred_at,
            legs,
            entry_templates: &[],
        }
    }

    pub fn with_id(mut self, id: TransactionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_templates(mut self, entry_templates: TemplateGroups) -> Self {
        self.entry_templates = entry_templates;
        self
    }

    pub fn tx_type(&self) -> TxType {
        self.tx_type
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn legs(&self) -> &AssetLegs {
        &self.legs
    }

    pub fn entry_templates(&self) -> TemplateGroups {
        self.entry_templates
    }

    pub fn asset(&self, position: Position) -> DomainResult<&AssetLeg> {
        self.legs.require(position)
    }

    /// Builder for `template` seeded from the leg at `position`.
    pub fn create_entry(
        &self,
        template: EntryTemplate,
        position: Position,
    ) -> DomainResult<EntryBuilder> {
        let leg = self.asset(position)?;
        Ok(EntryBuilder::for_leg(template, position, leg, self.tx_type))
    }

    /// Materializes every template group against its leg.
    ///
    /// Groups for a leg the transaction does not have produce nothing.
    pub fn template_entries(&self) -> Vec<LedgerEntry> {
        let tx_type = self.tx_type;
        self.entry_templates
            .iter()
            .filter_map(|(position, templates)| {
                self.legs.get(*position).map(|leg| (*position, leg, *templates))
            })
            .flat_map(|(position, leg, templates)| {
                templates
                    .iter()
                    .map(move |t| EntryBuilder::for_leg(*t, position, leg, tx_type).build())
            })
            .collect()
    }
}

impl Entity for BaseTx {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
