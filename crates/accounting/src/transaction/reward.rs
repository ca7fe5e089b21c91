use chrono::{DateTime, Utc};

use coinbook_core::{DomainResult, Entity, TransactionId};

use crate::asset::{AssetLeg, AssetLegs, Position};
use crate::balances::BalanceDeltas;
use crate::entry::LedgerEntry;
use crate::entry_config::{CASH, CRYPTO, EntryTemplate, REWARDS};

use super::{AffectedBalances, BaseTx, LedgerTransaction, TemplateGroups, TxType};

const CREDIT_REWARDS: EntryTemplate = EntryTemplate::credit(REWARDS);

const FIAT_REWARD_TEMPLATES: TemplateGroups =
    &[(Position::Base, &[CREDIT_REWARDS, EntryTemplate::debit(CASH)])];

const CRYPTO_REWARD_TEMPLATES: TemplateGroups =
    &[(Position::Base, &[CREDIT_REWARDS, EntryTemplate::debit(CRYPTO)])];

/// Picks the template set for a reward paid in `base`.
fn reward_templates(base: &AssetLeg) -> TemplateGroups {
    if base.is_fiat {
        FIAT_REWARD_TEMPLATES
    } else {
        CRYPTO_REWARD_TEMPLATES
    }
}

/// Staking/interest style income, recognized at market value when received.
#[derive(Debug, Clone, PartialEq)]
pub struct Reward {
    base: BaseTx,
}

impl Reward {
    pub fn new(legs: AssetLegs, occurred_at: DateTime<Utc>) -> Self {
        let templates = reward_templates(legs.base());
        Self {
            base: BaseTx::new(TxType::Reward, legs, occurred_at).with_templates(templates),
        }
    }

    pub fn with_id(self, id: TransactionId) -> Self {
        Self {
            base: self.base.with_id(id),
        }
    }

    pub fn base(&self) -> &BaseTx {
        &self.base
    }
}

impl Entity for Reward {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        self.base.id()
    }
}

impl LedgerTransaction for Reward {
    fn tx_type(&self) -> TxType {
        self.base.tx_type()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.base.occurred_at()
    }

    fn legs(&self) -> &AssetLegs {
        self.base.legs()
    }

    fn entries(&self) -> DomainResult<Vec<LedgerEntry>> {
        Ok(self.base.template_entries())
    }
}

impl AffectedBalances for Reward {
    fn affected_balances(&self) -> BalanceDeltas {
        BalanceDeltas::inflow(self.base.legs())
    }
}
