use chrono::{DateTime, Utc};

use coinbook_core::{DomainResult, Entity, TransactionId};

use crate::asset::{AssetLegs, Position};
use crate::balances::BalanceDeltas;
use crate::entry::LedgerEntry;
use crate::entry_config::{CRYPTO, EntryTemplate, TRANSFERS_IN};

use super::{AffectedBalances, BaseTx, LedgerTransaction, TemplateGroups, TxType};

const DEBIT_BASE: EntryTemplate = EntryTemplate::debit(CRYPTO);
const CREDIT_TRANSFERS_IN: EntryTemplate = EntryTemplate::credit(TRANSFERS_IN);

const RECEIVE_TEMPLATES: TemplateGroups = &[
    (Position::Base, &[DEBIT_BASE]),
    (Position::Fee, &[CREDIT_TRANSFERS_IN]),
];

/// Incoming transfer of an asset into a tracked wallet.
///
/// Books the base leg as a crypto debit and, when a fee was paid, the fee
/// leg as a transfers-in credit.
#[derive(Debug, Clone, PartialEq)]
pub struct Receive {
    base: BaseTx,
}

impl Receive {
    pub fn new(legs: AssetLegs, occurred_at: DateTime<Utc>) -> Self {
        Self {
            base: BaseTx::new(TxType::Receive, legs, occurred_at).with_templates(RECEIVE_TEMPLATES),
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

impl Entity for Receive {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        self.base.id()
    }
}

impl LedgerTransaction for Receive {
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

impl AffectedBalances for Receive {
    fn affected_balances(&self) -> BalanceDeltas {
        BalanceDeltas::inflow(self.base.legs())
    }
}
