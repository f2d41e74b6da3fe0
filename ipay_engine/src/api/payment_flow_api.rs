use std::{collections::HashSet, fmt::Debug};

use log::*;

use crate::{
    api::{errors::PaymentFlowError, payment_objects::NewPaymentRequest, transaction_objects::TransactionQueryFilter},
    db_types::{Identity, NewTransaction, Role, StatusChange, Transaction, TransactionDetail, TransactionStatus},
    traits::{BatchSettlement, TransactionManagement, TransitionResult},
    validation::{
        parse_amount,
        require_non_blank,
        validate_currency,
        validate_payee_account,
        validate_swift_code,
        ValidationError,
    },
};

/// The most distinct transaction ids a single settlement batch may name. Each id is one bound parameter in the update.
pub const MAX_BATCH_SIZE: usize = 500;

/// `PaymentFlowApi` drives the transaction status workflow: customers submit payments, employees verify them and then
/// submit them for settlement in batches.
///
/// Every operation takes the caller's [`Identity`] and checks the role itself, so the workflow rules hold no matter
/// which transport sits in front of it.
pub struct PaymentFlowApi<B> {
    db: B,
}

impl<B> Debug for PaymentFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B> PaymentFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

fn require_role(identity: &Identity, role: Role) -> Result<(), PaymentFlowError> {
    if identity.role == role {
        Ok(())
    } else {
        debug!("🔄️ {} #{} attempted an action reserved for {role}s", identity.role, identity.user_id);
        Err(PaymentFlowError::Forbidden)
    }
}

impl<B> PaymentFlowApi<B>
where B: TransactionManagement
{
    /// Creates a `Pending` transaction owned by the calling customer. There is no idempotency key: submitting the same
    /// payment twice creates two transactions.
    pub async fn submit_payment(
        &self,
        identity: &Identity,
        request: NewPaymentRequest,
    ) -> Result<Transaction, PaymentFlowError> {
        require_role(identity, Role::Customer)?;
        let NewPaymentRequest { amount, currency, provider, payee_account, swift_code } = request;
        require_non_blank(&amount, "Amount")?;
        require_non_blank(&currency, "Currency")?;
        require_non_blank(&provider, "Provider")?;
        require_non_blank(&payee_account, "Payee account")?;
        require_non_blank(&swift_code, "SWIFT code")?;
        let amount = parse_amount(&amount)?;
        validate_currency(&currency)?;
        validate_payee_account(&payee_account)?;
        validate_swift_code(&swift_code)?;
        let new_tx = NewTransaction {
            customer_id: identity.user_id,
            amount,
            currency,
            provider: provider.trim().to_string(),
            payee_account,
            swift_code,
        };
        let transaction = self.db.insert_transaction(new_tx).await?;
        info!(
            "🔄️💸️ Customer #{} submitted payment #{} of {} {}",
            identity.user_id, transaction.id, transaction.amount, transaction.currency
        );
        Ok(transaction)
    }

    /// Moves a `Pending` transaction to `Verified`.
    pub async fn verify(&self, identity: &Identity, id: i64) -> Result<Transaction, PaymentFlowError> {
        self.transition(identity, id, TransactionStatus::Verified).await
    }

    /// Settles a single `Verified` transaction, moving it to `Completed`.
    pub async fn complete(&self, identity: &Identity, id: i64) -> Result<Transaction, PaymentFlowError> {
        self.transition(identity, id, TransactionStatus::Completed).await
    }

    /// Moves transaction `id` to the status named by `status`. Only `Verified` and `Completed` can be requested, and
    /// each requires the transaction to currently be in the preceding status.
    pub async fn update_status(
        &self,
        identity: &Identity,
        id: i64,
        status: &str,
    ) -> Result<Transaction, PaymentFlowError> {
        require_role(identity, Role::Employee)?;
        require_non_blank(status, "Status")?;
        let target = match status.parse::<TransactionStatus>() {
            Ok(s) if s.predecessor().is_some() => s,
            _ => return Err(ValidationError::UnsupportedStatus(status.to_string()).into()),
        };
        self.transition(identity, id, target).await
    }

    async fn transition(
        &self,
        identity: &Identity,
        id: i64,
        to: TransactionStatus,
    ) -> Result<Transaction, PaymentFlowError> {
        require_role(identity, Role::Employee)?;
        let from = to.predecessor().ok_or_else(|| ValidationError::UnsupportedStatus(to.to_string()))?;
        match self.db.transition_status(id, from, to, identity.user_id).await? {
            TransitionResult::Updated(transaction) => {
                info!("🔄️ Employee #{} moved transaction #{id} from {from} to {to}", identity.user_id);
                Ok(transaction)
            },
            TransitionResult::NotFound => Err(PaymentFlowError::NotFound(id)),
            TransitionResult::StatusMismatch(current) => {
                Err(PaymentFlowError::InvalidTransition { id, current, requested: to })
            },
        }
    }

    /// Submits a batch of `Verified` transactions for settlement. All or nothing: if any id is not `Verified` (or does
    /// not exist), nothing is changed and those ids are reported in [`PaymentFlowError::PreconditionFailed`].
    ///
    /// Duplicate ids are collapsed, keeping the first occurrence, and at most [`MAX_BATCH_SIZE`] distinct ids are
    /// accepted. Returns the number of transactions completed.
    pub async fn submit_batch(&self, identity: &Identity, ids: &[i64]) -> Result<u64, PaymentFlowError> {
        require_role(identity, Role::Employee)?;
        if ids.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        let mut seen = HashSet::with_capacity(ids.len());
        let ids = ids.iter().copied().filter(|id| seen.insert(*id)).collect::<Vec<_>>();
        if ids.len() > MAX_BATCH_SIZE {
            return Err(ValidationError::BatchTooLarge(MAX_BATCH_SIZE).into());
        }
        match self.db.settle_batch(&ids, identity.user_id).await? {
            BatchSettlement::Settled(count) => {
                info!("🔄️🏦️ Employee #{} submitted {count} transactions for settlement", identity.user_id);
                Ok(count)
            },
            BatchSettlement::Unverified(unverified) => {
                debug!("🔄️🏦️ Settlement batch rejected. Unverified transactions: {unverified:?}");
                Err(PaymentFlowError::PreconditionFailed(unverified))
            },
        }
    }

    /// Every transaction, newest first, with the owning customer's name.
    pub async fn list_transactions(&self, identity: &Identity) -> Result<Vec<TransactionDetail>, PaymentFlowError> {
        require_role(identity, Role::Employee)?;
        let transactions = self.db.search_transactions(TransactionQueryFilter::default()).await?;
        trace!("🔄️ {} transactions fetched for employee #{}", transactions.len(), identity.user_id);
        Ok(transactions)
    }

    pub async fn search_transactions(
        &self,
        identity: &Identity,
        query: TransactionQueryFilter,
    ) -> Result<Vec<TransactionDetail>, PaymentFlowError> {
        require_role(identity, Role::Employee)?;
        Ok(self.db.search_transactions(query).await?)
    }

    /// The status history of a transaction, oldest first.
    pub async fn transaction_history(
        &self,
        identity: &Identity,
        id: i64,
    ) -> Result<Vec<StatusChange>, PaymentFlowError> {
        require_role(identity, Role::Employee)?;
        if self.db.fetch_transaction(id).await?.is_none() {
            return Err(PaymentFlowError::NotFound(id));
        }
        Ok(self.db.fetch_status_history(id).await?)
    }
}
