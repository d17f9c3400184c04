//! Loan management service: borrowed listings and renewals

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        instance::BookInstance,
        loan::{LoanDetails, RenewalPrefill, RenewalRequest},
        page::Page,
    },
    renewal::{RenewalDecision, RenewalPolicy},
    repository::loans::LoanStore,
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn LoanStore>,
    policy: RenewalPolicy,
}

impl LoansService {
    pub fn new(store: Arc<dyn LoanStore>, policy: RenewalPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RenewalPolicy {
        &self.policy
    }

    /// Every copy on loan, soonest due first
    pub async fn all_on_loan(&self, page: Page, today: NaiveDate) -> AppResult<(Vec<LoanDetails>, i64)> {
        let (rows, total) = self.store.list_on_loan(None, page).await?;
        let loans = rows.into_iter().map(|row| LoanDetails::from_row(row, today)).collect();
        Ok((loans, total))
    }

    /// Copies on loan to one borrower, soonest due first
    pub async fn on_loan_to(
        &self,
        borrower_id: i32,
        page: Page,
        today: NaiveDate,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let (rows, total) = self.store.list_on_loan(Some(borrower_id), page).await?;
        let loans = rows.into_iter().map(|row| LoanDetails::from_row(row, today)).collect();
        Ok((loans, total))
    }

    /// Renewal form for a copy, pre-filled with the default proposal
    pub async fn renewal_prefill(&self, instance_id: Uuid, today: NaiveDate) -> AppResult<RenewalPrefill> {
        let instance = self.store.get_instance(instance_id).await?;
        Ok(RenewalPrefill {
            instance,
            renewal_date: self.policy.default_proposal(today),
            latest_date: self.policy.latest(today),
        })
    }

    /// Renew the loan of a copy.
    ///
    /// The proposed date is parsed before anything else; the copy must exist
    /// and be on loan; an accepted date is written as the new due-back date.
    pub async fn renew(
        &self,
        instance_id: Uuid,
        request: &RenewalRequest,
        today: NaiveDate,
    ) -> AppResult<BookInstance> {
        let proposed = request.parse_date().map_err(|e| {
            AppError::MalformedInput(format!("renewal_date '{}': {}", request.renewal_date, e))
        })?;

        let instance = self.store.get_instance(instance_id).await?;
        if !instance.is_on_loan() {
            return Err(AppError::BusinessRule(format!(
                "Book instance {} is not on loan",
                instance_id
            )));
        }

        match self.policy.evaluate(today, proposed) {
            RenewalDecision::Accepted(due_back) => {
                let renewed = self.store.set_due_back(instance_id, due_back).await?;
                tracing::info!(
                    "Renewed book instance {}: due back {} (was {:?})",
                    instance_id,
                    due_back,
                    instance.due_back
                );
                Ok(renewed)
            }
            RenewalDecision::Rejected(reason) => {
                tracing::debug!("Renewal of {} to {} rejected: {}", instance_id, proposed, reason);
                Err(AppError::Renewal(reason))
            }
        }
    }
}
