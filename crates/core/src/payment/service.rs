//! Payment posting service.
//!
//! One request runs through admission, validation, actor/member/batch
//! resolution, account and ledger locking, the account-type posting rule
//! and persistence, all inside a single unit of work. Every branch records
//! one audit event; every failure after admission is also reported to the
//! abuse guard.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use coopbook_shared::config::PostingConfig;
use coopbook_shared::types::{BranchId, GeneralLedgerId, OrganizationId, TransactionId};
use rust_decimal::Decimal;
use tracing::Instrument;

use super::error::PaymentError;
use super::ports::{
    AbuseGuard, ActorResolver, AuditEvent, AuditSink, Blocker, PaymentStore, UnitOfWork,
};
use super::types::{PaymentRequest, RequestContext, TransactionResult, UserOrganization};
use crate::batch::BatchHandle;
use crate::ledger::{
    GeneralLedgerEntry, LedgerError, LedgerSource, MemberAccountingLedger, Transaction,
    compute_posting,
};

/// A failed pipeline step: the audit activity and the error returned.
struct Rejection {
    activity: &'static str,
    error: PaymentError,
}

trait RejectWith<T> {
    fn reject_with(self, activity: &'static str) -> Result<T, Rejection>;
}

impl<T, E: Into<PaymentError>> RejectWith<T> for Result<T, E> {
    fn reject_with(self, activity: &'static str) -> Result<T, Rejection> {
        self.map_err(|err| Rejection {
            activity,
            error: err.into(),
        })
    }
}

fn reject(activity: &'static str, error: PaymentError) -> Rejection {
    Rejection { activity, error }
}

fn posting_activity(err: &LedgerError) -> &'static str {
    match err {
        LedgerError::InsufficientBalance { .. } => "balance-error",
        LedgerError::Overpayment { .. } => "loan-overpayment-error",
        LedgerError::LimitExceeded { .. } => "balance-limit-error",
        _ => "payment-error",
    }
}

/// Payment posting service.
pub struct PaymentService<S, A, G, L> {
    store: Arc<S>,
    actors: Arc<A>,
    guard: Arc<G>,
    audit: Arc<L>,
    config: PostingConfig,
}

impl<S, A, G, L> PaymentService<S, A, G, L>
where
    S: PaymentStore,
    A: ActorResolver,
    G: AbuseGuard,
    L: AuditSink,
{
    /// Create a new payment service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        actors: Arc<A>,
        guard: Arc<G>,
        audit: Arc<L>,
        config: PostingConfig,
    ) -> Self {
        Self {
            store,
            actors,
            guard,
            audit,
            config,
        }
    }

    /// Post a deposit.
    ///
    /// # Errors
    ///
    /// See [`Self::process`].
    pub async fn process_deposit(
        &self,
        ctx: &RequestContext,
        request: PaymentRequest,
    ) -> Result<TransactionResult, PaymentError> {
        self.process(ctx, request, LedgerSource::Deposit).await
    }

    /// Post a withdrawal.
    ///
    /// # Errors
    ///
    /// See [`Self::process`].
    pub async fn process_withdrawal(
        &self,
        ctx: &RequestContext,
        request: PaymentRequest,
    ) -> Result<TransactionResult, PaymentError> {
        self.process(ctx, request, LedgerSource::Withdraw).await
    }

    /// Post a payment.
    ///
    /// # Errors
    ///
    /// See [`Self::process`].
    pub async fn process_payment(
        &self,
        ctx: &RequestContext,
        request: PaymentRequest,
    ) -> Result<TransactionResult, PaymentError> {
        self.process(ctx, request, LedgerSource::Payment).await
    }

    /// Post one payment, deposit or withdrawal.
    ///
    /// Nothing is written unless every step succeeds. Dropping the returned
    /// future before it completes rolls the posting back.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is blocked (`RateLimited`) or the guard is unavailable (`Transient`)
    /// - The request is malformed (`Validation`)
    /// - The actor, member, account or payment type cannot be resolved or
    ///   belongs elsewhere (`Authentication`, `NotFound`, `Authorization`)
    /// - No open batch exists or the transaction belongs to another batch (`State`)
    /// - The account-type rule rejects the posting (`InsufficientBalance`,
    ///   `Overpayment`, `LimitExceeded`)
    /// - Storage fails (`Storage`)
    pub async fn process(
        &self,
        ctx: &RequestContext,
        request: PaymentRequest,
        source: LedgerSource,
    ) -> Result<TransactionResult, PaymentError> {
        let span = tracing::info_span!(
            "payment",
            account_id = ?request.account_id,
            source = %source,
            client = %ctx.client_key,
        );

        async {
            let started = Instant::now();
            let result = self.admit_and_post(ctx, request, source).await;

            let elapsed = started.elapsed();
            if elapsed > self.config.slow_operation() {
                tracing::warn!(elapsed_ms = elapsed.as_millis(), "slow payment");
                self.audit.record(AuditEvent::transaction(
                    "performance-warning",
                    format!(
                        "Payment operation took {:.2}s - potential performance issue",
                        elapsed.as_secs_f64()
                    ),
                ));
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn admit_and_post(
        &self,
        ctx: &RequestContext,
        request: PaymentRequest,
        source: LedgerSource,
    ) -> Result<TransactionResult, PaymentError> {
        let started = Instant::now();

        let decision =
            match tokio::time::timeout(self.config.guard_timeout(), self.guard.check(ctx)).await {
                Ok(Ok(decision)) => decision,
                Ok(Err(err)) => {
                    self.audit.record(AuditEvent::transaction(
                        "guard-check-error",
                        format!("Abuse guard check failed: {err}"),
                    ));
                    return Err(err.into());
                }
                Err(_) => {
                    self.audit.record(AuditEvent::transaction(
                        "guard-check-error",
                        "Abuse guard check timed out",
                    ));
                    return Err(PaymentError::Transient(
                        "abuse guard check timed out".to_string(),
                    ));
                }
            };

        if decision.blocked {
            self.audit.record(AuditEvent::transaction(
                "guard-blocked",
                "Client is temporarily blocked due to repeated errors",
            ));
            return Err(PaymentError::RateLimited);
        }

        match self.post(ctx, &request, source).await {
            Ok(result) => {
                self.audit.record(AuditEvent::transaction(
                    "payment-success",
                    format!(
                        "Posted {} ({}) to account {} in {}ms, new balance {}",
                        result.amount,
                        result.effective_source,
                        request
                            .account_id
                            .map(|id| id.to_string())
                            .unwrap_or_default(),
                        started.elapsed().as_millis(),
                        result.new_balance,
                    ),
                ));
                tracing::info!(
                    transaction_id = %result.transaction_id,
                    new_balance = %result.new_balance,
                    "payment posted"
                );
                Ok(result)
            }
            Err(Rejection { activity, error }) => {
                let reason = error.to_string();
                self.audit
                    .record(AuditEvent::transaction(activity, reason.clone()));
                decision.blocker.block(&reason);
                tracing::debug!(activity, error = %reason, "payment rejected");
                Err(error)
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    async fn post(
        &self,
        ctx: &RequestContext,
        request: &PaymentRequest,
        source: LedgerSource,
    ) -> Result<TransactionResult, Rejection> {
        // ========== Validation ==========
        if request.amount.is_zero() {
            return Err(reject(
                "payment-error",
                PaymentError::Validation("Payment amount cannot be zero".to_string()),
            ));
        }
        let (Some(account_id), Some(payment_type_id)) =
            (request.account_id, request.payment_type_id)
        else {
            return Err(reject(
                "validation-error",
                PaymentError::Validation(
                    "Missing required fields: account and payment type are required".to_string(),
                ),
            ));
        };

        // ========== Actor, member, batch ==========
        let actor = self
            .actors
            .current_user_organization(ctx)
            .await
            .reject_with("auth-error")?;

        if let Some(member_id) = request.member_profile_id {
            let member = self
                .store
                .find_member(member_id)
                .await
                .reject_with("member-error")?
                .ok_or_else(|| reject("member-error", PaymentError::not_found("member", member_id)))?;
            check_scope(&actor, member.organization_id, member.branch_id, "member")?;
        }

        let batch = self
            .store
            .current_batch(actor.user_id, actor.organization_id, actor.branch_id)
            .await
            .reject_with("batch-error")?
            .map(BatchHandle::new)
            .ok_or_else(|| {
                reject(
                    "batch-error",
                    PaymentError::State("No open transaction batch for this teller".to_string()),
                )
            })?;
        batch.ensure_open().reject_with("batch-error")?;

        let payment_type = self
            .store
            .find_payment_type(payment_type_id)
            .await
            .reject_with("payment-type-error")?
            .ok_or_else(|| {
                reject(
                    "payment-type-error",
                    PaymentError::not_found("payment type", payment_type_id),
                )
            })?;
        if payment_type.organization_id != actor.organization_id {
            return Err(reject(
                "organization-mismatch",
                PaymentError::Authorization(
                    "payment type does not belong to the current organization".to_string(),
                ),
            ));
        }

        // ========== Locked section ==========
        let mut uow = self.store.begin().await.reject_with("db-begin-error")?;

        let account = uow
            .lock_account(account_id)
            .await
            .reject_with("account-lock-error")?
            .ok_or_else(|| reject("account-error", PaymentError::not_found("account", account_id)))?;
        check_scope(&actor, account.organization_id, account.branch_id, "account")?;

        let existing = match request.transaction_id {
            Some(id) => uow.find_transaction(id).await.reject_with("transaction-error")?,
            None => None,
        };
        match &existing {
            Some(transaction) => {
                batch
                    .ensure_owns(transaction)
                    .reject_with("transaction-batch-mismatch")?;
                self.audit.record(AuditEvent::transaction(
                    "transaction-reused",
                    format!(
                        "Posting '{source}' onto existing '{}' transaction {}",
                        transaction.source, transaction.id
                    ),
                ));
            }
            None => {
                if let Some(id) = request.transaction_id {
                    self.audit.record(AuditEvent::transaction(
                        "transaction-not-found",
                        format!("Transaction {id} not found, creating a new one with source '{source}'"),
                    ));
                }
            }
        }

        let inherited_member = match (request.member_profile_id, &existing) {
            (None, Some(transaction)) => transaction.member_profile_id,
            _ => None,
        };
        if let Some(member_id) = inherited_member {
            let member = self
                .store
                .find_member(member_id)
                .await
                .reject_with("transaction-member-error")?
                .ok_or_else(|| {
                    reject(
                        "transaction-member-error",
                        PaymentError::not_found("member", member_id),
                    )
                })?;
            check_scope(&actor, member.organization_id, member.branch_id, "transaction member")
                .map_err(|rejection| Rejection {
                    activity: "transaction-member-mismatch",
                    ..rejection
                })?;
            self.audit.record(AuditEvent::transaction(
                "member-from-existing-transaction",
                format!("Using member {member_id} from the existing transaction"),
            ));
        }
        let member_profile_id = request.member_profile_id.or(inherited_member);

        let latest = uow
            .lock_latest_ledger(
                account_id,
                member_profile_id,
                actor.organization_id,
                actor.branch_id,
            )
            .await
            .reject_with("ledger-error")?;
        if latest.is_none() {
            let activity = if member_profile_id.is_some() {
                "new-member-account"
            } else {
                "new-subsidiary-account"
            };
            self.audit.record(AuditEvent::transaction(
                activity,
                format!("No ledger rows for account {account_id}, starting from zero"),
            ));
        }

        let posting = compute_posting(
            &account,
            latest.as_ref().map(|entry| entry.balance),
            request.amount,
            source,
        )
        .map_err(|err| reject(posting_activity(&err), err.into()))?;
        if posting.was_negative_normalized {
            self.audit.record(AuditEvent::transaction(
                "negative-amount-handled",
                format!(
                    "Negative amount {} posted as {} {}",
                    request.amount, posting.source, posting.amount
                ),
            ));
        }

        // ========== Persistence ==========
        let now = Utc::now();
        let transaction = match existing {
            Some(transaction) => transaction,
            None => {
                let transaction = Transaction {
                    id: TransactionId::new(),
                    organization_id: actor.organization_id,
                    branch_id: actor.branch_id,
                    transaction_batch_id: batch.id(),
                    member_profile_id,
                    member_joint_account_id: request.member_joint_account_id,
                    employee_user_id: actor.user_id,
                    reference_number: request.reference_number.clone(),
                    description: request.description.clone(),
                    source: posting.source,
                    amount: Decimal::ZERO,
                    created_at: now,
                    updated_at: now,
                };
                uow.create_transaction(&transaction)
                    .await
                    .reject_with("transaction-create-error")?;
                transaction
            }
        };

        let reference_number = transaction
            .reference_number
            .clone()
            .filter(|reference| !reference.is_empty())
            .or_else(|| request.reference_number.clone())
            .unwrap_or_default();
        let entry_date = request.entry_date.unwrap_or(now);

        let entry = GeneralLedgerEntry {
            id: GeneralLedgerId::new(),
            organization_id: actor.organization_id,
            branch_id: actor.branch_id,
            account_id,
            transaction_id: Some(transaction.id),
            transaction_batch_id: Some(batch.id()),
            member_profile_id,
            member_joint_account_id: request.member_joint_account_id,
            employee_user_id: Some(actor.user_id),
            payment_type_id: Some(payment_type_id),
            bank_id: request.bank_id,
            proof_of_payment_media_id: request.proof_of_payment_media_id,
            signature_media_id: request.signature_media_id,
            source: posting.source,
            reference_number,
            bank_reference_number: request.bank_reference_number.clone(),
            description: request.description.clone(),
            debit: posting.debit,
            credit: posting.credit,
            balance: posting.new_balance,
            entry_date,
            created_at: now,
        };
        uow.create_ledger_entry(&entry)
            .await
            .reject_with("ledger-create-error")?;

        if request.or_auto_generated {
            let counter = uow
                .lock_official_receipt(actor.id)
                .await
                .reject_with("used-or-update-error")?
                .ok_or_else(|| {
                    reject(
                        "used-or-update-error",
                        PaymentError::State(
                            "No official receipt range configured for this teller".to_string(),
                        ),
                    )
                })?;
            let advanced = counter.advance().ok_or_else(|| {
                reject(
                    "used-or-limit-exceeded",
                    PaymentError::State("Used OR limit exceeded for this teller".to_string()),
                )
            })?;
            uow.save_official_receipt(actor.id, advanced)
                .await
                .reject_with("used-or-update-error")?;
        }

        uow.update_transaction_amount(transaction.id, posting.transaction_delta())
            .await
            .reject_with("transaction-update-error")?;

        if let Some(member_id) = member_profile_id {
            uow.upsert_member_accounting_ledger(&MemberAccountingLedger {
                member_profile_id: member_id,
                account_id,
                organization_id: actor.organization_id,
                branch_id: actor.branch_id,
                balance: posting.new_balance,
                last_pay: entry_date,
                updated_at: now,
            })
            .await
            .reject_with("member-accounting-ledger-error")?;
            self.audit.record(AuditEvent::transaction(
                "member-accounting-ledger-updated",
                format!("Cached balance of member {member_id} on account {account_id} updated"),
            ));
        }

        uow.commit().await.reject_with("db-commit-error")?;

        Ok(TransactionResult {
            transaction_id: transaction.id,
            general_ledger_id: entry.id,
            amount: posting.amount,
            new_balance: posting.new_balance,
            effective_source: posting.source,
            was_negative_normalized: posting.was_negative_normalized,
        })
    }
}

fn check_scope(
    actor: &UserOrganization,
    organization_id: OrganizationId,
    branch_id: BranchId,
    what: &str,
) -> Result<(), Rejection> {
    if organization_id != actor.organization_id {
        return Err(reject(
            "organization-mismatch",
            PaymentError::Authorization(format!(
                "{what} does not belong to the current organization"
            )),
        ));
    }
    if branch_id != actor.branch_id {
        return Err(reject(
            "branch-mismatch",
            PaymentError::Authorization(format!("{what} does not belong to the current branch")),
        ));
    }
    Ok(())
}
