//! Conversions between stored rows and domain types.

use chrono::{DateTime, Utc};
use coopbook_core::batch::TransactionBatch;
use coopbook_core::ledger::{
    Account, GeneralLedgerEntry, GeneralLedgerType, GracePeriods, LedgerSource, Transaction,
};
use coopbook_core::payment::{
    MemberProfile, OfficialReceiptCounter, PaymentType, StoreError, UserOrganization, UserType,
};
use sea_orm::DbErr;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::entities::{
    accounts, general_ledgers, member_profiles, payment_types, transaction_batches, transactions,
    user_organizations,
};

pub(crate) fn db_err(err: DbErr) -> StoreError {
    StoreError::database(err.to_string())
}

pub(crate) fn utc(at: DateTimeWithTimeZone) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

pub(crate) fn stored(at: DateTime<Utc>) -> DateTimeWithTimeZone {
    at.into()
}

fn corrupt(table: &str, id: Uuid, err: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{table} {id}: {err}"))
}

pub(crate) fn parse_source(
    table: &str,
    id: Uuid,
    label: &str,
) -> Result<LedgerSource, StoreError> {
    label.parse().map_err(|err| corrupt(table, id, err))
}

impl TryFrom<accounts::Model> for Account {
    type Error = StoreError;

    fn try_from(model: accounts::Model) -> Result<Self, Self::Error> {
        let account_type = model
            .account_type
            .parse()
            .map_err(|err| corrupt("account", model.id, err))?;

        Ok(Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            branch_id: model.branch_id.into(),
            name: model.name,
            account_type,
            general_ledger_type: model
                .general_ledger_type
                .as_deref()
                .map(GeneralLedgerType::from_label),
            currency_id: model.currency_id.map(Into::into),
            min_amount: model.min_amount,
            max_amount: model.max_amount,
            grace: GracePeriods {
                daily: model.grace_daily,
                weekly: model.grace_weekly,
                semi_monthly: model.grace_semi_monthly,
                monthly: model.grace_monthly,
                quarterly: model.grace_quarterly,
                semi_annual: model.grace_semi_annual,
                lumpsum: model.grace_lumpsum,
            },
        })
    }
}

impl TryFrom<general_ledgers::Model> for GeneralLedgerEntry {
    type Error = StoreError;

    fn try_from(model: general_ledgers::Model) -> Result<Self, Self::Error> {
        let source = parse_source("general ledger", model.id, &model.source)?;

        Ok(Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            branch_id: model.branch_id.into(),
            account_id: model.account_id.into(),
            transaction_id: model.transaction_id.map(Into::into),
            transaction_batch_id: model.transaction_batch_id.map(Into::into),
            member_profile_id: model.member_profile_id.map(Into::into),
            member_joint_account_id: model.member_joint_account_id.map(Into::into),
            employee_user_id: model.employee_user_id.map(Into::into),
            payment_type_id: model.payment_type_id.map(Into::into),
            bank_id: model.bank_id.map(Into::into),
            proof_of_payment_media_id: model.proof_of_payment_media_id.map(Into::into),
            signature_media_id: model.signature_media_id.map(Into::into),
            source,
            reference_number: model.reference_number,
            bank_reference_number: model.bank_reference_number,
            description: model.description,
            debit: model.debit,
            credit: model.credit,
            balance: model.balance,
            entry_date: utc(model.entry_date),
            created_at: utc(model.created_at),
        })
    }
}

impl TryFrom<transactions::Model> for Transaction {
    type Error = StoreError;

    fn try_from(model: transactions::Model) -> Result<Self, Self::Error> {
        let source = parse_source("transaction", model.id, &model.source)?;

        Ok(Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            branch_id: model.branch_id.into(),
            transaction_batch_id: model.transaction_batch_id.into(),
            member_profile_id: model.member_profile_id.map(Into::into),
            member_joint_account_id: model.member_joint_account_id.map(Into::into),
            employee_user_id: model.employee_user_id.into(),
            reference_number: model.reference_number,
            description: model.description,
            source,
            amount: model.amount,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        })
    }
}

impl From<transaction_batches::Model> for TransactionBatch {
    fn from(model: transaction_batches::Model) -> Self {
        Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            branch_id: model.branch_id.into(),
            employee_user_id: model.employee_user_id.into(),
            beginning_balance: model.beginning_balance,
            is_closed: model.is_closed,
            created_at: utc(model.created_at),
        }
    }
}

impl From<member_profiles::Model> for MemberProfile {
    fn from(model: member_profiles::Model) -> Self {
        Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            branch_id: model.branch_id.into(),
            full_name: model.full_name,
        }
    }
}

impl From<payment_types::Model> for PaymentType {
    fn from(model: payment_types::Model) -> Self {
        Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            name: model.name,
        }
    }
}

impl TryFrom<user_organizations::Model> for UserOrganization {
    type Error = StoreError;

    fn try_from(model: user_organizations::Model) -> Result<Self, Self::Error> {
        let user_type = match model.user_type.as_str() {
            "owner" => UserType::Owner,
            "employee" => UserType::Employee,
            "member" => UserType::Member,
            other => {
                return Err(corrupt(
                    "user organization",
                    model.id,
                    format!("unknown user type '{other}'"),
                ));
            }
        };

        Ok(Self {
            id: model.id.into(),
            user_id: model.user_id.into(),
            organization_id: model.organization_id.into(),
            branch_id: model.branch_id.into(),
            user_type,
        })
    }
}

impl From<&user_organizations::Model> for OfficialReceiptCounter {
    fn from(model: &user_organizations::Model) -> Self {
        Self {
            start: model.or_start,
            end: model.or_end,
            used: model.or_used,
        }
    }
}
