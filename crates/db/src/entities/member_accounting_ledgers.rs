//! `SeaORM` Entity for member_accounting_ledgers table.
//!
//! One row per (member, account) pair, unique on both columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "member_accounting_ledgers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_profile_id: Uuid,
    pub account_id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub balance: Decimal,
    pub last_pay: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
