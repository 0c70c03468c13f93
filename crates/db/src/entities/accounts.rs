//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub account_type: String,
    pub general_ledger_type: Option<String>,
    pub currency_id: Option<Uuid>,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub grace_daily: Decimal,
    pub grace_weekly: Decimal,
    pub grace_semi_monthly: Decimal,
    pub grace_monthly: Decimal,
    pub grace_quarterly: Decimal,
    pub grace_semi_annual: Decimal,
    pub grace_lumpsum: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::general_ledgers::Entity")]
    GeneralLedgers,
}

impl Related<super::general_ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneralLedgers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
