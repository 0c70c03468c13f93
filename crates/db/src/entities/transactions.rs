//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub transaction_batch_id: Uuid,
    pub member_profile_id: Option<Uuid>,
    pub member_joint_account_id: Option<Uuid>,
    pub employee_user_id: Uuid,
    pub reference_number: Option<String>,
    pub description: Option<String>,
    pub source: String,
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transaction_batches::Entity",
        from = "Column::TransactionBatchId",
        to = "super::transaction_batches::Column::Id"
    )]
    TransactionBatches,
    #[sea_orm(has_many = "super::general_ledgers::Entity")]
    GeneralLedgers,
}

impl Related<super::transaction_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionBatches.def()
    }
}

impl Related<super::general_ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneralLedgers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
