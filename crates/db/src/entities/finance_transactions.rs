//! `SeaORM` Entity for finance_transactions table.

use super::sea_orm_active_enums::{TransactionSide, TransactionStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "finance_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub side: TransactionSide,
    pub status: TransactionStatus,
    pub account_id: Uuid,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub base_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub remaining_to_allocate: Decimal,
    pub category_id: Option<Uuid>,
    pub counterparty_id: Option<Uuid>,
    pub owner_who: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::finance_accounts::Entity",
        from = "Column::AccountId",
        to = "super::finance_accounts::Column::Id"
    )]
    FinanceAccounts,
    #[sea_orm(has_many = "super::finance_allocations::Entity")]
    FinanceAllocations,
}

impl Related<super::finance_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinanceAccounts.def()
    }
}

impl Related<super::finance_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinanceAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
