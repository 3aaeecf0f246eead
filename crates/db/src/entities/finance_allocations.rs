//! `SeaORM` Entity for finance_allocations table.

use super::sea_orm_active_enums::{AllocationStatus, TransactionSide};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "finance_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub booking_id: Uuid,
    pub date: Date,
    pub side: TransactionSide,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub status: AllocationStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::finance_transactions::Entity",
        from = "Column::TransactionId",
        to = "super::finance_transactions::Column::Id",
        on_delete = "Cascade"
    )]
    FinanceTransactions,
}

impl Related<super::finance_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinanceTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
