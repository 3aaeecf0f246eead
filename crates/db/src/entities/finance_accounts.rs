//! `SeaORM` Entity for finance_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "finance_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_balance: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::finance_transactions::Entity")]
    FinanceTransactions,
}

impl Related<super::finance_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinanceTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
