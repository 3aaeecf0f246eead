//! `SeaORM` Entity for bookings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_number: String,
    pub operator: String,
    pub agent: Option<String>,
    pub created_on: Date,
    pub check_in: Option<Date>,
    pub payment_method: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub gross_client_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub internal_net: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub supplier_net: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub operator_gross: Option<Decimal>,
    pub pooled_base: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub commission: Json,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
