use sea_orm::entity::prelude::*;

/// Billing and delivery details captured before payment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub country_code: String,
    pub state: Option<String>,
    pub city: String,
    pub street_address: String,
    pub post_code: Option<String>,
    pub email: String,
    pub phone: String,
    pub payment_method: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
