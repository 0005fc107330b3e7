use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_details_suppliers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_supplier_id: Uuid,
    #[sea_orm(unique)]
    pub order_detail_id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub price: i64,
    pub quantity: i32,
    pub size: Option<String>,
    pub weight_grams: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_suppliers::Entity",
        from = "Column::OrderSupplierId",
        to = "super::order_suppliers::Column::Id"
    )]
    OrderSuppliers,
}

impl Related<super::order_suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderSuppliers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
