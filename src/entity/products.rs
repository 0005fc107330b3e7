use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub content: Option<String>,
    pub price: i64,
    pub discount_price: i64,
    pub weight_grams: i64,
    pub available: i32,
    pub sku: Option<String>,
    pub on_sale: bool,
    pub promotional: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub tags: Option<String>,
    pub image_url: Option<String>,
    #[sea_orm(unique)]
    pub slug: String,
    pub rating_average: i32,
    pub rating_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::VendorId",
        to = "super::profiles::Column::Id"
    )]
    Vendor,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
