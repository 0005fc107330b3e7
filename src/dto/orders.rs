use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Billing, Order, OrderLine, OrderSupplier};

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub suppliers: Vec<OrderSupplier>,
    pub billing: Option<Billing>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
