//! SeaORM entities owned by the order service.

pub mod order;
pub mod order_item;
