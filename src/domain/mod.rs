pub mod account;
pub mod order;
pub mod product;

pub use account::Account;
pub use order::{
    generate_order_code, BasketItem, NewOrder, NewOrderLine, Order, OrderDetail, OrderLine,
    OrderLineDetail, OrderSummary, PlaceOrderRequest,
};
pub use product::Product;
