use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::menu::menu;
use super::DataSourceHandler;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::id::compute_id;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

/// Customer used when the block names none.
const DEFAULT_CUSTOMER: &str = "guest";

/// What goes into the example order: menu item and quantity.
const ORDER_LINES: &[(&str, u32)] = &[
    ("pastrami_on_rye", 2),
    ("lemonade", 2),
    ("large_chips", 1),
];

/// Arguments of `hw_order`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderArgs {
    #[serde(default)]
    customer: Option<String>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Menu item name.
    pub name: String,
    /// How many were ordered.
    pub quantity: u32,
    /// Menu price of one item.
    pub unit_price: Decimal,
    /// `unit_price` times `quantity`.
    pub line_total: Decimal,
}

/// An example order priced from the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// `order-<customer>-<len>`
    pub id: String,
    /// Who the order is for.
    pub customer: String,
    /// Ordered items.
    pub items: Vec<OrderLine>,
    /// Sum of the line totals.
    pub total: Decimal,
}

impl Order {
    /// Price the example order for `customer` against the current menu.
    pub fn example(customer: &str, upcharge: Decimal) -> Result<Self, ProviderError> {
        let listing = menu(upcharge);
        let items = ORDER_LINES
            .iter()
            .map(|&(name, quantity)| {
                let item = listing
                    .iter()
                    .find(|item| item.name == name)
                    .ok_or_else(|| ProviderError::NotFound(format!("menu item {}", name)))?;
                Ok(OrderLine {
                    name: item.name.clone(),
                    quantity,
                    unit_price: item.price,
                    line_total: item.price * Decimal::from(quantity),
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;
        let total = items.iter().map(|line| line.line_total).sum();

        Ok(Self {
            id: compute_id("order", customer),
            customer: customer.to_string(),
            items,
            total,
        })
    }
}

/// `hw_order`
pub struct ExampleOrder;

impl DataSourceHandler for ExampleOrder {
    const TYPE_NAME: &'static str = "hw_order";
    type Args = OrderArgs;
    type Output = Order;

    fn schema() -> Schema {
        let line = AttributeType::object([
            ("name", AttributeType::String),
            ("quantity", AttributeType::Int64),
            ("unit_price", AttributeType::String),
            ("line_total", AttributeType::String),
        ]);
        Schema::v0()
            .with_description("An example order priced from the menu")
            .with_attribute(
                "customer",
                Attribute::optional_string().with_description(format!(
                    "Who the order is for. Defaults to `{}`",
                    DEFAULT_CUSTOMER
                )),
            )
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "items",
                Attribute::new(AttributeType::list(line), AttributeFlags::computed()),
            )
            .with_attribute("total", Attribute::computed_money())
    }

    fn read(args: OrderArgs, config: &ProviderConfig) -> Result<Order, ProviderError> {
        let customer = args.customer.as_deref().unwrap_or(DEFAULT_CUSTOMER);
        Order::example(customer, config.upcharge)
    }
}
