//! JSON export of products and orders.
//!
//! Pure functions over already-loaded rows; callers load fresh data for every
//! request.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use mysite_core::{OrderId, Price, ProductId, UserId};

use crate::models::{Order, OrderProductLinks, Product};

/// `{"products": [...]}`
#[derive(Debug, Serialize)]
pub struct ProductsExport {
    pub products: Vec<ProductRecord>,
}

/// One row of the product export.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProductRecord {
    pub pk: ProductId,
    pub name: String,
    pub price: Price,
    pub archived: bool,
}

/// `{"orders": [...]}`
#[derive(Debug, Serialize)]
pub struct OrdersExport {
    pub orders: Vec<OrderRecord>,
}

/// One row of the order export.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OrderRecord {
    pub pk: OrderId,
    pub delivery_address: String,
    pub created_at: String,
    pub user_id: UserId,
    pub promocode: String,
    pub products: Vec<OrderProductRecord>,
}

/// A product nested inside an order record.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OrderProductRecord {
    pub name: String,
    pub price: Price,
}

/// Flatten products in the order given (expected ascending by pk).
#[must_use]
pub fn export_products(products: &[Product]) -> ProductsExport {
    ProductsExport {
        products: products
            .iter()
            .map(|p| ProductRecord {
                pk: p.id,
                name: p.name.clone(),
                price: p.price,
                archived: p.is_archived(),
            })
            .collect(),
    }
}

/// Flatten orders with their products.
///
/// `products` is the full product table in pk order; each order lists the
/// members of that table it is linked to, in the same order.
#[must_use]
pub fn export_orders(
    orders: &[Order],
    products: &[Product],
    links: &OrderProductLinks,
) -> OrdersExport {
    OrdersExport {
        orders: orders
            .iter()
            .map(|order| OrderRecord {
                pk: order.id,
                delivery_address: order.delivery_address.clone(),
                created_at: format_timestamp(&order.created_at),
                user_id: order.user_id,
                promocode: order.promocode.clone(),
                products: products
                    .iter()
                    .filter(|p| links.contains(order.id, p.id))
                    .map(|p| OrderProductRecord {
                        name: p.name.clone(),
                        price: p.price,
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// `YYYY-MM-DD HH:MM:SS[.ffffff]+HH:MM`, with the fraction only when the
/// timestamp has non-zero microseconds.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    if ts.nanosecond() / 1_000 == 0 {
        ts.format("%Y-%m-%d %H:%M:%S%:z").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use mysite_core::ProductStatus;

    use super::*;

    fn product(id: i64, name: &str, price: &str, status: ProductStatus) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: String::new(),
            price: Price::parse(price).unwrap(),
            discount: 0,
            created_at: Utc::now(),
            status,
            preview: None,
        }
    }

    fn order(id: i64, user: i64) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(user),
            promocode: "SALE".to_owned(),
            delivery_address: "1 Main St".to_owned(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_format_timestamp_without_fraction() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02 03:04:05+00:00");
    }

    #[test]
    fn test_format_timestamp_with_micros() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::microseconds(120);
        assert_eq!(format_timestamp(&ts), "2024-01-02 03:04:05.000120+00:00");
    }

    #[test]
    fn test_product_export_shape() {
        let products = vec![
            product(1, "Laptop", "1999", ProductStatus::Active),
            product(2, "Old", "5.5", ProductStatus::Archived),
        ];

        let json = serde_json::to_value(export_products(&products)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "products": [
                    {"pk": 1, "name": "Laptop", "price": "1999.00", "archived": false},
                    {"pk": 2, "name": "Old", "price": "5.50", "archived": true},
                ]
            })
        );
    }

    #[test]
    fn test_order_export_follows_product_table_order() {
        let products = vec![
            product(1, "A", "1", ProductStatus::Active),
            product(2, "B", "2", ProductStatus::Active),
            product(3, "C", "3", ProductStatus::Archived),
        ];
        let orders = vec![order(1, 7), order(2, 8)];
        let links: OrderProductLinks = [
            (OrderId::new(1), ProductId::new(3)),
            (OrderId::new(1), ProductId::new(1)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(export_orders(&orders, &products, &links)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "orders": [
                    {
                        "pk": 1,
                        "delivery_address": "1 Main St",
                        "created_at": "2024-01-02 03:04:05+00:00",
                        "user_id": 7,
                        "promocode": "SALE",
                        "products": [
                            {"name": "A", "price": "1.00"},
                            {"name": "C", "price": "3.00"},
                        ],
                    },
                    {
                        "pk": 2,
                        "delivery_address": "1 Main St",
                        "created_at": "2024-01-02 03:04:05+00:00",
                        "user_id": 8,
                        "promocode": "SALE",
                        "products": [],
                    },
                ]
            })
        );
    }
}
