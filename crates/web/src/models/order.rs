//! Order domain types and the order/product relation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use mysite_core::{OrderId, ProductId, UserId, Username};

use super::Product;

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Primary key.
    pub id: OrderId,
    /// Owning user.
    pub user_id: UserId,
    /// Free-text discount code, at most 20 characters.
    pub promocode: String,
    pub delivery_address: String,
    /// Set once when the order is created.
    pub created_at: DateTime<Utc>,
}

/// Validated fields for creating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub promocode: String,
    pub delivery_address: String,
    pub products: BTreeSet<ProductId>,
}

/// An order with its owner's name and its products, loaded eagerly.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub username: Username,
    /// Products in ascending primary-key order.
    pub products: Vec<Product>,
}

/// In-memory form of the `order_products` join table.
///
/// Each `(order, product)` pair is held at most once and can be looked up
/// from either side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderProductLinks {
    by_order: BTreeMap<OrderId, BTreeSet<ProductId>>,
    by_product: BTreeMap<ProductId, BTreeSet<OrderId>>,
}

impl OrderProductLinks {
    /// Create an empty relation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `product` belongs to `order`. Returns `false` if the pair
    /// was already present.
    pub fn insert(&mut self, order: OrderId, product: ProductId) -> bool {
        let added = self.by_order.entry(order).or_default().insert(product);
        self.by_product.entry(product).or_default().insert(order);
        added
    }

    /// Products attached to an order.
    #[must_use]
    pub fn products_of(&self, order: OrderId) -> BTreeSet<ProductId> {
        self.by_order.get(&order).cloned().unwrap_or_default()
    }

    /// Orders that include a product.
    #[must_use]
    pub fn orders_of(&self, product: ProductId) -> BTreeSet<OrderId> {
        self.by_product.get(&product).cloned().unwrap_or_default()
    }

    /// Whether the pair is present.
    #[must_use]
    pub fn contains(&self, order: OrderId, product: ProductId) -> bool {
        self.by_order
            .get(&order)
            .is_some_and(|products| products.contains(&product))
    }

    /// Number of distinct pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_order.values().map(BTreeSet::len).sum()
    }

    /// Whether no pairs are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_order.is_empty()
    }
}

impl FromIterator<(OrderId, ProductId)> for OrderProductLinks {
    fn from_iter<I: IntoIterator<Item = (OrderId, ProductId)>>(iter: I) -> Self {
        let mut links = Self::new();
        for (order, product) in iter {
            links.insert(order, product);
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn o(id: i64) -> OrderId {
        OrderId::new(id)
    }

    fn p(id: i64) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn test_pairs_are_a_set() {
        let mut links = OrderProductLinks::new();
        assert!(links.insert(o(1), p(2)));
        assert!(!links.insert(o(1), p(2)));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_lookups_in_both_directions() {
        let links: OrderProductLinks = [(o(1), p(1)), (o(1), p(3)), (o(2), p(3))]
            .into_iter()
            .collect();

        assert_eq!(links.products_of(o(1)), BTreeSet::from([p(1), p(3)]));
        assert_eq!(links.orders_of(p(3)), BTreeSet::from([o(1), o(2)]));
        assert!(links.contains(o(2), p(3)));
        assert!(!links.contains(o(2), p(1)));
    }

    #[test]
    fn test_unknown_keys_are_empty() {
        let links = OrderProductLinks::new();
        assert!(links.is_empty());
        assert!(links.products_of(o(9)).is_empty());
        assert!(links.orders_of(p(9)).is_empty());
    }
}
