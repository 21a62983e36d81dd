//! Cart Aggregate
//!
//! One cart per session. Lines keep insertion order for display; totals are
//! derived on read rather than cached, so reads can never observe a stale
//! subtotal. Mutations raise [`CartEvent`]s for observers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::product::Product;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub struct Cart {
    id: String,
    currency: String,
    lines: Vec<CartLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// One (product, quantity) entry. Invariant: quantity >= 1 — a line driven
/// to zero is removed by the cart, never retained.
#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.product.price.multiply(self.quantity) }
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            currency: currency.to_string(),
            lines: vec![],
            created_at: now,
            updated_at: now,
            events: vec![],
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Adds `quantity` of `product`, merging into an existing line for the
    /// same product id. Zero quantity clamps to 1; inputs come from trusted
    /// UI state, so correction beats failure here.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine { product: product.clone(), quantity });
        }
        self.raise(CartEvent::ItemAdded { product_id: product.id.clone(), quantity });
        self.touch();
    }

    /// Removes the line for `product_id`. Absent id is a no-op, so repeated
    /// clicks are safe.
    pub fn remove(&mut self, product_id: &str) {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        if self.lines.len() != before {
            self.raise(CartEvent::ItemRemoved { product_id: product_id.to_string() });
            self.touch();
        }
    }

    /// Sets the line's quantity to exactly `quantity` (replacement, not
    /// delta). Zero behaves as [`Cart::remove`]. Absent id is a no-op — no
    /// line is created.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity;
            self.raise(CartEvent::QuantityUpdated { product_id: product_id.to_string(), quantity });
            self.touch();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.raise(CartEvent::Cleared);
        self.touch();
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Exact sum of price × quantity. Round only at presentation.
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(&self.currency), |acc, l| acc.add(&l.line_total()).unwrap_or(acc))
    }

    /// Plain (product id, quantity) pairs, enough for an external
    /// persistence collaborator to rebuild the cart against the catalog.
    pub fn snapshot(&self) -> Vec<(String, u32)> {
        self.lines.iter().map(|l| (l.product.id.clone(), l.quantity)).collect()
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::Nutrition;
    use rust_decimal::Decimal;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "Milk".to_string(),
            price: Money::usd(Decimal::new(cents, 2)),
            description: String::new(),
            image: String::new(),
            nutrition: Nutrition::default(),
            is_popular: false,
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new("USD");
        let a = product("a", 250);
        cart.add(&a, 2);
        cart.add(&a, 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_add_clamps_zero_quantity_to_one() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 100), 0);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 100), 1);
        cart.add(&product("b", 200), 1);
        cart.add(&product("a", 100), 1);
        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_subtotal_is_exact_sum() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 250), 2); // 5.00
        cart.add(&product("b", 199), 3); // 5.97
        assert_eq!(cart.subtotal().amount(), Decimal::new(1097, 2));
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_update_quantity_replaces_not_adds() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 100), 2);
        cart.update_quantity("a", 7);
        assert_eq!(cart.lines()[0].quantity, 7);
        // Idempotent: repeating yields the same state.
        cart.update_quantity("a", 7);
        assert_eq!(cart.lines()[0].quantity, 7);
        assert_eq!(cart.total_items(), 7);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 100), 2);
        cart.update_quantity("a", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_absent_id_is_noop() {
        let mut cart = Cart::new("USD");
        cart.update_quantity("nonexistent-id", 5);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 100), 1);
        cart.remove("a");
        let after_first = cart.snapshot();
        cart.remove("a");
        assert_eq!(cart.snapshot(), after_first);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_zeroes_totals() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 250), 4);
        cart.add(&product("b", 199), 1);
        cart.clear();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.subtotal().amount(), Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_exposes_plain_pairs() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 100), 2);
        cart.add(&product("b", 200), 1);
        assert_eq!(cart.snapshot(), vec![("a".to_string(), 2), ("b".to_string(), 1)]);
    }

    #[test]
    fn test_mutations_raise_events() {
        let mut cart = Cart::new("USD");
        cart.add(&product("a", 100), 2);
        cart.remove("a");
        cart.clear();
        assert_eq!(cart.take_events().len(), 3);
        assert!(cart.take_events().is_empty());
    }
}
