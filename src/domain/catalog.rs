//! Catalog and filtering
//!
//! The catalog is an ordered, immutable product list supplied at startup.
//! [`Catalog::filter`] is a pure function from (catalog, [`FilterSpec`]) to
//! the visible subset — deterministic, side-effect-free, and stable on ties.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::product::{Nutrition, Product};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
}

/// User-chosen filter criteria. Price bounds are inclusive; the default max
/// bound is a configuration input (typically [`Catalog::max_price`]), not a
/// hardcoded constant.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    pub search: String,
    pub category: CategoryFilter,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub sort: SortKey,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: CategoryFilter::All,
            min_price: Decimal::ZERO,
            max_price: Decimal::MAX,
            sort: SortKey::None,
        }
    }
}

/// Category selection. `Only` with a label no product carries matches
/// nothing — it never falls back to showing everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    None,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// Parses the storefront's query-string values ("price-asc", ...).
    /// Unknown or empty values normalize to `None` rather than erroring.
    pub fn parse(value: &str) -> Self {
        match value {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "name-asc" => Self::NameAsc,
            "name-desc" => Self::NameDesc,
            _ => Self::None,
        }
    }
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products } }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Distinct category labels in first-seen catalog order.
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = vec![];
        for p in &self.products {
            if !out.iter().any(|c| c == &p.category) {
                out.push(p.category.clone());
            }
        }
        out
    }

    /// Highest price in the catalog; zero when empty. Used as the default
    /// upper price bound for filtering.
    pub fn max_price(&self) -> Decimal {
        self.products.iter().map(|p| p.price.amount()).max().unwrap_or(Decimal::ZERO)
    }

    /// Applies text, category, and price filters in catalog order, then
    /// sorts last. `min > max` yields an empty result, not an error.
    pub fn filter(&self, spec: &FilterSpec) -> Vec<&Product> {
        let needle = spec.search.trim().to_lowercase();
        let mut visible: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .filter(|p| match &spec.category {
                CategoryFilter::All => true,
                CategoryFilter::Only(c) => &p.category == c,
            })
            .filter(|p| {
                let price = p.price.amount();
                price >= spec.min_price && price <= spec.max_price
            })
            .collect();

        // Vec::sort_by is stable, so ties keep their catalog order.
        match spec.sort {
            SortKey::None => {}
            SortKey::PriceAsc => visible.sort_by(|a, b| a.price.amount().cmp(&b.price.amount())),
            SortKey::PriceDesc => visible.sort_by(|a, b| b.price.amount().cmp(&a.price.amount())),
            SortKey::NameAsc => visible.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            SortKey::NameDesc => visible.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase())),
        }
        visible
    }

    /// In-memory demo catalog standing in for a real catalog service.
    pub fn demo() -> Self {
        let p = |id: &str, name: &str, category: &str, cents: i64, description: &str, n: [f64; 4], popular: bool| Product {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price: Money::usd(Decimal::new(cents, 2)),
            description: description.to_string(),
            image: format!("/images/{id}.jpg"),
            nutrition: Nutrition { calories: n[0], protein: n[1], fat: n[2], carbs: n[3] },
            is_popular: popular,
        };
        Self::new(vec![
            p("milk-whole", "Whole Milk", "Milk", 250, "Farm-fresh whole milk, delivered within 24 hours of milking.", [150.0, 8.0, 8.0, 12.0], true),
            p("milk-skim", "Skim Milk", "Milk", 230, "All the calcium, none of the fat.", [90.0, 8.0, 0.2, 12.0], false),
            p("milk-a2", "A2 Desi Cow Milk", "Milk", 380, "From indigenous grass-fed cows, rich and easy to digest.", [160.0, 8.0, 9.0, 11.0], true),
            p("curd-set", "Set Curd", "Curd", 180, "Thick, creamy curd set in earthen pots.", [98.0, 11.0, 4.3, 3.4], true),
            p("butter-salted", "Salted Butter", "Butter", 450, "Slow-churned salted butter from cultured cream.", [717.0, 0.9, 81.0, 0.1], false),
            p("ghee-pure", "Pure Desi Ghee", "Ghee", 899, "Traditional bilona ghee with a rich, nutty aroma.", [900.0, 0.0, 100.0, 0.0], true),
            p("paneer-fresh", "Fresh Paneer", "Cheese", 320, "Soft, fresh paneer made daily.", [265.0, 18.3, 20.8, 1.2], false),
            p("cheese-cheddar", "Cheddar Cheese", "Cheese", 550, "Aged cheddar with a sharp, tangy bite.", [403.0, 24.9, 33.1, 1.3], false),
            p("yogurt-greek", "Greek Yogurt", "Curd", 275, "Strained yogurt, extra thick and protein-rich.", [59.0, 10.0, 0.4, 3.6], false),
            p("cream-fresh", "Fresh Cream", "Cream", 340, "Pouring cream skimmed from the morning's milk.", [340.0, 2.1, 36.0, 2.8], false),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, category: &str, cents: i64, description: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price: Money::usd(Decimal::new(cents, 2)),
            description: description.to_string(),
            image: String::new(),
            nutrition: Nutrition::default(),
            is_popular: false,
        }
    }

    fn two_product_catalog() -> Catalog {
        Catalog::new(vec![
            product("a", "Whole Milk", "milk", 250, "Fresh whole milk"),
            product("b", "Cheddar", "cheese", 100, "Aged cheddar"),
        ])
    }

    fn ids(result: &[&Product]) -> Vec<String> {
        result.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_default_spec_keeps_catalog_order() {
        let cat = two_product_catalog();
        assert_eq!(ids(&cat.filter(&FilterSpec::default())), vec!["a", "b"]);
    }

    #[test]
    fn test_price_ascending_example() {
        let cat = two_product_catalog();
        let spec = FilterSpec {
            min_price: Decimal::ZERO,
            max_price: Decimal::new(10, 0),
            sort: SortKey::PriceAsc,
            ..FilterSpec::default()
        };
        assert_eq!(ids(&cat.filter(&spec)), vec!["b", "a"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let cat = two_product_catalog();
        let spec = FilterSpec { search: "  CHEDD  ".to_string(), ..FilterSpec::default() };
        assert_eq!(ids(&cat.filter(&spec)), vec!["b"]);
    }

    #[test]
    fn test_search_matches_description_too() {
        let cat = two_product_catalog();
        let spec = FilterSpec { search: "fresh whole".to_string(), ..FilterSpec::default() };
        assert_eq!(ids(&cat.filter(&spec)), vec!["a"]);
    }

    #[test]
    fn test_unknown_category_matches_nothing() {
        let cat = two_product_catalog();
        let spec = FilterSpec {
            category: CategoryFilter::Only("yoghurt".to_string()),
            ..FilterSpec::default()
        };
        assert!(cat.filter(&spec).is_empty());
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let cat = two_product_catalog();
        let spec = FilterSpec {
            min_price: Decimal::new(100, 2),
            max_price: Decimal::new(250, 2),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&cat.filter(&spec)), vec!["a", "b"]);
    }

    #[test]
    fn test_inverted_bounds_yield_empty() {
        let cat = two_product_catalog();
        let spec = FilterSpec {
            min_price: Decimal::new(5, 0),
            max_price: Decimal::new(1, 0),
            ..FilterSpec::default()
        };
        assert!(cat.filter(&spec).is_empty());
    }

    #[test]
    fn test_empty_catalog_yields_empty() {
        let cat = Catalog::new(vec![]);
        assert!(cat.filter(&FilterSpec::default()).is_empty());
        assert_eq!(cat.max_price(), Decimal::ZERO);
    }

    #[test]
    fn test_price_sort_is_stable_on_ties() {
        let cat = Catalog::new(vec![
            product("first", "Alpha", "milk", 200, ""),
            product("second", "Beta", "milk", 200, ""),
            product("third", "Gamma", "milk", 100, ""),
        ]);
        let spec = FilterSpec { sort: SortKey::PriceAsc, ..FilterSpec::default() };
        assert_eq!(ids(&cat.filter(&spec)), vec!["third", "first", "second"]);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let cat = Catalog::new(vec![
            product("b", "banana milk", "milk", 100, ""),
            product("a", "Almond Butter", "butter", 100, ""),
        ]);
        let asc = FilterSpec { sort: SortKey::NameAsc, ..FilterSpec::default() };
        assert_eq!(ids(&cat.filter(&asc)), vec!["a", "b"]);
        let desc = FilterSpec { sort: SortKey::NameDesc, ..FilterSpec::default() };
        assert_eq!(ids(&cat.filter(&desc)), vec!["b", "a"]);
    }

    #[test]
    fn test_filter_is_pure() {
        let cat = two_product_catalog();
        let spec = FilterSpec {
            search: "milk".to_string(),
            sort: SortKey::NameDesc,
            ..FilterSpec::default()
        };
        let first = ids(&cat.filter(&spec));
        let second = ids(&cat.filter(&spec));
        assert_eq!(first, second);
        // Catalog order untouched.
        assert_eq!(cat.products()[0].id, "a");
    }

    #[test]
    fn test_sort_key_parse_normalizes_unknown() {
        assert_eq!(SortKey::parse("price-desc"), SortKey::PriceDesc);
        assert_eq!(SortKey::parse(""), SortKey::None);
        assert_eq!(SortKey::parse("rating"), SortKey::None);
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let cat = Catalog::demo();
        let cats = cat.categories();
        assert_eq!(cats[0], "Milk");
        assert!(cats.iter().filter(|c| *c == "Cheese").count() == 1);
    }
}
