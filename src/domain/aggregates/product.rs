//! Product record
//!
//! Products are supplied by the catalog source at startup and never mutated
//! afterwards, so this is plain data rather than an aggregate with behavior.

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Category label from a closed but unenforced set ("Milk", "Cheese", ...).
    pub category: String,
    pub price: Money,
    pub description: String,
    pub image: String,
    pub nutrition: Nutrition,
    #[serde(default)]
    pub is_popular: bool,
}

/// Per-serving nutrition facts. All fields non-negative.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}
