//! Subscription plans
//!
//! Static plan catalog for the delivery-subscription picker. Selection and
//! billing are the surrounding application's concern.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub duration: Frequency,
}

/// The retailer's standard plan lineup, in display order.
pub fn default_plans() -> Vec<SubscriptionPlan> {
    let plan = |id: &str, name: &str, description: &str, cents: i64, duration| SubscriptionPlan {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price: Money::usd(Decimal::new(cents, 2)),
        duration,
    };
    vec![
        plan("daily", "Daily Fresh", "A bottle of fresh milk at your door every morning.", 399, Frequency::Daily),
        plan("weekly", "Weekly Essentials", "A weekly basket of milk, curd, and butter.", 2499, Frequency::Weekly),
        plan("monthly", "Monthly Pantry", "A full month of dairy staples, delivered in weekly batches.", 8999, Frequency::Monthly),
    ]
}

pub fn find_plan<'a>(plans: &'a [SubscriptionPlan], id: &str) -> Option<&'a SubscriptionPlan> {
    plans.iter().find(|p| p.id == id)
}
