//! Dairydrop Storefront Core
//!
//! Domain logic for a dairy-delivery storefront:
//! - Product catalog with filtering and sorting
//! - Per-session shopping carts with derived totals
//! - Phone-OTP sign-in behind a pluggable gateway
//! - Subscription plan listing
//!
//! The catalog is supplied in-memory at startup; carts and auth sessions are
//! owned per session. Rendering, real OTP delivery, and persistence are
//! collaborators outside this crate — cart state is exposed as plain
//! (product id, quantity) pairs and mutations raise [`domain::events`] for
//! observers.

use thiserror::Error;

pub mod domain;

pub use domain::aggregates::cart::{Cart, CartLine};
pub use domain::aggregates::product::{Nutrition, Product};
pub use domain::auth::{AuthSession, MockOtpGateway, OtpGateway, User, VerifyOutcome};
pub use domain::catalog::{Catalog, CategoryFilter, FilterSpec, SortKey};
pub use domain::subscription::{Frequency, SubscriptionPlan};
pub use domain::value_objects::{Money, PhoneNumber};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("No pending verification code for this session")]
    NoPendingCode,

    #[error("Too many failed verification attempts")]
    AttemptsExhausted,

    #[error("OTP gateway failure: {0}")]
    Gateway(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
