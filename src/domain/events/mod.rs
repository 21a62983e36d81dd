//! Domain events
//!
//! Raised by the cart and auth session so collaborators (logging, session
//! persistence) can observe state changes without the domain performing I/O.

use crate::domain::value_objects::PhoneNumber;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Cart(CartEvent),
    Auth(AuthEvent),
}

#[derive(Clone, Debug)]
pub enum CartEvent {
    ItemAdded { product_id: String, quantity: u32 },
    QuantityUpdated { product_id: String, quantity: u32 },
    ItemRemoved { product_id: String },
    Cleared,
}

#[derive(Clone, Debug)]
pub enum AuthEvent {
    CodeRequested { phone: PhoneNumber },
    Authenticated { user_id: String },
    LoggedOut,
}
