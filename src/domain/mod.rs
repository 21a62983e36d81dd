pub mod aggregates;
pub mod auth;
pub mod catalog;
pub mod events;
pub mod subscription;
pub mod value_objects;
