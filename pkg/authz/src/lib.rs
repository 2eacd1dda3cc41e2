pub mod client;

pub use client::{AuthzClient, Relation};
