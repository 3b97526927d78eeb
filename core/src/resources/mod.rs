//! Resource endpoints, one module per API resource.
//!
//! Each module adds methods to [`AsanaClient`](crate::AsanaClient). List
//! endpoints come in pairs: a single-page method returning a
//! [`Page`](crate::Page), and an `all_*` variant that walks every page.

mod custom_fields;
mod memberships;
mod portfolios;
mod users;
