//! Blocking client core for the Asana REST API.
//!
//! # Overview
//! Resource methods on [`AsanaClient`] build plain-data [`HttpRequest`]s,
//! hand them to a [`Transport`], and decode the JSON envelope of the
//! [`HttpResponse`]. The transport is the only thing that does I/O, so the
//! same calling code runs against a real network ([`UreqTransport`]) or a
//! scripted double ([`MockTransport`]).
//!
//! # Design
//! - Failures are one [`Error`]: [`Error::Api`] with a classified
//!   [`ApiError`], [`Error::Transport`] when no usable response arrived, or
//!   [`Error::InvalidInput`] when a call is refused before sending.
//!   Nothing retries internally.
//! - List endpoints return a [`Page`] with an optional [`NextPage`] cursor;
//!   [`Pager`] walks a collection to the end and is what the `all_*` methods
//!   use.
//! - [`MockTransport`] records every request and offers assertion helpers
//!   through [`RequestAssertion`].

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod options;
pub mod pagination;
mod resources;
pub mod transport;
pub mod types;

pub use client::AsanaClient;
pub use config::ClientConfig;
pub use error::{ApiError, Error, ErrorPayload, Result, RetryAfterPolicy, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mock::{mock_response, MockBody, MockTransport, RequestAssertion};
pub use options::Options;
pub use pagination::{NextPage, Page, PageRequest, Pager, DEFAULT_PAGE_SIZE};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AccessLevel, AddCustomFieldSetting, AddProjectLocalCustomField, CreateCustomField,
    CreateMembership, CustomField, CustomFieldBase, CustomFieldSetting, CustomFieldValue,
    DateValue, EnumOption, EnumValue, Favorite, FavoritesQuery, FieldFormat, FieldType,
    LabelPosition, Placement, Portfolio, Project, ProjectLocalCustomField, ProjectMember,
    ProjectMembership, User, Workspace,
};
