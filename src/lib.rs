//! hw sandwich-shop provider
//!
//! A mock infrastructure provider that "provisions" a sandwich shop. Every
//! resource derives a deterministic id and price from its inputs, so the
//! whole lifecycle (validate, plan, create, read, update, delete, import)
//! can be exercised without a backend.
//!
//! # Overview
//!
//! - **Resources**: ingredients, sandwiches, drinks, sides, supplies, staff,
//!   equipment, furniture and the store that ties them together
//!   ([`resources`])
//! - **Data sources**: condiment and deli meat catalogs, the menu and an
//!   example order ([`data_sources`])
//! - **Pricing**: fixed rate tables plus the configured flat upcharge
//!   ([`pricing`])
//! - **Schema and validation**: typed schemas for every block and
//!   diagnostics for anything that does not fit ([`schema`], [`validation`])
//! - **Host loop**: JSON lines over stdio ([`server`])
//! - **Logging**: `tracing` with an env-filter, written to stderr
//!   ([`logging`])
//!
//! # Quick Start
//!
//! ```
//! use hw_provider::{HwProvider, ProviderService};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let provider = HwProvider::new();
//! provider.configure(json!({"upcharge": 2})).await.unwrap();
//!
//! let plan = provider
//!     .plan("hw_tables", None, json!({"style": "premium", "quantity": 25}), json!({}))
//!     .await
//!     .unwrap();
//! assert_eq!(plan.planned_state["cost"], "1252.00");
//! assert_eq!(plan.planned_state["id"], "tables-premium-7");
//! # });
//! ```
//!
//! # Handshake Protocol
//!
//! When the binary starts via [`serve`], it prints a handshake line:
//!
//! ```text
//! HW_PROVIDER|1|stdio
//! ```
//!
//! Format: `HW_PROVIDER|<protocol_version>|stdio`
//!
//! Every following stdin line is a [`Request`] and is answered with one
//! [`Response`] line on stdout. Logs go to stderr.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data_sources;
pub mod error;
pub mod id;
pub mod logging;
pub mod pricing;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use config::ProviderConfig;
pub use data_sources::DataSourceType;
pub use error::ProviderError;
pub use id::{compute_id, IdError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use pricing::{compute_price, RateTable};
pub use provider::HwProvider;
pub use resources::{ResourceHandler, ResourceType};
pub use schema::ProviderSchema;
pub use server::{
    handle_request, serve, serve_io, serve_with_options, ProviderService, Request, Response,
    ServeOptions,
};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
    HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use rust_decimal::Decimal;
pub use serde_json;
pub use tracing;
