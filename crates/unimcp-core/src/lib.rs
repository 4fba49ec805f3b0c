//! Tool layer between an MCP front end and a UniFi Network controller.
//!
//! - **[`NetworkController`]**: the controller operations the tools need,
//!   implemented for [`unimcp_api::IntegrationClient`] and built by
//!   [`connect()`](controller::connect).
//! - **[`resolver`]**: maps loose site tokens (blank, `default`, display
//!   name, short name, UUID) to the canonical site id.
//! - **[`Dispatcher`]**: looks tools up in the static [`ToolRegistry`] and
//!   runs their handlers, producing a JSON envelope or a [`ToolError`].

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod resolver;
pub mod tools;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, PlatformHint, TlsVerification};
pub use controller::{NetworkController, connect};
pub use error::{CoreError, ToolError};
pub use model::Site;
pub use tools::{Arguments, Dispatcher, ToolDefinition, ToolName, ToolRegistry, ToolResult};
