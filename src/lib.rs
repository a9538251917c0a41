//! Taskrelay: task tracking and push-event relay for chat communities.
//!
//! Members create, assign and update tasks through chat commands, while a
//! companion relay forwards repository push events to subscribed chat
//! channels on one or more messaging providers.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture:
//!
//! - **Domain**: Validated values and aggregates with no infrastructure
//!   dependencies
//! - **Ports**: Async trait interfaces for persistence and delivery
//! - **Adapters**: In-memory, `PostgreSQL` and HTTP implementations of ports
//! - **Services**: Orchestration that callers use
//!
//! # Modules
//!
//! - [`identity`]: External chat user to internal user resolution
//! - [`task`]: Task lifecycle, assignments and role-scoped queries
//! - [`notification`]: Multi-provider message fan-out
//! - [`webhook`]: Push-event parsing, formatting and subscriptions
//! - [`command`]: Typed chat commands and text replies
//! - [`server`]: HTTP routes for webhooks and commands
//! - [`config`]: Environment-driven configuration
//! - [`postgres`]: Shared connection pool and schema bootstrap

pub mod command;
pub mod config;
pub mod error;
pub mod identity;
pub mod notification;
pub mod postgres;
pub mod server;
pub mod task;
pub mod webhook;
