//! Alert delivery for verified earthquake clusters.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable delivery channels
//! - Webhook and Telegram notifier implementations
//! - Minijinja template rendering for alert messages
//! - Dispatcher with per-channel failure isolation and in-process de-dup

pub mod dispatcher;
pub mod telegram;
pub mod templating;
pub mod traits;
pub mod webhook;

pub use dispatcher::Dispatcher;
pub use templating::{AlertContext, ClusterContext, TemplateRenderer};
pub use traits::{DispatchResult, Notification, Notifier, NotifyError};
