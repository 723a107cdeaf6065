pub mod app_state;
pub mod config;
pub mod filter;
pub mod policy;
pub mod proxy;
pub mod routes;

pub use crate::app_state::AppState;
pub use crate::config::GatewayConfig;
pub use crate::filter::router;
pub use crate::policy::{Decision, PolicyEngine, RejectReason};
pub use crate::routes::{Access, RouteRule, RouteTable};
