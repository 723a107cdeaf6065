use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::GatewayConfig;
use crate::policy::PolicyEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<PolicyEngine>,
    pub http: reqwest::Client,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(policy: Arc<PolicyEngine>, config: Arc<GatewayConfig>) -> Self {
        Self {
            policy,
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl FromRef<AppState> for Arc<PolicyEngine> {
    fn from_ref(state: &AppState) -> Self {
        state.policy.clone()
    }
}

impl FromRef<AppState> for Arc<GatewayConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
