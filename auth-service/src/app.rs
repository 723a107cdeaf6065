use std::sync::Arc;

use axum::extract::FromRef;
use common_auth::TokenCodec;

use crate::issuer::TokenIssuer;
use crate::store::CredentialStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn CredentialStore>) -> Self {
        let issuer = Arc::new(TokenIssuer::new(store, codec.clone()));
        Self { codec, issuer }
    }
}

impl FromRef<AppState> for Arc<TokenCodec> {
    fn from_ref(state: &AppState) -> Self {
        state.codec.clone()
    }
}
