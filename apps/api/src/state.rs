use std::sync::Arc;

use regiongate_application::{AccessEvaluator, GrantStoreService, UserDirectory};

use crate::access_token::AccessTokenCodec;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub grant_store_service: GrantStoreService,
    pub access_evaluator: AccessEvaluator,
    pub user_directory: Arc<dyn UserDirectory>,
    pub access_tokens: AccessTokenCodec,
}
