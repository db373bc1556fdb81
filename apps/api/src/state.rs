use std::sync::Arc;

use crate::auth::token::TokenKeys;
use crate::profile::images::ImageStore;
use crate::repositories::{JobRepository, ProposalRepository, UserRepository};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub proposals: Arc<dyn ProposalRepository>,
    /// Object storage for profile images.
    pub images: Arc<dyn ImageStore>,
    pub tokens: TokenKeys,
    pub bcrypt_cost: u32,
}
