pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::profile::handlers as profile;
use crate::profile::images::MAX_IMAGE_BYTES;
use crate::proposals::handlers as proposals;
use crate::state::AppState;
use crate::users::handlers as users;

/// Room for multipart framing around a maximum-size image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/auth/login", post(auth::handle_login))
        // Accounts
        .route(
            "/api/users",
            post(users::handle_register).get(users::handle_list_users),
        )
        .route(
            "/api/users/:id",
            get(users::handle_get_user)
                .put(users::handle_update_user)
                .patch(users::handle_update_user)
                .delete(users::handle_delete_user),
        )
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/api/jobs/category/:category",
            get(jobs::handle_jobs_by_category),
        )
        .route("/api/my-jobs", get(jobs::handle_my_jobs))
        // Proposals
        .route("/api/proposals", post(proposals::handle_submit_proposal))
        .route(
            "/api/proposals/:id",
            get(proposals::handle_get_proposal)
                .put(proposals::handle_update_proposal)
                .delete(proposals::handle_withdraw_proposal),
        )
        .route(
            "/api/proposals/:id/accept",
            post(proposals::handle_accept_proposal),
        )
        .route(
            "/api/proposals/job/:job_id",
            get(proposals::handle_job_proposals),
        )
        .route("/api/my-proposals", get(proposals::handle_my_proposals))
        // Profiles
        .route("/api/profile/:id", put(profile::handle_update_profile))
        .route(
            "/api/profile/:id/experience",
            post(profile::handle_add_experience),
        )
        .route(
            "/api/profile/:id/experience/:item_id",
            delete(profile::handle_remove_experience),
        )
        .route(
            "/api/profile/:id/portfolio",
            post(profile::handle_add_portfolio_item),
        )
        .route(
            "/api/profile/:id/portfolio/:item_id",
            delete(profile::handle_remove_portfolio_item),
        )
        .route(
            "/api/profile/:id/recent-activity",
            post(profile::handle_add_recent_activity),
        )
        .route(
            "/api/profile/:id/recent-activity/:item_id",
            delete(profile::handle_remove_recent_activity),
        )
        .route(
            "/api/profile/:id/upload-image",
            post(profile::handle_upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/profile/:id/delete-image",
            delete(profile::handle_delete_image),
        )
        .with_state(state)
}
