//! Router assembly. Middleware is layered outermost-first: tracing, the
//! deadline, then auth — matching the order spec.md §4.7 lays out for the
//! facade (tracing, metrics, logging, event-publishing, authorization).

use axum::middleware as axum_middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, domains, token};
use crate::middleware::{enforce_deadline, require_auth, require_internal_service_token};
use crate::App;

pub fn init(app: App) -> Router {
	let public = Router::new().route("/api/token/issue", post(token::issue)).route("/api/token/refresh", post(token::refresh));

	let authed = Router::new()
		.route("/api/auth/whoami", get(auth::authenticate))
		.route("/api/auth/authorize", post(auth::authorize))
		.route("/api/auth/policies", post(auth::add_policy))
		.route("/api/auth/policies", delete(auth::delete_policy_filter))
		.route("/api/auth/policies/batch", post(auth::add_policies))
		.route("/api/auth/policies/batch", delete(auth::delete_policies))
		.route("/api/auth/policies/entity", delete(auth::delete_entity_policies))
		.route("/api/auth/objects", get(auth::list_objects))
		.route("/api/auth/objects/all", get(auth::list_all_objects))
		.route("/api/auth/objects/count", get(auth::count_objects))
		.route("/api/auth/subjects", get(auth::list_subjects))
		.route("/api/auth/subjects/all", get(auth::list_all_subjects))
		.route("/api/auth/subjects/count", get(auth::count_subjects))
		.route("/api/auth/permissions", get(auth::list_permissions))
		.route("/api/auth/keys/{id}", get(auth::retrieve_key))
		.route("/api/auth/keys/{id}/revoke", post(auth::revoke_key))
		.route("/api/domains", post(domains::create_domain))
		.route("/api/domains", get(domains::list_domains))
		.route("/api/domains/{id}", get(domains::retrieve_domain))
		.route("/api/domains/{id}", patch(domains::update_domain))
		.route("/api/domains/{id}/permissions", get(domains::retrieve_domain_permissions))
		.route("/api/domains/{id}/status", post(domains::change_domain_status))
		.route("/api/domains/{id}/users", post(domains::assign_users))
		.route("/api/domains/{id}/users", delete(domains::unassign_users))
		.route("/api/users/{user_id}/domains", get(domains::list_user_domains))
		.layer(axum_middleware::from_fn_with_state(app.clone(), require_auth));

	let internal = Router::new()
		.route("/api/internal/users/{user_id}/domains", delete(domains::delete_user_from_domains))
		.layer(axum_middleware::from_fn_with_state(app.clone(), require_internal_service_token));

	Router::new()
		.merge(public)
		.merge(authed)
		.merge(internal)
		.layer(axum_middleware::from_fn_with_state(app.clone(), enforce_deadline))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
