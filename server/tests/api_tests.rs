//! End-to-end exercises of the HTTP facade against the SQLite stores and
//! in-memory policy agent, covering the token lifecycle, policy tuple
//! authorization, domain lifecycle, and membership scenarios.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::spawn;

#[tokio::test]
async fn issue_access_then_refresh_then_validate() {
	let app = spawn().await;
	let user = Uuid::new_v4();
	let domain = Uuid::new_v4();

	let issued = app
		.request("POST", "/api/token/issue", None, Some(json!({ "currentToken": Value::Null, "kind": "access", "subject": user, "domain": domain })))
		.await;
	assert_eq!(issued.status, StatusCode::OK);
	let access_token = issued.body["accessToken"].as_str().unwrap().to_string();
	let refresh_token = issued.body["refreshToken"].as_str().unwrap().to_string();

	let whoami = app.request("GET", "/api/auth/whoami", Some(&access_token), None).await;
	assert_eq!(whoami.status, StatusCode::OK);
	assert_eq!(whoami.body["userId"], user.to_string());
	assert_eq!(whoami.body["domainId"], domain.to_string());

	let refreshed = app.request("POST", "/api/token/refresh", None, Some(json!({ "refreshToken": refresh_token }))).await;
	assert_eq!(refreshed.status, StatusCode::OK);
	assert!(refreshed.body["accessToken"].as_str().unwrap() != access_token);
}

#[tokio::test]
async fn malformed_issue_kind_is_bad_request() {
	let app = spawn().await;
	let resp = app.request("POST", "/api/token/issue", None, Some(json!({ "currentToken": Value::Null, "kind": "bogus", "subject": Uuid::new_v4(), "domain": Value::Null }))).await;
	assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_bearer_token_is_unauthorized() {
	let app = spawn().await;
	let resp = app.request("GET", "/api/auth/whoami", None, None).await;
	assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

/// S2: grant administrator over a domain, authorize succeeds; after
/// deleting the filter, authorize fails again.
#[tokio::test]
async fn add_policy_then_authorize_then_delete_filter_revokes() {
	let app = spawn().await;
	let u1 = Uuid::new_v4();
	let d1 = Uuid::new_v4();
	let token = app.issue_access(u1, None).await;

	let add = app
		.request(
			"POST",
			"/api/auth/policies",
			Some(&token),
			Some(json!({
				"domain": d1, "subjectType": "user", "subject": u1.to_string(),
				"relation": "administrator", "objectType": "domain", "object": d1.to_string()
			})),
		)
		.await;
	assert_eq!(add.status, StatusCode::OK, "{:?}", add.body);

	let authorize = app
		.request(
			"POST",
			"/api/auth/authorize",
			None,
			Some(json!({
				"domain": d1, "subjectType": "user", "subject": u1.to_string(),
				"objectType": "domain", "object": d1.to_string(), "permission": "admin"
			})),
		)
		.await;
	assert_eq!(authorize.status, StatusCode::OK, "{:?}", authorize.body);

	let del = app
		.request(
			"DELETE",
			"/api/auth/policies",
			Some(&token),
			Some(json!({
				"domain": Value::Null, "subjectType": "user", "subject": u1.to_string(),
				"objectType": "domain", "object": d1.to_string()
			})),
		)
		.await;
	assert_eq!(del.status, StatusCode::OK, "{:?}", del.body);

	let authorize_again = app
		.request(
			"POST",
			"/api/auth/authorize",
			None,
			Some(json!({
				"domain": d1, "subjectType": "user", "subject": u1.to_string(),
				"objectType": "domain", "object": d1.to_string(), "permission": "admin"
			})),
		)
		.await;
	assert_eq!(authorize_again.status, StatusCode::FORBIDDEN);
}

/// S3: creating a domain twice with the same alias conflicts; the
/// creator shows up in their own domain listing with admin permission.
#[tokio::test]
async fn create_domain_then_duplicate_alias_conflicts_then_lists_for_creator() {
	let app = spawn().await;
	let u1 = Uuid::new_v4();
	let token = app.issue_access(u1, None).await;

	let created = app.request("POST", "/api/domains", Some(&token), Some(json!({ "alias": "acme", "name": "Acme Corp" }))).await;
	assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);
	assert_eq!(created.body["alias"], "acme");
	assert_eq!(created.body["status"], "enabled");

	let dup = app.request("POST", "/api/domains", Some(&token), Some(json!({ "alias": "acme", "name": "Acme Again" }))).await;
	assert_eq!(dup.status, StatusCode::CONFLICT);

	let listed = app.request("GET", "/api/domains", Some(&token), None).await;
	assert_eq!(listed.status, StatusCode::OK, "{:?}", listed.body);
	let items = listed.body["items"].as_array().unwrap();
	assert!(items.iter().any(|d| d["alias"] == "acme"));
}

/// S4: assigning editor to two users grants them `edit` in their own
/// domain listing; unassigning one drops the domain from their listing.
#[tokio::test]
async fn assign_users_then_unassign_updates_membership() {
	let app = spawn().await;
	let u1 = Uuid::new_v4();
	let u2 = Uuid::new_v4();
	let u3 = Uuid::new_v4();
	let owner_token = app.issue_access(u1, None).await;

	let created = app.request("POST", "/api/domains", Some(&owner_token), Some(json!({ "alias": "tenant-1", "name": "Tenant One" }))).await;
	assert_eq!(created.status, StatusCode::OK);
	let domain_id = created.body["id"].as_str().unwrap().to_string();

	let assign = app
		.request("POST", &format!("/api/domains/{domain_id}/users"), Some(&owner_token), Some(json!({ "userIds": [u2, u3], "relation": "editor" })))
		.await;
	assert_eq!(assign.status, StatusCode::OK, "{:?}", assign.body);

	let u2_token = app.issue_access(u2, None).await;
	let u2_domains = app.request("GET", &format!("/api/users/{u2}/domains"), Some(&u2_token), None).await;
	assert_eq!(u2_domains.status, StatusCode::OK, "{:?}", u2_domains.body);
	let items = u2_domains.body["items"].as_array().unwrap();
	assert!(items.iter().any(|d| d["id"] == domain_id));

	let unassign = app.request("DELETE", &format!("/api/domains/{domain_id}/users"), Some(&owner_token), Some(json!({ "userIds": [u2] }))).await;
	assert_eq!(unassign.status, StatusCode::OK, "{:?}", unassign.body);

	let u2_domains_after = app.request("GET", &format!("/api/users/{u2}/domains"), Some(&u2_token), None).await;
	let items_after = u2_domains_after.body["items"].as_array().unwrap();
	assert!(!items_after.iter().any(|d| d["id"] == domain_id));
}

/// S5: issue an API key, identify it successfully, revoke it, then
/// identify fails even though the signature still validates.
#[tokio::test]
async fn revoked_api_key_fails_identify() {
	let app = spawn().await;
	let u1 = Uuid::new_v4();
	let access_token = app.issue_access(u1, None).await;

	let api = app.request("POST", "/api/token/issue", None, Some(json!({ "currentToken": access_token, "kind": "api", "subject": Value::Null, "domain": Value::Null }))).await;
	assert_eq!(api.status, StatusCode::OK, "{:?}", api.body);
	let api_token = api.body["accessToken"].as_str().unwrap().to_string();

	let whoami = app.request("GET", "/api/auth/whoami", Some(&api_token), None).await;
	assert_eq!(whoami.status, StatusCode::OK);

	let key = app.request("GET", &format!("/api/auth/keys/{}", key_id_of(&app, &api_token).await), Some(&api_token), None).await;
	assert_eq!(key.status, StatusCode::OK, "{:?}", key.body);
	let key_id = key.body["id"].as_str().unwrap().to_string();

	let revoke = app.request("POST", &format!("/api/auth/keys/{key_id}/revoke"), Some(&api_token), None).await;
	assert_eq!(revoke.status, StatusCode::OK, "{:?}", revoke.body);

	let whoami_after = app.request("GET", "/api/auth/whoami", Some(&api_token), None).await;
	assert_eq!(whoami_after.status, StatusCode::UNAUTHORIZED);
}

/// Decodes the unsigned claims of a JWT to pull out the key id for the
/// revoke test above, the same way a client that already has the token
/// would read it off the wire without another round-trip.
async fn key_id_of(app: &common::TestApp, token: &str) -> String {
	let _ = app;
	let mut parts = token.split('.');
	let _header = parts.next().unwrap();
	let payload = parts.next().unwrap();
	let payload = base64::Engine::decode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, payload).unwrap();
	let claims: Value = serde_json::from_slice(&payload).unwrap();
	claims["kid"].as_str().unwrap().to_string()
}

/// S6: deleting every policy tuple for a user drops their authorization
/// even after they were previously granted administrator.
#[tokio::test]
async fn delete_entity_policies_revokes_every_grant() {
	let app = spawn().await;
	let u1 = Uuid::new_v4();
	let d1 = Uuid::new_v4();
	let token = app.issue_access(u1, None).await;

	app.request(
		"POST",
		"/api/auth/policies",
		Some(&token),
		Some(json!({ "domain": d1, "subjectType": "user", "subject": u1.to_string(), "relation": "administrator", "objectType": "domain", "object": d1.to_string() })),
	)
	.await;

	let del = app.request("DELETE", "/api/auth/policies/entity", Some(&token), Some(json!({ "entityType": "user", "entityId": u1.to_string() }))).await;
	assert_eq!(del.status, StatusCode::OK, "{:?}", del.body);

	let authorize = app
		.request(
			"POST",
			"/api/auth/authorize",
			None,
			Some(json!({ "domain": d1, "subjectType": "user", "subject": u1.to_string(), "objectType": "domain", "object": d1.to_string(), "permission": "admin" })),
		)
		.await;
	assert_eq!(authorize.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn illegal_status_transition_is_malformed() {
	let app = spawn().await;
	let u1 = Uuid::new_v4();
	let token = app.issue_access(u1, None).await;

	let created = app.request("POST", "/api/domains", Some(&token), Some(json!({ "alias": "frozen-co", "name": "Frozen Co" }))).await;
	let domain_id = created.body["id"].as_str().unwrap().to_string();

	let delete = app.request("POST", &format!("/api/domains/{domain_id}/status"), Some(&token), Some(json!({ "status": "deleted" }))).await;
	assert_eq!(delete.status, StatusCode::OK, "{:?}", delete.body);

	let reenable = app.request("POST", &format!("/api/domains/{domain_id}/status"), Some(&token), Some(json!({ "status": "enabled" }))).await;
	assert_eq!(reenable.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn internal_hook_requires_service_token_not_user_bearer() {
	let app = spawn().await;
	let u1 = Uuid::new_v4();
	let token = app.issue_access(u1, None).await;

	let with_user_token = app.request("DELETE", &format!("/api/internal/users/{u1}/domains"), Some(&token), None).await;
	assert_eq!(with_user_token.status, StatusCode::UNAUTHORIZED);

	let with_service_token = app.request("DELETE", &format!("/api/internal/users/{u1}/domains"), Some("internal-test-token"), None).await;
	assert_eq!(with_service_token.status, StatusCode::OK, "{:?}", with_service_token.body);
}

// vim: ts=4
