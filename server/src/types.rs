//! Wire-facing request/response shapes. Nothing in `authcore_types` needs to
//! know about JSON; this module is where the HTTP vocabulary lives.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authcore_types::prelude::*;

// Error envelope //
//****************//

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
	pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
	pub code: String,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
	pub fn new(code: String, message: String) -> Self {
		ErrorResponse { error: ErrorDetails { code, message, details: None } }
	}
}

// Token service //
//***************//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
	pub current_token: Option<String>,
	pub kind: String,
	pub subject: Option<Uuid>,
	pub domain: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
	pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokensResponse {
	pub access_token: String,
	pub refresh_token: Option<String>,
	pub access_type: String,
}

impl From<IssuedTokens> for IssuedTokensResponse {
	fn from(t: IssuedTokens) -> Self {
		IssuedTokensResponse { access_token: t.access_token, refresh_token: t.refresh_token, access_type: t.access_type }
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
	pub id: Uuid,
	pub kind: String,
	pub issuer: Uuid,
	pub subject: Option<Uuid>,
	pub domain: Option<Uuid>,
	pub issued_at: i64,
	pub expires_at: i64,
}

impl From<Key> for KeyResponse {
	fn from(k: Key) -> Self {
		KeyResponse {
			id: k.id.0,
			kind: k.kind.as_str().to_string(),
			issuer: k.issuer.0,
			subject: k.subject.map(|s| s.0),
			domain: k.domain.map(|d| d.0),
			issued_at: k.issued_at.0,
			expires_at: k.expires_at.0,
		}
	}
}

// Auth service //
//**************//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
	pub user_id: Uuid,
	pub domain_id: Option<Uuid>,
	pub super_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyTupleRequest {
	pub domain: Option<Uuid>,
	pub subject_type: String,
	#[serde(default)]
	pub subject_kind: Option<String>,
	pub subject: String,
	#[serde(default)]
	pub relation: Option<String>,
	pub object_type: String,
	pub object: String,
	#[serde(default)]
	pub permission: Option<String>,
}

impl TryFrom<PolicyTupleRequest> for PolicyTuple {
	type Error = Error;

	fn try_from(r: PolicyTupleRequest) -> Result<Self, Self::Error> {
		Ok(PolicyTuple {
			domain: r.domain.map(DomainId),
			subject_type: r.subject_type.parse()?,
			subject_kind: match r.subject_kind.as_deref() {
				Some("domainUsersKind") => SubjectKind::DomainUsersKind,
				Some("entityKind") => SubjectKind::EntityKind,
				_ => SubjectKind::UsersKind,
			},
			subject: r.subject,
			relation: Relation::from(r.relation.as_deref().unwrap_or("")),
			object_type: r.object_type.parse()?,
			object: r.object,
			permission: r.permission.as_deref().map(Permission::from),
		})
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPoliciesRequest {
	pub tuples: Vec<PolicyTupleRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePoliciesRequest {
	pub filters: Vec<PolicyTupleRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntityPoliciesRequest {
	pub entity_type: String,
	pub entity_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerateQuery {
	pub domain: Option<Uuid>,
	pub subject: Option<String>,
	pub object: Option<String>,
	pub permission: String,
	pub entity_type: String,
	#[serde(default)]
	pub offset: u32,
	#[serde(default)]
	pub limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountQuery {
	pub domain: Option<Uuid>,
	pub subject: Option<String>,
	pub object: Option<String>,
	pub permission: String,
	pub entity_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsQuery {
	pub domain: Option<Uuid>,
	pub subject: String,
	pub object_type: String,
	pub object: String,
	/// Comma-separated permission names to test for.
	pub filter: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPageResponse {
	pub ids: Vec<String>,
	pub next_page_token: Option<String>,
}

impl From<ObjectPage> for ObjectPageResponse {
	fn from(p: ObjectPage) -> Self {
		ObjectPageResponse { ids: p.ids, next_page_token: p.next_page_token }
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
	pub permissions: Vec<String>,
}

// Domains service //
//*****************//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDomainRequest {
	pub alias: String,
	pub name: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DomainUpdateRequest {
	#[serde(default)]
	pub name: Patch<String>,
	#[serde(default)]
	pub tags: Patch<Vec<String>>,
	#[serde(default)]
	pub metadata: Patch<HashMap<String, serde_json::Value>>,
}

impl From<DomainUpdateRequest> for DomainUpdate {
	fn from(r: DomainUpdateRequest) -> Self {
		DomainUpdate { name: r.name, tags: r.tags, metadata: r.metadata }
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDomainStatusRequest {
	pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDomainsQuery {
	pub status: Option<String>,
	pub tag: Option<String>,
	pub permission: Option<String>,
	pub subject: Option<Uuid>,
	#[serde(default)]
	pub offset: u32,
	#[serde(default)]
	pub limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
	#[serde(default)]
	pub offset: u32,
	#[serde(default)]
	pub limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFilterQuery {
	/// Comma-separated permission names.
	#[serde(default)]
	pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignUsersRequest {
	pub user_ids: Vec<Uuid>,
	pub relation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignUsersRequest {
	pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPageResponse {
	pub items: Vec<Domain>,
	pub offset: u32,
	pub limit: u32,
	pub total: u64,
}

impl From<Page<Domain>> for DomainPageResponse {
	fn from(p: Page<Domain>) -> Self {
		DomainPageResponse { items: p.items, offset: p.offset, limit: p.limit, total: p.total }
	}
}

// vim: ts=4
