//! The relation-to-permission derivation table. In production this schema
//! is delivered out-of-band to the real policy agent; this in-memory
//! reference ships it as code since it has no other source to load it
//! from.

use authcore_types::EntityType;

/// Relations are totally ordered by privilege for every object type:
/// holding a higher one implies every permission a lower one would grant.
/// Matches the closed vocabulary `administrator`/`editor`/`viewer`/`member`
/// used by the domain service.
fn relation_rank(relation: &str) -> u8 {
	match relation {
		"administrator" | "owner" => 3,
		"editor" => 2,
		"viewer" => 1,
		"member" => 0,
		_ => 0,
	}
}

/// Permissions granted at-or-below a relation's rank, for a given object
/// type.
pub fn derive_permissions(object_type: EntityType, relation: &str) -> Vec<&'static str> {
	let rank = relation_rank(relation);
	let mut perms = Vec::new();

	match object_type {
		EntityType::Platform => {
			perms.push("membership");
			if rank >= 3 {
				perms.push("admin");
			}
		}
		EntityType::Domain | EntityType::Group => {
			perms.push("membership");
			if rank >= 1 {
				perms.push("view");
			}
			if rank >= 2 {
				perms.push("edit");
			}
			if rank >= 3 {
				perms.extend(["admin", "delete", "share"]);
			}
		}
		EntityType::Thing => {
			if rank >= 1 {
				perms.push("view");
			}
			if rank >= 2 {
				perms.extend(["edit", "publish", "subscribe"]);
			}
			if rank >= 3 {
				perms.extend(["admin", "delete", "share"]);
			}
		}
		EntityType::User => {}
	}

	perms
}

pub fn grants(object_type: EntityType, relation: &str, permission: &str) -> bool {
	derive_permissions(object_type, relation).contains(&permission)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn administrator_implies_every_lower_permission_on_a_domain() {
		let perms = derive_permissions(EntityType::Domain, "administrator");
		for p in ["membership", "view", "edit", "admin", "delete", "share"] {
			assert!(perms.contains(&p), "missing {p}");
		}
	}

	#[test]
	fn member_only_grants_membership_on_a_domain() {
		let perms = derive_permissions(EntityType::Domain, "member");
		assert_eq!(perms, vec!["membership"]);
	}

	#[test]
	fn viewer_does_not_grant_edit_on_a_thing() {
		assert!(!grants(EntityType::Thing, "viewer", "edit"));
		assert!(grants(EntityType::Thing, "viewer", "view"));
	}
}

// vim: ts=4
