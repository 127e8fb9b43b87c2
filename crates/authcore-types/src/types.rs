//! Common scalar types shared across the authentication core.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::SystemTime;
use uuid::Uuid;

// Timestamp //
//***********//

/// Unix timestamp in seconds. Zero is used as the sentinel for "never
/// expires" on non-expiring key kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs() as i64)
	}

	pub fn from_now(delta_secs: i64) -> Timestamp {
		Timestamp(Timestamp::now().0 + delta_secs)
	}

	/// Zero means "never expires" per the Key invariants in the data model.
	pub fn is_never(&self) -> bool {
		self.0 == 0
	}

	pub fn has_passed(&self) -> bool {
		!self.is_never() && self.0 < Timestamp::now().0
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

// Id newtypes //
//*************//

macro_rules! uuid_id {
	($name:ident) => {
		#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
		pub struct $name(pub Uuid);

		impl $name {
			pub fn new() -> Self {
				Self(Uuid::new_v4())
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl std::str::FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(Uuid::parse_str(s)?))
			}
		}

		impl Serialize for $name {
			fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
			where
				S: Serializer,
			{
				serializer.serialize_str(&self.0.to_string())
			}
		}

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: Deserializer<'de>,
			{
				let s = String::deserialize(deserializer)?;
				Uuid::parse_str(&s).map($name).map_err(serde::de::Error::custom)
			}
		}
	};
}

uuid_id!(UserId);
uuid_id!(DomainId);
uuid_id!(KeyId);

/// A field in a PATCH request with three states, distinguishing "not
/// present" from "present and null".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
	#[default]
	Undefined,
	Null,
	Value(T),
}

impl<T> Patch<T> {
	pub fn is_undefined(&self) -> bool {
		matches!(self, Patch::Undefined)
	}

	pub fn value(&self) -> Option<&T> {
		match self {
			Patch::Value(v) => Some(v),
			_ => None,
		}
	}

	pub fn into_option(self) -> Option<Option<T>> {
		match self {
			Patch::Undefined => None,
			Patch::Null => Some(None),
			Patch::Value(v) => Some(Some(v)),
		}
	}
}

impl<T: Serialize> Serialize for Patch<T> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Patch::Undefined | Patch::Null => serializer.serialize_none(),
			Patch::Value(v) => v.serialize(serializer),
		}
	}
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Option::<T>::deserialize(deserializer)
			.map(|opt| opt.map_or(Patch::Null, Patch::Value))
	}
}

/// Standard paging envelope: offset/limit request, with the total count
/// returned alongside the page of results.
#[derive(Clone, Copy, Debug, Default)]
pub struct PageRequest {
	pub offset: u32,
	pub limit: u32,
}

impl PageRequest {
	pub const DEFAULT_LIMIT: u32 = 20;
	pub const MAX_LIMIT: u32 = 200;

	pub fn normalized(self) -> Self {
		PageRequest {
			offset: self.offset,
			limit: if self.limit == 0 { Self::DEFAULT_LIMIT } else { self.limit.min(Self::MAX_LIMIT) },
		}
	}
}

#[derive(Clone, Debug)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub offset: u32,
	pub limit: u32,
	pub total: u64,
}

// vim: ts=4
