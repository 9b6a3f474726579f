//! User types.

use crate::{Entity, EntityId, StorageKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attached to a user account.
///
/// The core only records the role; enforcement is left to the HTTP layer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	#[default]
	Customer,
	Staff,
	Admin,
}

impl Role {
	/// Whether this role may operate the kitchen and analytics views.
	pub fn is_staff(&self) -> bool {
		matches!(self, Role::Staff | Role::Admin)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Customer => write!(f, "customer"),
			Role::Staff => write!(f, "staff"),
			Role::Admin => write!(f, "admin"),
		}
	}
}

/// A registered customer or staff member.
///
/// The phone number is the natural key: registering the same phone twice
/// yields the first record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: EntityId,
	pub name: String,
	pub phone: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default)]
	pub role: Role,
	/// Argon2 PHC string; never exposed over the API.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub password_hash: Option<String>,
}

impl Entity for User {
	const KEY: StorageKey = StorageKey::Users;

	fn id(&self) -> EntityId {
		self.id
	}
}
