//! User registration and staff seeding.

use crate::validation::UserValidator;
use crate::CafeError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use cafe_config::StaffConfig;
use cafe_storage::StorageService;
use cafe_types::{CreateUserRequest, EntityId, Role, User};
use std::sync::Arc;

/// Handler for user records.
pub struct UserHandler {
	storage: Arc<StorageService>,
}

impl UserHandler {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Registers a customer, or returns the existing user with that phone.
	///
	/// The flag is `true` only when a new user was stored.
	pub async fn create(&self, request: CreateUserRequest) -> Result<(User, bool), CafeError> {
		UserValidator::validate(&request)?;

		let phone = request.phone.trim().to_string();
		if let Some(existing) = self.find_by_phone(&phone).await? {
			tracing::debug!(user_id = existing.id, "Phone already registered");
			return Ok((existing, false));
		}

		let password_hash = request
			.password
			.as_deref()
			.map(hash_password)
			.transpose()?;
		let user = self
			.storage
			.insert(|id| User {
				id,
				name: request.name.trim().to_string(),
				phone,
				email: request.email.map(|e| e.trim().to_string()),
				role: Role::Customer,
				password_hash,
			})
			.await?;

		tracing::info!(user_id = user.id, "User registered");
		Ok((user, true))
	}

	pub async fn get(&self, id: EntityId) -> Result<User, CafeError> {
		self.storage
			.find::<User>(id)
			.await?
			.ok_or_else(|| CafeError::not_found("User", id))
	}

	pub async fn exists(&self, id: EntityId) -> Result<bool, CafeError> {
		Ok(self.storage.exists::<User>(id).await?)
	}

	/// Creates the configured staff accounts whose phone is not yet taken.
	/// Returns how many were created.
	pub async fn seed_staff(&self, staff: &[StaffConfig]) -> Result<usize, CafeError> {
		let mut created = 0;
		for member in staff {
			let phone = member.phone.trim().to_string();
			if let Some(existing) = self.find_by_phone(&phone).await? {
				if existing.role != member.role {
					tracing::warn!(
						user_id = existing.id,
						role = %existing.role,
						configured = %member.role,
						"Staff phone belongs to an existing user; keeping stored role"
					);
				}
				continue;
			}
			self.storage
				.insert(|id| User {
					id,
					name: member.name.trim().to_string(),
					phone,
					email: None,
					role: member.role,
					password_hash: None,
				})
				.await?;
			created += 1;
		}
		Ok(created)
	}

	async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, CafeError> {
		Ok(self
			.storage
			.find_first::<User, _>(|user| user.phone == phone)
			.await?)
	}
}

fn hash_password(password: &str) -> Result<String, CafeError> {
	let salt = SaltString::generate(&mut OsRng);
	Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| CafeError::Internal(format!("password hashing failed: {}", e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use cafe_storage::implementations::memory::MemoryStorage;

	fn handler() -> UserHandler {
		UserHandler::new(Arc::new(StorageService::new(Box::new(MemoryStorage::new()))))
	}

	fn request(name: &str, phone: &str) -> CreateUserRequest {
		CreateUserRequest {
			name: name.to_string(),
			phone: phone.to_string(),
			email: None,
			password: None,
		}
	}

	#[tokio::test]
	async fn test_create_is_idempotent_on_phone() {
		let users = handler();
		let (first, created) = users.create(request("Anna", "555-0100")).await.unwrap();
		assert!(created);
		let (second, created) = users.create(request("Anna B.", " 555-0100 ")).await.unwrap();
		assert!(!created);
		assert_eq!(first.id, second.id);
		assert_eq!(second.name, "Anna");
		assert_eq!(first.role, Role::Customer);
	}

	#[tokio::test]
	async fn test_password_is_hashed() {
		let users = handler();
		let mut req = request("Anna", "555-0100");
		req.password = Some("hunter22".to_string());
		let (user, _) = users.create(req).await.unwrap();

		let hash = user.password_hash.unwrap();
		assert!(hash.starts_with("$argon2"));
		assert!(!hash.contains("hunter22"));
	}

	#[tokio::test]
	async fn test_get_unknown_user() {
		let users = handler();
		assert!(matches!(
			users.get(3).await,
			Err(CafeError::NotFound { entity: "User", id: 3 })
		));
	}

	#[tokio::test]
	async fn test_seed_staff_skips_known_phones() {
		let users = handler();
		users.create(request("Anna", "555-0100")).await.unwrap();
		let staff = vec![
			StaffConfig {
				name: "Kitchen".to_string(),
				phone: "555-0001".to_string(),
				role: Role::Staff,
			},
			StaffConfig {
				name: "Anna".to_string(),
				phone: "555-0100".to_string(),
				role: Role::Admin,
			},
		];
		assert_eq!(users.seed_staff(&staff).await.unwrap(), 1);
		assert_eq!(users.seed_staff(&staff).await.unwrap(), 0);
		assert_eq!(users.get(2).await.unwrap().role, Role::Staff);
		assert_eq!(users.get(1).await.unwrap().role, Role::Customer);
	}
}
