//! JWT identity provider.
//!
//! Verifies HS256 bearer tokens issued by the external auth service and
//! extracts the caller identity from standard claims. An optional
//! config-declared profile directory backs the read-only owner join used
//! by administrative listings.

use crate::{IdentityError, IdentityInterface};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use ordering_types::{
	CallerIdentity, ConfigSchema, Field, FieldType, ImplementationRegistry, OwnerProfile, Role,
	Schema, UserId, ValidationError,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Claims carried by a verified token.
#[derive(Debug, Deserialize)]
struct Claims {
	/// Subject: the user's unique identifier.
	sub: String,
	/// The user's email address.
	email: String,
	/// Optional display name.
	#[serde(default)]
	name: Option<String>,
	/// Optional role claim; anything but an admin value means customer.
	#[serde(default)]
	role: Option<String>,
}

/// JWT-based identity provider.
pub struct JwtIdentity {
	decoding_key: DecodingKey,
	validation: Validation,
	/// Optional directory of known user profiles, keyed by user id.
	profiles: HashMap<String, OwnerProfile>,
}

impl JwtIdentity {
	/// Creates a provider verifying HS256 signatures with the given secret.
	pub fn new(
		secret: &str,
		issuer: Option<String>,
		audience: Option<String>,
		leeway_seconds: u64,
		profiles: HashMap<String, OwnerProfile>,
	) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.leeway = leeway_seconds;
		if let Some(ref iss) = issuer {
			validation.set_issuer(&[iss]);
		}
		if let Some(ref aud) = audience {
			validation.set_audience(&[aud]);
		}

		Self {
			decoding_key: DecodingKey::from_secret(secret.as_bytes()),
			validation,
			profiles,
		}
	}
}

#[async_trait]
impl IdentityInterface for JwtIdentity {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(JwtIdentitySchema)
	}

	async fn authenticate(&self, credential: &str) -> Result<CallerIdentity, IdentityError> {
		if credential.is_empty() {
			return Err(IdentityError::MissingCredential);
		}

		let token = decode::<Claims>(credential, &self.decoding_key, &self.validation)
			.map_err(|e| {
				tracing::debug!("Token verification failed: {}", e);
				IdentityError::InvalidCredential(e.to_string())
			})?;

		let claims = token.claims;
		let role = claims
			.role
			.as_deref()
			.map(Role::from_claim)
			.unwrap_or(Role::Customer);

		Ok(CallerIdentity {
			user_id: UserId::new(claims.sub),
			email: claims.email,
			display_name: claims.name,
			role,
		})
	}

	async fn profile(&self, user: &UserId) -> Result<Option<OwnerProfile>, IdentityError> {
		Ok(self.profiles.get(user.as_str()).cloned())
	}
}

/// Configuration schema for the JWT identity provider.
pub struct JwtIdentitySchema;

impl ConfigSchema for JwtIdentitySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("secret", FieldType::String)],
			vec![
				Field::new("issuer", FieldType::String),
				Field::new("audience", FieldType::String),
				Field::new(
					"leeway_seconds",
					FieldType::Integer {
						min: Some(0),
						max: Some(300),
					},
				),
				// Keys of the profile table are user ids, so its shape is free-form
				Field::new("profiles", FieldType::Table(Schema::new(vec![], vec![]))),
			],
		);
		schema.validate(config)
	}
}

/// Registry entry for the JWT identity provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "jwt";
	type Factory = crate::IdentityFactory;

	fn factory() -> Self::Factory {
		create_provider
	}
}

impl crate::IdentityRegistry for Registry {}

/// Factory function to create a JWT identity provider from configuration.
///
/// Configuration parameters:
/// - `secret`: HS256 signing secret (required, env-resolvable)
/// - `issuer`: expected `iss` claim (optional)
/// - `audience`: expected `aud` claim (optional)
/// - `leeway_seconds`: clock skew tolerance (default: 30)
/// - `profiles`: table of known user profiles keyed by user id (optional)
pub fn create_provider(config: &toml::Value) -> Result<Box<dyn IdentityInterface>, IdentityError> {
	let secret = config
		.get("secret")
		.and_then(|v| v.as_str())
		.ok_or_else(|| IdentityError::Configuration("jwt provider requires 'secret'".into()))?;

	let issuer = config
		.get("issuer")
		.and_then(|v| v.as_str())
		.map(str::to_string);
	let audience = config
		.get("audience")
		.and_then(|v| v.as_str())
		.map(str::to_string);
	let leeway_seconds = config
		.get("leeway_seconds")
		.and_then(|v| v.as_integer())
		.unwrap_or(30) as u64;

	let mut profiles = HashMap::new();
	if let Some(table) = config.get("profiles").and_then(|v| v.as_table()) {
		for (user_id, value) in table {
			let email = value
				.get("email")
				.and_then(|v| v.as_str())
				.ok_or_else(|| {
					IdentityError::Configuration(format!(
						"profile for '{}' is missing 'email'",
						user_id
					))
				})?;
			let display_name = value
				.get("display_name")
				.and_then(|v| v.as_str())
				.map(str::to_string);
			profiles.insert(
				user_id.to_string(),
				OwnerProfile {
					email: email.to_string(),
					display_name,
				},
			);
		}
	}

	Ok(Box::new(JwtIdentity::new(
		secret,
		issuer,
		audience,
		leeway_seconds,
		profiles,
	)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
	use serde::Serialize;

	const SECRET: &str = "test-secret";

	#[derive(Serialize)]
	struct TestClaims {
		sub: String,
		email: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		name: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		role: Option<String>,
		exp: u64,
	}

	fn sign(claims: &TestClaims, secret: &str) -> String {
		encode(
			&Header::default(),
			claims,
			&EncodingKey::from_secret(secret.as_bytes()),
		)
		.unwrap()
	}

	fn provider() -> JwtIdentity {
		JwtIdentity::new(SECRET, None, None, 0, HashMap::new())
	}

	fn valid_claims() -> TestClaims {
		TestClaims {
			sub: "user-1".to_string(),
			email: "john@example.com".to_string(),
			name: Some("John Doe".to_string()),
			role: None,
			exp: get_current_timestamp() + 3600,
		}
	}

	#[tokio::test]
	async fn valid_token_resolves_identity() {
		let token = sign(&valid_claims(), SECRET);
		let caller = provider().authenticate(&token).await.unwrap();

		assert_eq!(caller.user_id, UserId::from("user-1"));
		assert_eq!(caller.email, "john@example.com");
		assert_eq!(caller.display_name.as_deref(), Some("John Doe"));
		assert_eq!(caller.role, Role::Customer);
	}

	#[tokio::test]
	async fn admin_role_claim_is_honored() {
		let mut claims = valid_claims();
		claims.role = Some("admin".to_string());
		let token = sign(&claims, SECRET);

		let caller = provider().authenticate(&token).await.unwrap();
		assert_eq!(caller.role, Role::Administrator);
		assert!(caller.is_admin());
	}

	#[tokio::test]
	async fn wrong_signature_is_rejected() {
		let token = sign(&valid_claims(), "other-secret");
		let result = provider().authenticate(&token).await;
		assert!(matches!(result, Err(IdentityError::InvalidCredential(_))));
	}

	#[tokio::test]
	async fn expired_token_is_rejected() {
		let mut claims = valid_claims();
		claims.exp = get_current_timestamp() - 3600;
		let token = sign(&claims, SECRET);

		let result = provider().authenticate(&token).await;
		assert!(matches!(result, Err(IdentityError::InvalidCredential(_))));
	}

	#[tokio::test]
	async fn empty_credential_is_missing() {
		let result = provider().authenticate("").await;
		assert!(matches!(result, Err(IdentityError::MissingCredential)));
	}

	#[tokio::test]
	async fn profile_directory_lookup() {
		let mut profiles = HashMap::new();
		profiles.insert(
			"user-1".to_string(),
			OwnerProfile {
				email: "john@example.com".to_string(),
				display_name: Some("John Doe".to_string()),
			},
		);
		let provider = JwtIdentity::new(SECRET, None, None, 0, profiles);

		let known = provider.profile(&UserId::from("user-1")).await.unwrap();
		assert_eq!(known.unwrap().email, "john@example.com");

		let unknown = provider.profile(&UserId::from("user-9")).await.unwrap();
		assert!(unknown.is_none());
	}

	#[test]
	fn factory_requires_a_secret() {
		let config: toml::Value = toml::from_str("issuer = \"orders\"").unwrap();
		let result = create_provider(&config);
		assert!(matches!(result, Err(IdentityError::Configuration(_))));
	}

	#[tokio::test]
	async fn factory_parses_profile_directory() {
		let config = r#"
secret = "test-secret"

[profiles.user-1]
email = "john@example.com"
display_name = "John Doe"

[profiles.user-2]
email = "jane@example.com"
"#;
		let config: toml::Value = toml::from_str(config).unwrap();

		let provider = create_provider(&config).unwrap();
		let profile = provider.profile(&UserId::from("user-2")).await.unwrap();
		let profile = profile.unwrap();
		assert_eq!(profile.email, "jane@example.com");
		assert!(profile.display_name.is_none());
	}
}
