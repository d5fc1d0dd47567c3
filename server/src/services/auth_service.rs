// server/src/services/auth_service.rs

//! Password hashing and the register / sign-in flows.

use crate::errors::AppError;
use crate::persistence::{NewUser, User, UserStore};
use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use rand_core::OsRng;
use tracing::{debug, error, info, instrument, warn};

const MIN_PASSWORD_LEN: usize = 6;

/// Hashes a plain-text password with Argon2 and a random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// Checks `provided_password` against a stored Argon2 hash.
///
/// `Ok(false)` means the password is wrong. A malformed stored hash is an
/// internal error, not an auth failure.
#[instrument(name = "auth_service::verify_password", skip(hashed_password_str, provided_password), err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if hashed_password_str.is_empty() {
    return Err(AppError::Auth("Invalid stored password format (empty).".to_string()));
  }
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

#[instrument(name = "auth_service::register_user", skip(users, password), fields(username = %username))]
pub async fn register_user(
  users: &dyn UserStore,
  username: &str,
  password: &str,
  phone: Option<String>,
) -> Result<User, AppError> {
  let username = username.trim();
  if username.is_empty() {
    return Err(AppError::Validation("Username is required.".to_string()));
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters.",
      MIN_PASSWORD_LEN
    )));
  }

  let password_hash = hash_password(password)?;
  let user = users
    .insert(NewUser {
      username: username.to_string(),
      password_hash,
      phone: phone.filter(|p| !p.trim().is_empty()),
    })
    .await?;
  info!(user_id = user.id, "User registered.");
  Ok(user)
}

/// Looks the user up and checks the password. Unknown user and wrong password
/// give the same `Auth` error.
#[instrument(name = "auth_service::authenticate", skip(users, password), fields(username = %username))]
pub async fn authenticate(users: &dyn UserStore, username: &str, password: &str) -> Result<User, AppError> {
  let Some(user) = users.find_by_username(username.trim()).await? else {
    warn!("Sign-in for unknown username.");
    return Err(AppError::Auth("Invalid username or password.".to_string()));
  };
  if !verify_password(&user.password_hash, password)? {
    warn!(user_id = user.id, "Sign-in with wrong password.");
    return Err(AppError::Auth("Invalid username or password.".to_string()));
  }
  Ok(user)
}
