//! Account registration and login

use common::error::DatabaseError;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    jwt::JwtService,
    models::{LoginRequest, LoginResponse, NewUser, RegisterRequest, UserResponse},
    password::{PasswordError, PasswordService},
    repositories::{USER_EMAIL_CONSTRAINT, UserRepository},
    validation::validate_registration,
};

/// Errors raised by the authentication use case
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User with this email already exists")]
    Conflict,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Hashing(#[from] PasswordError),

    #[error("Failed to issue token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Registers accounts and exchanges credentials for bearer tokens
#[derive(Clone)]
pub struct AuthService<U> {
    users: U,
    passwords: PasswordService,
    jwt: JwtService,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: U, passwords: PasswordService, jwt: JwtService) -> Self {
        Self {
            users,
            passwords,
            jwt,
        }
    }

    /// Create an account, returning its public projection
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AuthError> {
        let request = RegisterRequest {
            email: normalize_email(&request.email),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            ..request
        };
        validate_registration(&request).map_err(AuthError::Validation)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            warn!("Registration rejected, email {} is taken", request.email);
            return Err(AuthError::Conflict);
        }

        let new_user = NewUser {
            email: request.email,
            password_hash: self.passwords.hash(&request.password).await?,
            first_name: request.first_name,
            last_name: request.last_name,
        };

        let user = self.users.create(&new_user).await.map_err(|e| {
            if e.is_unique_violation_of(USER_EMAIL_CONSTRAINT) {
                warn!("Registration raced on email {}", new_user.email);
                AuthError::Conflict
            } else {
                error!("Failed to create user: {}", e);
                AuthError::Storage(e)
            }
        })?;

        info!("Registered user {}", user.id);
        Ok(user.into())
    }

    /// Check credentials and issue a bearer token.
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(&request.email);
        let user = self.users.find_by_email(&email).await?;

        let stored_hash = user.as_ref().map(|user| user.password_hash.as_str());
        if !self.passwords.verify(&request.password, stored_hash).await {
            warn!("Failed login attempt for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let Some(user) = user else {
            return Err(AuthError::InvalidCredentials);
        };

        let token = self.jwt.generate_token(&user)?;
        info!("User {} logged in", user.id);

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.token_expiry(),
            user: user.into(),
        })
    }
}
