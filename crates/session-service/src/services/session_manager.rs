//! Session lifecycle: register, login, authenticate, logout, refresh.
//!
//! # Store layout
//!
//! - access: `{nonce}` -> `"access"`, TTL = access store TTL
//! - refresh: `{refresh token string}` -> `"refresh"`, TTL = refresh store TTL
//!
//! A token is live only while it verifies cryptographically AND its entry
//! is present. Logout and refresh remove entries; their tokens stay
//! cryptographically valid until `exp` but are refused.

use crate::config::Config;
use crate::crypto::{hash_password, verify_password, AccessClaims, RefreshClaims, TokenCodec};
use crate::directory::{NewUser, UserDirectory, UserId, UserRecord};
use crate::errors::SessionError;
use crate::models::{
    AuthenticatedSubject, LoginRequest, LogoutResponse, ProfileResponse, RegisterRequest,
    RegisterResponse, TokenPairResponse, LOGIN_MESSAGE, LOGOUT_MESSAGE, REFRESH_MESSAGE,
    REGISTER_MESSAGE,
};
use crate::observability::{hash_for_correlation, metrics};
use crate::services::validation::validate_registration;
use crate::store::{SessionStore, ACCESS_MARKER, REFRESH_MARKER};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Verified against when the email is unknown, so both login failure paths
/// pay for one bcrypt verification.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

pub struct SessionManager {
    codec: TokenCodec,
    store: Arc<dyn SessionStore>,
    directory: Arc<dyn UserDirectory>,
    access_store_ttl: Duration,
    refresh_store_ttl: Duration,
    bcrypt_cost: u32,
    dummy_hash: String,
}

impl SessionManager {
    /// Build a manager from configuration and its two collaborators.
    ///
    /// Computes the dummy hash at the configured cost, so this performs one
    /// bcrypt hash.
    pub fn new(
        config: &Config,
        store: Arc<dyn SessionStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Result<Self, SessionError> {
        let dummy_hash = hash_password(DUMMY_PASSWORD, config.bcrypt_cost)?;

        Ok(Self {
            codec: TokenCodec::from_config(config),
            store,
            directory,
            access_store_ttl: config.access_store_ttl,
            refresh_store_ttl: config.refresh_store_ttl,
            bcrypt_cost: config.bcrypt_cost,
            dummy_hash,
        })
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// - `Validation` if the request breaks an input rule
    /// - `EmailTaken` if the email is already registered
    #[instrument(skip_all, fields(email_hash = %hash_for_correlation(&request.email)))]
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, SessionError> {
        let result = self.register_inner(request).await;
        metrics::record_registration(&result);
        result
    }

    async fn register_inner(
        &self,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, SessionError> {
        validate_registration(&request)?;

        if self.directory.find_by_email(&request.email).await?.is_some() {
            debug!(target: "session.manager", "Registration rejected: email taken");
            return Err(SessionError::EmailTaken);
        }

        let password_hash = hash_blocking(request.password, self.bcrypt_cost).await?;

        let record = self
            .directory
            .create(NewUser {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                password_hash,
            })
            .await?;

        info!(
            target: "session.manager",
            user_hash = %hash_for_correlation(&record.id.to_string()),
            "User registered"
        );

        Ok(RegisterResponse {
            message: REGISTER_MESSAGE.to_string(),
            data: record.to_profile(),
        })
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown email and wrong password fail identically with
    /// `InvalidCredentials`.
    #[instrument(skip_all, fields(email_hash = %hash_for_correlation(&request.email)))]
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPairResponse, SessionError> {
        let result = self.login_inner(request).await;
        metrics::record_login(&result);
        result
    }

    async fn login_inner(&self, request: LoginRequest) -> Result<TokenPairResponse, SessionError> {
        let user = self.directory.find_by_email(&request.email).await?;

        let hash_to_verify = match &user {
            Some(u) => u.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let is_valid = verify_blocking(request.password, hash_to_verify).await?;

        let user = match user {
            Some(u) if is_valid => u,
            _ => {
                debug!(target: "session.manager", "Login rejected");
                return Err(SessionError::InvalidCredentials);
            }
        };

        let pair = self.mint_pair(&user, LOGIN_MESSAGE).await?;

        info!(
            target: "session.manager",
            user_hash = %hash_for_correlation(&user.id.to_string()),
            "Session opened"
        );
        Ok(pair)
    }

    /// Check an access token: signature and expiry first, then the nonce.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        access_token: &str,
    ) -> Result<AuthenticatedSubject, SessionError> {
        let result = self.authenticate_inner(access_token).await;
        metrics::record_authentication(&result);
        result
    }

    async fn authenticate_inner(
        &self,
        access_token: &str,
    ) -> Result<AuthenticatedSubject, SessionError> {
        let verified = self.codec.decode_access(access_token)?;
        let claims = verified.claims;

        self.require_nonce(&claims.uuid).await?;

        Ok(AuthenticatedSubject {
            id: claims.sub,
            email: claims.email,
            nonce: claims.uuid,
        })
    }

    /// [`authenticate`](Self::authenticate) from an `Authorization` header
    /// value of the form `Bearer <token>`.
    #[instrument(skip_all)]
    pub async fn authenticate_bearer(
        &self,
        header: &str,
    ) -> Result<AuthenticatedSubject, SessionError> {
        match bearer_token(header) {
            Some(token) => self.authenticate(token).await,
            None => {
                let result = Err(SessionError::Unauthorized(
                    "invalid Authorization header format".to_string(),
                ));
                metrics::record_authentication(&result);
                result
            }
        }
    }

    /// Close the session the subject authenticated with.
    ///
    /// Requires the subject's nonce to still be present, then removes it.
    /// The given refresh token's entry is removed only if the token verifies
    /// and was issued to the same subject. A second logout with the same
    /// access token fails with `Unauthorized`.
    #[instrument(skip_all, fields(user_hash = %hash_for_correlation(&subject.id.to_string())))]
    pub async fn logout(
        &self,
        subject: &AuthenticatedSubject,
        refresh_token: &str,
    ) -> Result<LogoutResponse, SessionError> {
        let result = self.logout_inner(subject, refresh_token).await;
        metrics::record_logout(&result);
        result
    }

    async fn logout_inner(
        &self,
        subject: &AuthenticatedSubject,
        refresh_token: &str,
    ) -> Result<LogoutResponse, SessionError> {
        self.require_nonce(&subject.nonce).await?;

        self.store.delete(&subject.nonce.to_string()).await?;

        match self.codec.decode_refresh(refresh_token) {
            Ok(verified) if verified.claims.sub == subject.id => {
                self.store.delete(refresh_token).await?;
            }
            Ok(_) => {
                warn!(
                    target: "session.manager",
                    "Logout presented a refresh token owned by another subject"
                );
            }
            Err(e) => {
                debug!(
                    target: "session.manager",
                    error = %e,
                    "Logout refresh token did not verify; left in place"
                );
            }
        }

        info!(target: "session.manager", "Session closed");
        Ok(LogoutResponse {
            message: LOGOUT_MESSAGE.to_string(),
        })
    }

    /// Redeem a refresh token for a new pair.
    ///
    /// The store entry is claimed before the signature is checked and is
    /// gone afterwards whatever the outcome. Access tokens already issued
    /// are left alone.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the token is not registered, already redeemed, or
    ///   does not verify
    /// - `UserNotFound` if its subject no longer exists in the directory
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPairResponse, SessionError> {
        let result = self.refresh_inner(refresh_token).await;
        metrics::record_refresh(&result);
        result
    }

    async fn refresh_inner(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPairResponse, SessionError> {
        if self.store.take(refresh_token).await?.is_none() {
            debug!(target: "session.manager", "Refresh rejected: token not active");
            return Err(SessionError::Unauthorized(
                "refresh token not active".to_string(),
            ));
        }

        let verified = self.codec.decode_refresh(refresh_token).map_err(|e| {
            warn!(
                target: "session.manager",
                error = %e,
                "Registered refresh token failed verification"
            );
            SessionError::from(e)
        })?;

        let user = self
            .directory
            .find_by_email(&verified.claims.email)
            .await?
            .ok_or_else(|| {
                debug!(target: "session.manager", "Refresh rejected: subject no longer exists");
                SessionError::UserNotFound
            })?;

        let pair = self.mint_pair(&user, REFRESH_MESSAGE).await?;

        info!(
            target: "session.manager",
            user_hash = %hash_for_correlation(&user.id.to_string()),
            "Session rotated"
        );
        Ok(pair)
    }

    /// Profile of the authenticated subject, looked up by email.
    #[instrument(skip_all, fields(user_hash = %hash_for_correlation(&subject.id.to_string())))]
    pub async fn me(
        &self,
        subject: &AuthenticatedSubject,
    ) -> Result<ProfileResponse, SessionError> {
        self.require_nonce(&subject.nonce).await?;

        let user = self
            .directory
            .find_by_email(&subject.email)
            .await?
            .ok_or(SessionError::UserNotFound)?;

        Ok(ProfileResponse {
            data: user.to_profile(),
        })
    }

    /// Profile of any user, for an authenticated caller.
    #[instrument(skip_all, fields(user_hash = %hash_for_correlation(&subject.id.to_string())))]
    pub async fn profile_by_id(
        &self,
        subject: &AuthenticatedSubject,
        id: UserId,
    ) -> Result<ProfileResponse, SessionError> {
        self.require_nonce(&subject.nonce).await?;

        let user = self
            .directory
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                SessionError::NotFound(format!("Cannot find user with id: {}", id))
            })?;

        Ok(ProfileResponse {
            data: user.to_profile(),
        })
    }

    /// Force an access token out of service by its nonce. Idempotent.
    #[instrument(skip_all)]
    pub async fn revoke_access(&self, nonce: &Uuid) -> Result<(), SessionError> {
        self.store.delete(&nonce.to_string()).await?;
        metrics::record_revocation("access");
        info!(target: "session.manager", "Access token revoked");
        Ok(())
    }

    /// Force a refresh token out of service. Idempotent.
    #[instrument(skip_all)]
    pub async fn revoke_refresh(&self, refresh_token: &str) -> Result<(), SessionError> {
        self.store.delete(refresh_token).await?;
        metrics::record_revocation("refresh");
        info!(target: "session.manager", "Refresh token revoked");
        Ok(())
    }

    async fn require_nonce(&self, nonce: &Uuid) -> Result<(), SessionError> {
        match self.store.get(&nonce.to_string()).await? {
            Some(_) => Ok(()),
            None => {
                debug!(target: "session.manager", "Access nonce not active");
                Err(SessionError::Unauthorized("access nonce not active".to_string()))
            }
        }
    }

    /// Sign a fresh access/refresh pair for `user` and register both markers.
    async fn mint_pair(
        &self,
        user: &UserRecord,
        message: &str,
    ) -> Result<TokenPairResponse, SessionError> {
        let nonce = Uuid::new_v4();

        let access_token = self.codec.encode_access(&AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            uuid: nonce,
        })?;
        let refresh_token = self.codec.encode_refresh(&RefreshClaims {
            sub: user.id,
            email: user.email.clone(),
            jti: Uuid::new_v4(),
        })?;

        self.store
            .put(&nonce.to_string(), ACCESS_MARKER, self.access_store_ttl)
            .await?;
        self.store
            .put(&refresh_token, REFRESH_MARKER, self.refresh_store_ttl)
            .await?;

        Ok(TokenPairResponse {
            message: message.to_string(),
            access_token,
            refresh_token,
        })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn hash_blocking(password: SecretString, cost: u32) -> Result<String, SessionError> {
    tokio::task::spawn_blocking(move || hash_password(password.expose_secret(), cost))
        .await
        .map_err(|e| {
            error!(target: "session.manager", error = %e, "Password hashing task failed");
            SessionError::Internal
        })?
}

async fn verify_blocking(password: SecretString, hash: String) -> Result<bool, SessionError> {
    tokio::task::spawn_blocking(move || verify_password(password.expose_secret(), &hash))
        .await
        .map_err(|e| {
            error!(target: "session.manager", error = %e, "Password verification task failed");
            SessionError::Internal
        })
}
