use crate::api::auth::{hash_password, verify_password, JwtAuth};
use crate::error::{Error, Result};
use crate::store::Store;

/// Registration and login against the users table. Login failures are
/// deliberately indistinguishable: unknown email and wrong password both
/// come back as `InvalidCredentials`.
#[derive(Clone)]
pub struct AccountService {
    store: Store,
}

impl AccountService {
    pub fn new(store: Store) -> Self {
        AccountService { store }
    }

    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidRequest(
                "username and password are required".to_string(),
            ));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(Error::InvalidRequest("a valid email is required".to_string()));
        }

        if self.store.find_user_by_email(email)?.is_some() {
            return Err(Error::EmailTaken);
        }

        self.store.insert_user(username, email, &hash_password(password))?;
        tracing::info!("Registered user {username}");
        Ok(())
    }

    pub fn login(&self, jwt: &JwtAuth, token_ttl_secs: u64, email: &str, password: &str) -> Result<String> {
        let user = self
            .store
            .find_user_by_email(email)?
            .ok_or(Error::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(Error::InvalidCredentials);
        }

        jwt.generate_token(&user.email, token_ttl_secs)
    }
}
