//! Registration, login and account lookup.
use std::fmt::Debug;

use log::*;

use crate::{
    api::{
        auth_objects::{LoginRequest, NewEmployeeRequest, RegistrationRequest},
        errors::AuthApiError,
    },
    db_types::{Identity, NewUser, Role, User, UserProfile},
    helpers::{hash_password, verify_password_or_dummy},
    traits::UserManagement,
    validation::{
        require_non_blank,
        validate_account_number,
        validate_full_name,
        validate_id_number,
        validate_password,
        ValidationError,
    },
};

/// `AuthApi` manages the credential store: customer self-registration, out-of-band employee creation and password
/// authentication.
///
/// Issuing and checking access tokens is left to the server. A successful [`AuthApi::authenticate`] call returns the
/// [`Identity`] that the token must carry.
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Registers a new customer. The username is always the account number. All fields are validated before anything
    /// is written, and a collision on any unique field is reported as [`AuthApiError::DuplicateIdentity`].
    pub async fn register(&self, request: RegistrationRequest) -> Result<User, AuthApiError> {
        let RegistrationRequest { full_name, id_number, account_number, password } = request;
        require_non_blank(&full_name, "Full name")?;
        require_non_blank(&id_number, "ID number")?;
        require_non_blank(&account_number, "Account number")?;
        require_non_blank(password.reveal(), "Password")?;
        validate_full_name(&full_name)?;
        validate_id_number(&id_number)?;
        validate_account_number(&account_number)?;
        validate_password(password.reveal())?;
        let password_hash = hash_password(&password).await?;
        let user = NewUser {
            full_name,
            id_number: Some(id_number),
            username: account_number.clone(),
            account_number,
            password_hash,
            role: Role::Customer,
        };
        let user = self.db.insert_user(user).await.map_err(|e| {
            debug!("🔐️ Registration rejected. {e}");
            AuthApiError::from(e)
        })?;
        info!("🔐️ Customer #{} registered", user.id);
        Ok(user)
    }

    /// Creates an employee account. Employees have no ID number, and their username is chosen by the administrator.
    pub async fn create_employee(&self, request: NewEmployeeRequest) -> Result<User, AuthApiError> {
        let NewEmployeeRequest { full_name, username, account_number, password } = request;
        require_non_blank(&username, "Username")?;
        validate_full_name(&full_name)?;
        validate_account_number(&account_number)?;
        validate_password(password.reveal())?;
        let password_hash = hash_password(&password).await?;
        let user = NewUser { full_name, id_number: None, username, account_number, password_hash, role: Role::Employee };
        let user = self.db.insert_user(user).await?;
        info!("🔐️ Employee #{} ({}) created", user.id, user.username);
        Ok(user)
    }

    /// Checks a username, account number and password. Unknown users and wrong passwords both produce
    /// [`AuthApiError::InvalidCredentials`], after the same amount of hashing work.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<Identity, AuthApiError> {
        let LoginRequest { username, account_number, password } = request;
        require_non_blank(&username, "Username")?;
        require_non_blank(&account_number, "Account number")?;
        if password.reveal().is_empty() {
            return Err(ValidationError::MissingField("Password").into());
        }
        validate_account_number(&account_number)?;
        let user = self.db.fetch_user_by_credentials(&username, &account_number).await?;
        let hash = user.as_ref().map(|u| u.password_hash.as_str());
        let matches = verify_password_or_dummy(&password, hash).await?;
        match user {
            Some(user) if matches => {
                debug!("🔐️ {} #{} logged in", user.role, user.id);
                Ok(Identity::from(&user))
            },
            _ => {
                debug!("🔐️ Failed login attempt for username {username}");
                Err(AuthApiError::InvalidCredentials)
            },
        }
    }

    pub async fn profile(&self, identity: &Identity) -> Result<UserProfile, AuthApiError> {
        let user = self.db.fetch_user_by_id(identity.user_id).await?.ok_or(AuthApiError::UserNotFound(identity.user_id))?;
        Ok(user.into())
    }

    /// True if no user has been created yet.
    pub async fn is_empty(&self) -> Result<bool, AuthApiError> {
        Ok(self.db.count_users().await? == 0)
    }
}
