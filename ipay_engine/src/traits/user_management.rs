use crate::{
    db_types::{NewUser, User},
    traits::StoreError,
};

/// The `UserManagement` trait defines the behaviour of the credential store.
///
/// Users are created by registration (customers) or out-of-band (employees). Records are never updated or deleted.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Inserts a new user. The insert is atomic: if the username, account number or id number collides with an
    /// existing record, [`StoreError::DuplicateIdentity`] is returned and nothing is written.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Fetches the user matching *both* the username and account number. `None` if there is no such user.
    async fn fetch_user_by_credentials(&self, username: &str, account_number: &str)
        -> Result<Option<User>, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;
}
