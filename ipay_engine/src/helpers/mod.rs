mod password;

pub use password::{hash_password, verify_password, verify_password_or_dummy, BCRYPT_COST};
