use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ipay_common::{Amount, Secret};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------         Role          ---------------------------------------------------------
/// The role of a user. Fixed when the account is created, and gates every workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Self-registered customers. They may submit payments.
    Customer,
    /// Bank staff. They verify payments and submit them for settlement. Created out-of-band only.
    Employee,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "employee" => Ok(Self::Employee),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------  TransactionStatus    ---------------------------------------------------------
/// The status of a payment. Statuses only ever move forward: `Pending` → `Verified` → `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Submitted by a customer and awaiting verification.
    Pending,
    /// Checked by an employee and ready for settlement.
    Verified,
    /// Submitted to the settlement network.
    Completed,
}

impl TransactionStatus {
    /// The status that must be current for a transition into `self` to be legal, if any.
    pub fn predecessor(&self) -> Option<TransactionStatus> {
        match self {
            TransactionStatus::Pending => None,
            TransactionStatus::Verified => Some(TransactionStatus::Pending),
            TransactionStatus::Completed => Some(TransactionStatus::Verified),
        }
    }

    /// True if moving from `self` to `next` is a legal, single-step forward transition.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        next.predecessor() == Some(*self)
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "Pending"),
            TransactionStatus::Verified => write!(f, "Verified"),
            TransactionStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Verified" => Ok(Self::Verified),
            "Completed" => Ok(Self::Completed),
            s => Err(ConversionError(format!("Invalid transaction status: {s}"))),
        }
    }
}

//--------------------------------------         User          ---------------------------------------------------------
/// A stored user record. This type carries the password hash, so it is intentionally not `Serialize`. Use
/// [`UserProfile`] for anything that leaves the engine.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub id_number: Option<String>,
    pub account_number: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        NewUser        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub id_number: Option<String>,
    pub account_number: String,
    pub username: String,
    /// The bcrypt digest of the user's password. Plaintext passwords never reach the store.
    pub password_hash: Secret<String>,
    pub role: Role,
}

//--------------------------------------      UserProfile      ---------------------------------------------------------
/// The public view of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub account_number: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            account_number: user.account_number,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

//--------------------------------------       Identity        ---------------------------------------------------------
/// An authenticated caller. This is what a verified access token proves about the bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new<S: Into<String>>(user_id: i64, username: S, role: Role) -> Self {
        Self { user_id, username: username.into(), role }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self { user_id: user.id, username: user.username.clone(), role: user.role }
    }
}

//--------------------------------------      Transaction      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub customer_id: i64,
    pub amount: Amount,
    pub currency: String,
    pub provider: String,
    pub payee_account: String,
    pub swift_code: String,
    pub status: TransactionStatus,
    /// The employee that performed the most recent status change. `None` until the first one.
    pub processed_by_employee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    NewTransaction     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub customer_id: i64,
    pub amount: Amount,
    pub currency: String,
    pub provider: String,
    pub payee_account: String,
    pub swift_code: String,
}

//--------------------------------------   TransactionDetail   ---------------------------------------------------------
/// A transaction joined with the full name of the customer that owns it. This is what employees see.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub transaction: Transaction,
    pub customer_full_name: String,
}

//--------------------------------------     StatusChange      ---------------------------------------------------------
/// One entry of the append-only status history of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub id: i64,
    pub transaction_id: i64,
    pub from_status: TransactionStatus,
    pub to_status: TransactionStatus,
    pub employee_id: i64,
    pub changed_at: DateTime<Utc>,
}
