use ipay_common::Secret;
use serde::Deserialize;

/// A customer self-registration request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub password: Secret<String>,
}

/// Employees are never self-registered. This request is only issued by administrative tooling.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployeeRequest {
    pub full_name: String,
    pub username: String,
    pub account_number: String,
    pub password: Secret<String>,
}

