use serde::{Deserialize, Deserializer};

/// A customer's request to send an international payment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentRequest {
    /// The amount as it was written by the client. Both `"100.00"` and `100.5` are accepted, and both are validated
    /// against the same textual rule.
    #[serde(default, deserialize_with = "amount_text")]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub payee_account: String,
    #[serde(default)]
    pub swift_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSubmissionRequest {
    #[serde(default)]
    pub transaction_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

fn amount_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    let text = match AmountInput::deserialize(deserializer)? {
        AmountInput::Text(s) => s,
        AmountInput::Number(n) => n.to_string(),
    };
    Ok(text)
}
