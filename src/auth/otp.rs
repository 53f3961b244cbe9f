//! SMS one-time-password flows: request, verify, register, confirm

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::models::User;

/// Response to an OTP request. `otp` is only echoed by test deployments.
#[derive(Debug, Deserialize)]
pub struct RequestSmsResponse {
    pub detail: String,
    #[serde(default)]
    pub otp: Option<String>,
}

/// Response to a successful OTP verification.
#[derive(Debug, Deserialize)]
pub struct VerifySmsResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
    #[serde(default)]
    pub is_new: bool,
}

/// Registration responses carry an ok/reason pair, plus tokens on confirm.
#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(rename = "CODE", default)]
    pub code: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl RegisterResponse {
    fn failure_reason(&self) -> String {
        self.reason
            .clone()
            .or_else(|| self.code.clone())
            .unwrap_or_else(|| "registration failed".to_string())
    }
}

/// Request a login code for an existing account.
pub async fn request_login_code(client: &ApiClient, phone: &str) -> Result<RequestSmsResponse> {
    client
        .post("/users/sms/request/", &json!({ "phone_number": phone }))
        .await
        .context("Failed to request SMS code")
}

/// Verify a login code. Stores the returned credential pair on success.
pub async fn verify_login_code(
    client: &ApiClient,
    phone: &str,
    otp: &str,
) -> Result<VerifySmsResponse> {
    let resp: VerifySmsResponse = client
        .post(
            "/users/sms/verify/",
            &json!({ "phone_number": phone, "otp": otp }),
        )
        .await
        .context("SMS code verification failed")?;
    client.store_credentials(&resp.access, &resp.refresh);
    Ok(resp)
}

/// Start SMS registration for a new account.
pub async fn request_register_code(
    client: &ApiClient,
    phone: &str,
    name: &str,
    ref_code: Option<&str>,
) -> Result<RegisterResponse> {
    let mut body = json!({ "phone_number": phone, "name": name });
    if let Some(code) = ref_code {
        body["ref_code"] = json!(code);
    }
    let resp: RegisterResponse = client
        .post("/users/register/", &body)
        .await
        .context("Failed to start registration")?;
    if !resp.ok {
        bail!("Registration rejected: {}", resp.failure_reason());
    }
    Ok(resp)
}

/// Confirm registration with the OTP. Stores the credential pair on success.
pub async fn confirm_register(
    client: &ApiClient,
    phone: &str,
    otp: &str,
    name: &str,
    ref_code: Option<&str>,
) -> Result<RegisterResponse> {
    let mut body = json!({ "phone_number": phone, "otp": otp, "name": name });
    if let Some(code) = ref_code {
        body["ref_code"] = json!(code);
    }
    let resp: RegisterResponse = client
        .post("/users/register/confirm/", &body)
        .await
        .context("Failed to confirm registration")?;
    match (&resp.access, &resp.refresh) {
        (Some(access), Some(refresh)) => {
            client.store_credentials(access, refresh);
            Ok(resp)
        }
        _ => bail!("Registration not confirmed: {}", resp.failure_reason()),
    }
}
