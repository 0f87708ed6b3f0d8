use crate::connection_profile::ConnectionProfile;
use crate::ledger_error::LedgerError;
use crate::signing;
use crate::wallet::Identity;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

static ENROLL_PATH: &str = "/api/v1/enroll";
static REGISTER_PATH: &str = "/api/v1/register";

/// 注册请求 (Fabric CA /api/v1/register)
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub affiliation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub max_enrollments: i32,
    pub caname: String,
}

#[derive(Debug, Clone)]
pub struct Enrollment {
    pub certificate: String,
    pub private_key: String,
}

#[derive(Debug, Deserialize)]
struct CaMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CaResponse<T> {
    success: bool,
    result: Option<T>,
    #[serde(default)]
    errors: Vec<CaMessage>,
}

#[derive(Debug, Deserialize)]
struct EnrollResult {
    #[serde(rename = "Cert")]
    cert: String,
}

#[derive(Debug, Deserialize)]
struct RegisterResult {
    secret: String,
}

fn ca_err(action: &str, detail: impl std::fmt::Display) -> LedgerError {
    LedgerError::Identity(format!("CA {} failed: {}", action, detail))
}

fn parse_ca_response<T: DeserializeOwned>(action: &str, body: &str) -> Result<T, LedgerError> {
    let response: CaResponse<T> =
        serde_json::from_str(body).map_err(|e| ca_err(action, format!("bad response: {}", e)))?;
    if !response.success {
        let detail = response
            .errors
            .iter()
            .map(|m| format!("[{}] {}", m.code, m.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ca_err(action, detail));
    }
    response
        .result
        .ok_or_else(|| ca_err(action, "response has no result"))
}

/// 解析 enroll 响应, 返回 PEM 证书
fn parse_enroll_response(body: &str) -> Result<String, LedgerError> {
    let result: EnrollResult = parse_ca_response("enroll", body)?;
    let pem = STANDARD
        .decode(result.cert.as_bytes())
        .map_err(|e| ca_err("enroll", format!("certificate is not base64: {}", e)))?;
    String::from_utf8(pem).map_err(|e| ca_err("enroll", e))
}

fn parse_register_response(body: &str) -> Result<String, LedgerError> {
    let result: RegisterResult = parse_ca_response("register", body)?;
    Ok(result.secret)
}

/// Fabric CA 令牌: `b64(cert).b64(sig)`, 签名内容为 `METHOD.b64(path).b64(body).b64(cert)`
pub fn generate_auth_token(
    identity: &Identity,
    method: &str,
    path: &str,
    body: &[u8],
) -> Result<String, LedgerError> {
    let cert_b64 = STANDARD.encode(identity.credentials.certificate.as_bytes());
    let payload = format!(
        "{}.{}.{}.{}",
        method,
        STANDARD.encode(path.as_bytes()),
        STANDARD.encode(body),
        cert_b64
    );
    let signature = signing::sign_low_s(&identity.credentials.private_key, payload.as_bytes())?;
    Ok(format!("{}.{}", cert_b64, STANDARD.encode(signature)))
}

/// Fabric CA REST 客户端
#[derive(Debug, Clone)]
pub struct CaClient {
    client: reqwest::Client,
    url: String,
    ca_name: String,
}

impl CaClient {
    pub fn new(
        url: &str,
        ca_name: &str,
        tls_ca_pem: Option<&str>,
        verify: bool,
    ) -> Result<Self, LedgerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(pem) = tls_ca_pem {
            let cert = reqwest::Certificate::from_pem(pem.as_bytes())
                .map_err(|e| LedgerError::Connection(format!("bad CA TLS certificate: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }
        if !verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| LedgerError::Connection(format!("cannot build CA client: {}", e)))?;
        Ok(CaClient {
            client,
            url: url.trim_end_matches('/').to_string(),
            ca_name: ca_name.to_string(),
        })
    }

    /// 按 connection profile 中的 CA 名称构建客户端
    pub fn from_profile(profile: &ConnectionProfile, ca_host_name: &str) -> Result<Self, LedgerError> {
        let ca = profile.certificate_authority(ca_host_name)?;
        let verify = ca.http_options.as_ref().map_or(true, |o| o.verify);
        let tls_pem = ca.tls_ca_certs.as_ref().and_then(|t| t.pem.as_deref());
        Self::new(&ca.url, &ca.ca_name, tls_pem, verify)
    }

    pub fn ca_name(&self) -> &str {
        &self.ca_name
    }

    pub async fn enroll(&self, enrollment_id: &str, secret: &str) -> Result<Enrollment, LedgerError> {
        let key = signing::generate_key()?;
        let csr = signing::create_csr(&key, enrollment_id)?;
        let body = serde_json::json!({
            "certificate_request": csr,
            "caname": self.ca_name,
        });

        let response = self
            .client
            .post(format!("{}{}", self.url, ENROLL_PATH))
            .basic_auth(enrollment_id, Some(secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| ca_err("enroll", e))?;
        let text = response.text().await.map_err(|e| ca_err("enroll", e))?;

        Ok(Enrollment {
            certificate: parse_enroll_response(&text)?,
            private_key: signing::private_key_to_pem(&key)?,
        })
    }

    /// 使用注册员身份登记新用户, 返回 enrollment secret
    pub async fn register(
        &self,
        registrar: &Identity,
        request: &RegistrationRequest,
    ) -> Result<String, LedgerError> {
        let body = serde_json::to_vec(request).map_err(|e| ca_err("register", e))?;
        let token = generate_auth_token(registrar, "POST", REGISTER_PATH, &body)?;

        let response = self
            .client
            .post(format!("{}{}", self.url, REGISTER_PATH))
            .header(reqwest::header::AUTHORIZATION, token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ca_err("register", e))?;
        let text = response.text().await.map_err(|e| ca_err("register", e))?;
        parse_register_response(&text)
    }
}
