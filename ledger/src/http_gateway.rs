use crate::ca_client::CaClient;
use crate::connection_profile::{ConnectionProfile, GatewayEndpoint};
use crate::enrollment;
use crate::gateway::{Contract, Session, SessionFactory};
use crate::ledger_error::{ContractError, LedgerError};
use crate::signing;
use crate::wallet::{FileSystemWallet, Identity};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use slog::{Logger, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub static HEADER_MSP_ID: &str = "X-Fabric-MspId";
pub static HEADER_CERTIFICATE: &str = "X-Fabric-Certificate";
pub static HEADER_SIGNATURE: &str = "X-Fabric-Signature";
static HEALTH_PATH: &str = "/healthz";

/// 缺少身份时自动注册所需的 CA 信息
#[derive(Debug, Clone)]
pub struct CaEnrollment {
    pub client: CaClient,
    pub affiliation: String,
}

/// 通过 REST 网关访问账本的会话工厂
pub struct HttpGateway {
    profile: ConnectionProfile,
    wallet: FileSystemWallet,
    msp_id: String,
    request_timeout: Duration,
    ca: Option<CaEnrollment>,
    log: Logger,
}

impl HttpGateway {
    pub fn new(
        profile: ConnectionProfile,
        wallet: FileSystemWallet,
        msp_id: &str,
        request_timeout: Duration,
        ca: Option<CaEnrollment>,
        log: Logger,
    ) -> Self {
        HttpGateway {
            profile,
            wallet,
            msp_id: msp_id.to_string(),
            request_timeout,
            ca,
            log,
        }
    }

    async fn resolve_identity(&self, identity_label: &str) -> Result<Identity, LedgerError> {
        if let Some(identity) = self.wallet.get(identity_label)? {
            return Ok(identity);
        }
        match &self.ca {
            Some(ca) => {
                warn!(self.log, "Identity missing from wallet, enrolling"; "identity" => identity_label);
                enrollment::register_and_enroll_user(
                    &ca.client,
                    &self.wallet,
                    &self.msp_id,
                    identity_label,
                    &ca.affiliation,
                    &self.log,
                )
                .await
            }
            None => Err(LedgerError::Identity(format!(
                "An identity for the user {} does not exist in the wallet",
                identity_label
            ))),
        }
    }

    fn build_client(&self, endpoint: &GatewayEndpoint) -> Result<reqwest::Client, LedgerError> {
        let mut builder = reqwest::Client::builder().timeout(self.request_timeout);
        if let Some(pem) = &endpoint.tls_ca_pem {
            let cert = reqwest::Certificate::from_pem(pem.as_bytes()).map_err(|e| {
                LedgerError::Connection(format!(
                    "bad TLS certificate for {}: {}",
                    endpoint.peer_name, e
                ))
            })?;
            builder = builder.add_root_certificate(cert);
        }
        builder
            .build()
            .map_err(|e| LedgerError::Connection(format!("cannot build gateway client: {}", e)))
    }
}

#[async_trait]
impl SessionFactory for HttpGateway {
    async fn open_session(&self, identity_label: &str) -> Result<Arc<dyn Session>, LedgerError> {
        let endpoint = self.profile.gateway_endpoint()?;
        let identity = self.resolve_identity(identity_label).await?;
        let client = self.build_client(&endpoint)?;

        let response = client
            .get(format!("{}{}", endpoint.url, HEALTH_PATH))
            .send()
            .await
            .map_err(|e| {
                LedgerError::Gateway(format!("cannot reach {}: {}", endpoint.peer_name, e))
            })?;
        if !response.status().is_success() {
            return Err(LedgerError::Gateway(format!(
                "gateway {} is not ready: {}",
                endpoint.peer_name,
                response.status()
            )));
        }

        info!(self.log, "Gateway session opened";
            "identity" => identity_label, "peer" => &endpoint.peer_name);
        Ok(Arc::new(HttpSession {
            identity_label: identity_label.to_string(),
            endpoint_url: endpoint.url,
            client,
            identity: Arc::new(identity),
            closed: Arc::new(AtomicBool::new(false)),
        }))
    }
}

pub struct HttpSession {
    identity_label: String,
    endpoint_url: String,
    client: reqwest::Client,
    identity: Arc<Identity>,
    closed: Arc<AtomicBool>,
}

impl Session for HttpSession {
    fn identity_label(&self) -> &str {
        &self.identity_label
    }

    fn contract(&self, channel: &str, chaincode: &str) -> Arc<dyn Contract> {
        Arc::new(HttpContract {
            client: self.client.clone(),
            base_url: format!(
                "{}/api/v1/channels/{}/chaincodes/{}",
                self.endpoint_url, channel, chaincode
            ),
            identity: self.identity.clone(),
            closed: self.closed.clone(),
        })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct HttpContract {
    client: reqwest::Client,
    base_url: String,
    identity: Arc<Identity>,
    closed: Arc<AtomicBool>,
}

/// 网关错误响应体: `{"error": ...}` / `{"message": ...}` / 纯文本
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    body.trim().to_string()
}

impl HttpContract {
    async fn invoke(
        &self,
        mode: &str,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, LedgerError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(LedgerError::Gateway("session is closed".to_string()));
        }

        let body = serde_json::to_vec(&serde_json::json!({
            "function": function,
            "args": args,
        }))
        .map_err(|e| LedgerError::Gateway(format!("cannot encode request: {}", e)))?;
        let signature = signing::sign_low_s(&self.identity.credentials.private_key, &body)?;

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, mode))
            .header(HEADER_MSP_ID, self.identity.msp_id.as_str())
            .header(
                HEADER_CERTIFICATE,
                STANDARD.encode(self.identity.credentials.certificate.as_bytes()),
            )
            .header(HEADER_SIGNATURE, STANDARD.encode(signature))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Contract(ContractError::unavailable(format!(
                        "{} {} timed out",
                        mode, function
                    )))
                } else {
                    LedgerError::Gateway(format!("{} {} failed: {}", mode, function, e))
                }
            })?;

        let status = response.status();
        let payload = response
            .bytes()
            .await
            .map_err(|e| LedgerError::Gateway(format!("cannot read response: {}", e)))?;
        if status.is_success() {
            return Ok(payload.to_vec());
        }

        let message = extract_error_message(&String::from_utf8_lossy(&payload));
        Err(ContractError::from_status(status.as_u16(), message).into())
    }
}

#[async_trait]
impl Contract for HttpContract {
    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.invoke("evaluate", function, args).await
    }

    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.invoke("submit", function, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection_profile::tests::PROFILE;
    use crate::ledger_error::ContractErrorKind;
    use crate::session_pool::SessionPool;
    use crate::signing::tests::{self_signed, verify_with_cert};
    use slog::{Discard, o};
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn temp_wallet() -> FileSystemWallet {
        let dir = std::env::temp_dir().join(format!("ehr-gw-{}", uuid::Uuid::new_v4()));
        FileSystemWallet::open(dir).unwrap()
    }

    fn gateway(profile: &str, wallet: FileSystemWallet) -> HttpGateway {
        HttpGateway::new(
            ConnectionProfile::from_json(profile).unwrap(),
            wallet,
            "Hospital1MSP",
            Duration::from_secs(2),
            None,
            Logger::root(Discard, o!()),
        )
    }

    /// 网关收到的一次请求
    #[derive(Debug, Clone)]
    struct Received {
        head: String,
        body: Vec<u8>,
    }

    impl Received {
        fn header(&self, name: &str) -> Option<String> {
            let name = name.to_ascii_lowercase();
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                (key.trim().to_ascii_lowercase() == name).then(|| value.trim().to_string())
            })
        }

        fn path(&self) -> String {
            self.head
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_string()
        }
    }

    /// 本地 REST 网关替身: /healthz 返回 200, 其余请求返回预设的状态和响应体
    struct StubGateway {
        url: String,
        received: Arc<Mutex<Vec<Received>>>,
    }

    impl StubGateway {
        async fn start(status: u16, body: &str, delay: Duration) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            let received = Arc::new(Mutex::new(Vec::new()));
            let sink = received.clone();
            let body = body.to_string();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let sink = sink.clone();
                    let body = body.clone();
                    tokio::spawn(async move {
                        serve_one(stream, status, &body, delay, sink).await;
                    });
                }
            });
            StubGateway { url, received }
        }

        fn invocations(&self) -> Vec<Received> {
            self.received
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.path() != HEALTH_PATH)
                .cloned()
                .collect()
        }
    }

    async fn read_request(stream: &mut TcpStream) -> Option<Received> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_string();
                let mut request = Received {
                    head,
                    body: Vec::new(),
                };
                let length: usize = request
                    .header("content-length")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                let mut body = buf[end + 4..].to_vec();
                while body.len() < length {
                    let n = stream.read(&mut chunk).await.ok()?;
                    if n == 0 {
                        break;
                    }
                    body.extend_from_slice(&chunk[..n]);
                }
                request.body = body;
                return Some(request);
            }
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                return None;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    async fn serve_one(
        mut stream: TcpStream,
        status: u16,
        body: &str,
        delay: Duration,
        sink: Arc<Mutex<Vec<Received>>>,
    ) {
        let Some(request) = read_request(&mut stream).await else {
            return;
        };
        let health = request.path() == HEALTH_PATH;
        sink.lock().unwrap().push(request);

        let (status, body) = if health {
            (200, "ok")
        } else {
            tokio::time::sleep(delay).await;
            (status, body)
        };
        let response = format!(
            "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    /// 钱包中写入自签身份, 返回网关和证书 PEM
    fn gateway_for(stub: &StubGateway, timeout: Duration) -> (HttpGateway, String, std::path::PathBuf) {
        let key = signing::generate_key().unwrap();
        let cert = self_signed(&key, "Admin");
        let wallet = temp_wallet();
        let dir = wallet.dir().to_path_buf();
        wallet
            .put(
                "Admin",
                &Identity::x509(
                    "Hospital1MSP",
                    cert.clone(),
                    signing::private_key_to_pem(&key).unwrap(),
                ),
            )
            .unwrap();
        let profile = PROFILE.replace("http://localhost:7080/", &stub.url);
        let gw = HttpGateway::new(
            ConnectionProfile::from_json(&profile).unwrap(),
            wallet,
            "Hospital1MSP",
            timeout,
            None,
            Logger::root(Discard, o!()),
        );
        (gw, cert, dir)
    }

    async fn evaluate_once(status: u16, body: &str) -> Result<Vec<u8>, LedgerError> {
        let stub = StubGateway::start(status, body, Duration::ZERO).await;
        let (gw, _, dir) = gateway_for(&stub, Duration::from_secs(2));
        let session = gw.open_session("Admin").await.unwrap();
        let result = session
            .contract("mychannel", "hospital")
            .evaluate("ReadPatient", &["P001".to_string()])
            .await;
        let _ = std::fs::remove_dir_all(dir);
        result
    }

    #[tokio::test]
    async fn test_evaluate_signs_request_and_returns_payload() {
        let payload = r#"{"patientID":"P001","firstName":"Ann"}"#;
        let stub = StubGateway::start(200, payload, Duration::ZERO).await;
        let (gw, cert, dir) = gateway_for(&stub, Duration::from_secs(2));
        let session = gw.open_session("Admin").await.unwrap();

        let result = session
            .contract("mychannel", "hospital")
            .evaluate("ReadPatient", &["P001".to_string()])
            .await
            .unwrap();
        assert_eq!(result, payload.as_bytes());

        let invocations = stub.invocations();
        assert_eq!(invocations.len(), 1);
        let request = &invocations[0];
        assert!(request.head.starts_with("POST "));
        assert_eq!(
            request.path(),
            "/api/v1/channels/mychannel/chaincodes/hospital/evaluate"
        );
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"function": "ReadPatient", "args": ["P001"]})
        );
        assert_eq!(request.header(HEADER_MSP_ID).unwrap(), "Hospital1MSP");

        let sent_cert = STANDARD
            .decode(request.header(HEADER_CERTIFICATE).unwrap())
            .unwrap();
        assert_eq!(String::from_utf8(sent_cert).unwrap(), cert);
        let signature = STANDARD
            .decode(request.header(HEADER_SIGNATURE).unwrap())
            .unwrap();
        assert!(verify_with_cert(&cert, &request.body, &signature));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_submit_uses_submit_path() {
        let stub = StubGateway::start(200, "", Duration::ZERO).await;
        let (gw, _, dir) = gateway_for(&stub, Duration::from_secs(2));
        let session = gw.open_session("Admin").await.unwrap();

        let result = session
            .contract("mychannel", "hospital")
            .submit("DeletePatient", &["P001".to_string()])
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(
            stub.invocations()[0].path(),
            "/api/v1/channels/mychannel/chaincodes/hospital/submit"
        );
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_server_error_discards_session() {
        let stub = StubGateway::start(503, r#"{"error":"peer unavailable"}"#, Duration::ZERO).await;
        let (gw, _, dir) = gateway_for(&stub, Duration::from_secs(2));
        let pool = SessionPool::new(Arc::new(gw), 4, Logger::root(Discard, o!()));

        let mut lease = pool.acquire("Admin").await.unwrap();
        let contract = lease.contract("mychannel", "hospital");
        let err = contract.evaluate("GetAllPatients", &[]).await.unwrap_err();
        assert_eq!(err.contract_kind(), Some(ContractErrorKind::Unavailable));
        assert!(err.to_string().contains("peer unavailable"));
        assert!(err.is_session_fault());

        lease.discard();
        drop(lease);
        assert_eq!(pool.idle_count("Admin"), 0);
        assert!(matches!(
            contract.evaluate("GetAllPatients", &[]).await,
            Err(LedgerError::Gateway(_))
        ));
        assert_eq!(stub.invocations().len(), 1);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let err = evaluate_once(404, r#"{"error":"the patient P001 does not exist"}"#)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_session_fault());
    }

    #[tokio::test]
    async fn test_bare_404_is_validation_failure() {
        let err = evaluate_once(404, "404 page not found").await.unwrap_err();
        assert_eq!(err.contract_kind(), Some(ContractErrorKind::ValidationFailed));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_slow_gateway_is_unavailable() {
        let stub = StubGateway::start(200, "[]", Duration::from_secs(5)).await;
        let (gw, _, dir) = gateway_for(&stub, Duration::from_millis(300));
        let session = gw.open_session("Admin").await.unwrap();

        let err = session
            .contract("mychannel", "hospital")
            .evaluate("GetAllPatients", &[])
            .await
            .unwrap_err();
        assert_eq!(err.contract_kind(), Some(ContractErrorKind::Unavailable));
        assert!(err.is_session_fault());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error":"the asset P999 does not exist"}"#),
            "the asset P999 does not exist"
        );
        assert_eq!(extract_error_message(r#"{"message":"denied"}"#), "denied");
        assert_eq!(extract_error_message("  plain failure \n"), "plain failure");
    }

    #[tokio::test]
    async fn test_open_session_without_identity() {
        let wallet = temp_wallet();
        let dir = wallet.dir().to_path_buf();
        let gw = gateway(PROFILE, wallet);
        match gw.open_session("Admin").await {
            Err(LedgerError::Identity(msg)) => assert!(msg.contains("Admin")),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_open_session_bad_profile() {
        let profile = PROFILE.replace("http://localhost:7080/", "grpcs://localhost:7051");
        let wallet = temp_wallet();
        let dir = wallet.dir().to_path_buf();
        let gw = gateway(&profile, wallet);
        assert!(matches!(
            gw.open_session("Admin").await.map(|_| ()),
            Err(LedgerError::Connection(_))
        ));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_open_session_unreachable_gateway() {
        let profile = PROFILE.replace("http://localhost:7080/", "http://127.0.0.1:1");
        let wallet = temp_wallet();
        let dir = wallet.dir().to_path_buf();
        wallet
            .put(
                "Admin",
                &Identity::x509("Hospital1MSP", "cert".to_string(), "key".to_string()),
            )
            .unwrap();
        let gw = gateway(&profile, wallet);
        assert!(matches!(
            gw.open_session("Admin").await.map(|_| ()),
            Err(LedgerError::Gateway(_))
        ));
        let _ = std::fs::remove_dir_all(dir);
    }
}
