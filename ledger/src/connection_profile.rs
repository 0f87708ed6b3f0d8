use crate::ledger_error::LedgerError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// Fabric connection profile 的子集, 只保留网关与 CA 需要的字段

#[derive(Debug, Clone, Deserialize)]
pub struct TlsCaCerts {
    pub pem: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeerProfile {
    pub url: String,
    #[serde(rename = "tlsCACerts")]
    pub tls_ca_certs: Option<TlsCaCerts>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpOptions {
    #[serde(default = "default_verify")]
    pub verify: bool,
}

fn default_verify() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CertificateAuthorityProfile {
    pub url: String,
    #[serde(rename = "caName")]
    pub ca_name: String,
    #[serde(rename = "tlsCACerts")]
    pub tls_ca_certs: Option<TlsCaCerts>,
    #[serde(rename = "httpOptions")]
    pub http_options: Option<HttpOptions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationProfile {
    pub mspid: String,
    #[serde(default)]
    pub peers: Vec<String>,
    #[serde(rename = "certificateAuthorities", default)]
    pub certificate_authorities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    pub organization: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    pub client: ClientSection,
    pub organizations: HashMap<String, OrganizationProfile>,
    #[serde(default)]
    pub peers: HashMap<String, PeerProfile>,
    #[serde(rename = "certificateAuthorities", default)]
    pub certificate_authorities: HashMap<String, CertificateAuthorityProfile>,
}

/// 解析后的网关地址
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEndpoint {
    pub peer_name: String,
    pub url: String,
    pub tls_ca_pem: Option<String>,
}

impl ConnectionProfile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LedgerError::Connection(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(content)
            .map_err(|e| LedgerError::Connection(format!("invalid connection profile: {}", e)))
    }

    pub fn client_organization(&self) -> Result<&OrganizationProfile, LedgerError> {
        self.organizations
            .get(&self.client.organization)
            .ok_or_else(|| {
                LedgerError::Connection(format!(
                    "organization {} is not defined in profile {}",
                    self.client.organization, self.name
                ))
            })
    }

    /// 客户端组织的第一个 peer 作为网关入口, 只接受 http/https
    pub fn gateway_endpoint(&self) -> Result<GatewayEndpoint, LedgerError> {
        let org = self.client_organization()?;
        let peer_name = org.peers.first().ok_or_else(|| {
            LedgerError::Connection(format!(
                "organization {} has no peers",
                self.client.organization
            ))
        })?;
        let peer = self.peers.get(peer_name).ok_or_else(|| {
            LedgerError::Connection(format!("peer {} is not defined in profile", peer_name))
        })?;
        if !(peer.url.starts_with("http://") || peer.url.starts_with("https://")) {
            return Err(LedgerError::Connection(format!(
                "peer {} url must be http(s): {}",
                peer_name, peer.url
            )));
        }
        Ok(GatewayEndpoint {
            peer_name: peer_name.clone(),
            url: peer.url.trim_end_matches('/').to_string(),
            tls_ca_pem: peer.tls_ca_certs.as_ref().and_then(|t| t.pem.clone()),
        })
    }

    pub fn certificate_authority(
        &self,
        ca_host_name: &str,
    ) -> Result<&CertificateAuthorityProfile, LedgerError> {
        self.certificate_authorities
            .get(ca_host_name)
            .ok_or_else(|| {
                LedgerError::Connection(format!(
                    "certificate authority {} is not defined in profile",
                    ca_host_name
                ))
            })
    }
}
