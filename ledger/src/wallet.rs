use crate::ledger_error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

static IDENTITY_FILE_EXT: &str = "id";
static X509_TYPE: &str = "X.509";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub certificate: String,
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

// 私钥不输出到日志
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("certificate", &self.certificate)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// 与 fabric-network 钱包文件格式一致的 X.509 身份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub credentials: Credentials,
    #[serde(rename = "mspId")]
    pub msp_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub version: u32,
}

impl Identity {
    pub fn x509(msp_id: &str, certificate: String, private_key: String) -> Self {
        Identity {
            credentials: Credentials {
                certificate,
                private_key,
            },
            msp_id: msp_id.to_string(),
            type_: X509_TYPE.to_string(),
            version: 1,
        }
    }
}

/// 文件系统钱包: 每个身份一个 `{label}.id` 文件
#[derive(Debug, Clone)]
pub struct FileSystemWallet {
    dir: PathBuf,
}

impl FileSystemWallet {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, LedgerError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            LedgerError::Identity(format!("cannot open wallet {}: {}", dir.display(), e))
        })?;
        Ok(FileSystemWallet { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn identity_path(&self, label: &str) -> Result<PathBuf, LedgerError> {
        if label.is_empty()
            || label.contains('/')
            || label.contains('\\')
            || label.starts_with('.')
        {
            return Err(LedgerError::Identity(format!(
                "invalid identity label: {:?}",
                label
            )));
        }
        Ok(self.dir.join(format!("{}.{}", label, IDENTITY_FILE_EXT)))
    }

    pub fn get(&self, label: &str) -> Result<Option<Identity>, LedgerError> {
        let path = self.identity_path(label)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            LedgerError::Identity(format!("cannot read identity {}: {}", label, e))
        })?;
        let identity = serde_json::from_str(&content).map_err(|e| {
            LedgerError::Identity(format!("corrupt identity {}: {}", label, e))
        })?;
        Ok(Some(identity))
    }

    pub fn put(&self, label: &str, identity: &Identity) -> Result<(), LedgerError> {
        let path = self.identity_path(label)?;
        let content = serde_json::to_string(identity).map_err(|e| {
            LedgerError::Identity(format!("cannot serialize identity {}: {}", label, e))
        })?;
        fs::write(&path, content).map_err(|e| {
            LedgerError::Identity(format!("cannot write identity {}: {}", label, e))
        })
    }

    pub fn remove(&self, label: &str) -> Result<(), LedgerError> {
        let path = self.identity_path(label)?;
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                LedgerError::Identity(format!("cannot remove identity {}: {}", label, e))
            })?;
        }
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<String>, LedgerError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| LedgerError::Identity(format!("cannot list wallet: {}", e)))?;
        let mut labels: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case(IDENTITY_FILE_EXT))
            })
            .filter_map(|path| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .collect();
        labels.sort();
        Ok(labels)
    }
}
