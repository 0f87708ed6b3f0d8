use crate::ledger_error::LedgerError;
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, EcKey};
use openssl::ecdsa::EcdsaSig;
use openssl::error::ErrorStack;
use openssl::hash::{MessageDigest, hash};
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::{X509NameBuilder, X509ReqBuilder};
use std::cmp::Ordering;

fn crypto_err(e: ErrorStack) -> LedgerError {
    LedgerError::Identity(format!("crypto error: {}", e))
}

/// 生成 P-256 私钥 (Fabric CA 默认曲线)
pub fn generate_key() -> Result<PKey<Private>, LedgerError> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).map_err(crypto_err)?;
    let ec_key = EcKey::generate(&group).map_err(crypto_err)?;
    PKey::from_ec_key(ec_key).map_err(crypto_err)
}

pub fn private_key_to_pem(key: &PKey<Private>) -> Result<String, LedgerError> {
    let pem = key.private_key_to_pem_pkcs8().map_err(crypto_err)?;
    String::from_utf8(pem).map_err(|e| LedgerError::Identity(e.to_string()))
}

/// 生成 CSR, subject 只含 CN
pub fn create_csr(key: &PKey<Private>, common_name: &str) -> Result<String, LedgerError> {
    let mut name = X509NameBuilder::new().map_err(crypto_err)?;
    name.append_entry_by_nid(Nid::COMMONNAME, common_name)
        .map_err(crypto_err)?;
    let name = name.build();

    let mut req = X509ReqBuilder::new().map_err(crypto_err)?;
    req.set_subject_name(&name).map_err(crypto_err)?;
    req.set_pubkey(key).map_err(crypto_err)?;
    req.sign(key, MessageDigest::sha256()).map_err(crypto_err)?;

    let pem = req.build().to_pem().map_err(crypto_err)?;
    String::from_utf8(pem).map_err(|e| LedgerError::Identity(e.to_string()))
}

/// ECDSA-SHA256 签名, 输出 DER; s 规范化到低半区 (Fabric 拒绝 high-S 签名)
pub fn sign_low_s(private_key_pem: &str, data: &[u8]) -> Result<Vec<u8>, LedgerError> {
    let pkey = PKey::private_key_from_pem(private_key_pem.as_bytes()).map_err(crypto_err)?;
    let ec_key = pkey.ec_key().map_err(crypto_err)?;
    let digest = hash(MessageDigest::sha256(), data).map_err(crypto_err)?;
    let sig = EcdsaSig::sign(&digest, &ec_key).map_err(crypto_err)?;

    let mut ctx = BigNumContext::new().map_err(crypto_err)?;
    let mut order = BigNum::new().map_err(crypto_err)?;
    ec_key
        .group()
        .order(&mut order, &mut ctx)
        .map_err(crypto_err)?;
    let mut half_order = BigNum::new().map_err(crypto_err)?;
    half_order.rshift1(&order).map_err(crypto_err)?;

    let r = sig.r().to_owned().map_err(crypto_err)?;
    let mut s = sig.s().to_owned().map_err(crypto_err)?;
    if s.ucmp(&half_order) == Ordering::Greater {
        let mut low_s = BigNum::new().map_err(crypto_err)?;
        low_s.checked_sub(&order, &s).map_err(crypto_err)?;
        s = low_s;
    }

    let sig = EcdsaSig::from_private_components(r, s).map_err(crypto_err)?;
    sig.to_der().map_err(crypto_err)
}
