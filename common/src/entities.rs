use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// 以下实体均由链码持有, 本服务只做透传; 字段名与链码 JSON 保持一致.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    #[serde(rename = "patientID")]
    pub patient_id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: String,
    pub gender: String,
    #[serde(rename = "contactInfo")]
    pub contact_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub credentials: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Doctor {
    #[serde(rename = "doctorID")]
    pub doctor_id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub specialization: String,
    #[serde(rename = "contactInfo")]
    pub contact_info: String,
    #[serde(rename = "hospitalID")]
    pub hospital_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub credentials: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Hospital {
    #[serde(rename = "hospitalID")]
    pub hospital_id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "contactInfo", default)]
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicalRecord {
    #[serde(rename = "recordID")]
    pub record_id: String,
    #[serde(rename = "patientID")]
    pub patient_id: String,
    #[serde(rename = "doctorID")]
    pub doctor_id: String,
    #[serde(rename = "hospitalID")]
    pub hospital_id: String,
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub medications: String,
    pub notes: String,
}

/// 登录账户, 仅用于 AuthenticateUser 的返回值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "userType", alias = "UserType")]
    pub user_type: String,
}

/// 审计日志, 由链码在每次变更时写入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LogChange {
    #[serde(rename = "logID", default)]
    pub log_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(rename = "assetID", default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}
