use crate::api_error::ApiError;
use actix_web::web;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// 请求体解析失败统一返回 400 `{"error": ...}`
pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(format!("Invalid request body: {}", err)).into())
}

lazy_static! {
    static ref ASSET_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._-]{1,64}$").unwrap();
}

fn validate_id(field: &str, value: &str) -> Result<(), String> {
    if !ASSET_ID_REGEX.is_match(value) {
        return Err(format!(
            "{} must be 1 to 64 characters of letters, digits, '.', '_' or '-'",
            field
        ));
    }
    Ok(())
}

fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

/// 链码调用参数: 校验后按声明顺序展开为位置参数
pub trait LedgerArgs {
    fn validate(&self) -> Result<(), String>;

    fn to_args(&self) -> Vec<String>;
}

/// 更新请求额外提供被检查存在性的资产 ID
pub trait LedgerUpdate: LedgerArgs {
    fn asset_id(&self) -> &str;
}

// 未提供 timestamp 时使用服务端当前时间
fn resolve_timestamp(timestamp: &Option<String>) -> String {
    match timestamp {
        Some(ts) if !ts.trim().is_empty() => ts.clone(),
        _ => chrono::Utc::now().to_rfc3339(),
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePatientRequest {
    pub username: String,
    pub password: String,
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
}

impl LedgerArgs for CreatePatientRequest {
    fn validate(&self) -> Result<(), String> {
        validate_required("username", &self.username)?;
        validate_required("password", &self.password)?;
        validate_id("patientID", &self.patient_id)
    }

    fn to_args(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.password.clone(),
            self.patient_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.date_of_birth.clone(),
            self.gender.clone(),
            self.contact_info.clone(),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDoctorRequest {
    pub username: String,
    pub password: String,
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
}

impl LedgerArgs for CreateDoctorRequest {
    fn validate(&self) -> Result<(), String> {
        validate_required("username", &self.username)?;
        validate_required("password", &self.password)?;
        validate_id("doctorID", &self.doctor_id)?;
        validate_id("hospitalID", &self.hospital_id)
    }

    fn to_args(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.password.clone(),
            self.doctor_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.specialization.clone(),
            self.contact_info.clone(),
            self.hospital_id.clone(),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecordRequest {
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

impl CreateRecordRequest {
    fn validate_ids(&self) -> Result<(), String> {
        validate_id("recordID", &self.record_id)?;
        validate_id("patientID", &self.patient_id)?;
        validate_id("doctorID", &self.doctor_id)?;
        validate_id("hospitalID", &self.hospital_id)
    }

    fn record_args(&self) -> Vec<String> {
        vec![
            self.record_id.clone(),
            self.patient_id.clone(),
            self.doctor_id.clone(),
            self.hospital_id.clone(),
            self.date.clone(),
            self.diagnosis.clone(),
            self.treatment.clone(),
            self.medications.clone(),
            self.notes.clone(),
        ]
    }
}

impl LedgerArgs for CreateRecordRequest {
    fn validate(&self) -> Result<(), String> {
        self.validate_ids()
    }

    fn to_args(&self) -> Vec<String> {
        self.record_args()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePatientRequest {
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
    pub username: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl LedgerArgs for UpdatePatientRequest {
    fn validate(&self) -> Result<(), String> {
        validate_id("patientID", &self.patient_id)?;
        validate_required("username", &self.username)
    }

    fn to_args(&self) -> Vec<String> {
        vec![
            self.patient_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.date_of_birth.clone(),
            self.gender.clone(),
            self.contact_info.clone(),
            self.username.clone(),
            resolve_timestamp(&self.timestamp),
        ]
    }
}

impl LedgerUpdate for UpdatePatientRequest {
    fn asset_id(&self) -> &str {
        &self.patient_id
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateDoctorRequest {
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
    pub username: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl LedgerArgs for UpdateDoctorRequest {
    fn validate(&self) -> Result<(), String> {
        validate_id("doctorID", &self.doctor_id)?;
        validate_id("hospitalID", &self.hospital_id)?;
        validate_required("username", &self.username)
    }

    fn to_args(&self) -> Vec<String> {
        vec![
            self.doctor_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.specialization.clone(),
            self.contact_info.clone(),
            self.hospital_id.clone(),
            self.username.clone(),
            resolve_timestamp(&self.timestamp),
        ]
    }
}

impl LedgerUpdate for UpdateDoctorRequest {
    fn asset_id(&self) -> &str {
        &self.doctor_id
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecordRequest {
    #[serde(flatten)]
    pub record: CreateRecordRequest,
    pub username: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl LedgerArgs for UpdateRecordRequest {
    fn validate(&self) -> Result<(), String> {
        self.record.validate_ids()?;
        validate_required("username", &self.username)
    }

    fn to_args(&self) -> Vec<String> {
        let mut args = self.record.record_args();
        args.push(self.username.clone());
        args.push(resolve_timestamp(&self.timestamp));
        args
    }
}

impl LedgerUpdate for UpdateRecordRequest {
    fn asset_id(&self) -> &str {
        &self.record.record_id
    }
}

/// 登录参数全部可选, 缺失时按认证失败处理
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginParams {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "userType")]
    pub user_type: Option<String>,
}
