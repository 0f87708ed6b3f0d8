pub(crate) const API_CONTEXT_PATH: &str = "/api";
pub(crate) const AUTH_TAG: &str = "AUTH";
pub(crate) const QUERY_TAG: &str = "LEDGER-QUERY";
pub(crate) const PATIENT_TAG: &str = "PATIENT";
pub(crate) const DOCTOR_TAG: &str = "DOCTOR";
pub(crate) const RECORD_TAG: &str = "MEDICAL-RECORD";
