use crate::ehr_models::{
    CreateDoctorRequest, CreatePatientRequest, CreateRecordRequest, ErrorResponse,
    MessageResponse, UpdateDoctorRequest, UpdatePatientRequest, UpdateRecordRequest,
};
use crate::{
    auth_controller, common_controller, doctor_controller, patient_controller, query_controller,
    record_controller,
};
use common::entities::{Account, Doctor, Hospital, LogChange, MedicalRecord, Patient};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "EHR Ledger Relay", description = "Electronic health records on a permissioned ledger"),
    paths(
        common_controller::echo,
        auth_controller::login,
        query_controller::get_patients,
        query_controller::get_doctors,
        query_controller::get_hospitals,
        query_controller::get_records,
        query_controller::get_log_changes,
        query_controller::read_patient,
        query_controller::read_doctor,
        query_controller::read_hospital,
        query_controller::read_record,
        query_controller::read_records,
        patient_controller::create_patient,
        patient_controller::update_patient,
        patient_controller::delete_patient,
        doctor_controller::create_doctor,
        doctor_controller::update_doctor,
        doctor_controller::delete_doctor,
        record_controller::create_record,
        record_controller::update_record,
    ),
    components(schemas(
        Patient,
        Doctor,
        Hospital,
        MedicalRecord,
        Account,
        LogChange,
        CreatePatientRequest,
        CreateDoctorRequest,
        CreateRecordRequest,
        UpdatePatientRequest,
        UpdateDoctorRequest,
        UpdateRecordRequest,
        MessageResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;
