use crate::AppState;
use crate::relay::LedgerRelay;
use async_trait::async_trait;
use ledger::{Contract, ContractError, LedgerError, Session, SessionFactory, SessionPool};
use serde_json::{Map, Value};
use slog::{Discard, Logger, o};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub mode: &'static str,
    pub function: String,
    pub args: Vec<String>,
}

// 写入类函数的参数布局: (资源名, ID 参数下标, 字段名)
fn write_layout(function: &str) -> Option<(&'static str, usize, &'static [&'static str])> {
    const RECORD: [&str; 9] = [
        "recordID",
        "patientID",
        "doctorID",
        "hospitalID",
        "date",
        "diagnosis",
        "treatment",
        "medications",
        "notes",
    ];
    match function {
        "CreatePatient" => Some((
            "Patient",
            2,
            &[
                "username",
                "password",
                "patientID",
                "firstName",
                "lastName",
                "dateOfBirth",
                "gender",
                "contactInfo",
            ],
        )),
        "CreateDoctor" => Some((
            "Doctor",
            2,
            &[
                "username",
                "password",
                "doctorID",
                "firstName",
                "lastName",
                "specialization",
                "contactInfo",
                "hospitalID",
            ],
        )),
        "CreateMedicalRecord" => Some(("MedicalRecord", 0, &RECORD)),
        "UpdatePatient" => Some((
            "Patient",
            0,
            &[
                "patientID",
                "firstName",
                "lastName",
                "dateOfBirth",
                "gender",
                "contactInfo",
                "username",
                "timestamp",
            ],
        )),
        "UpdateDoctor" => Some((
            "Doctor",
            0,
            &[
                "doctorID",
                "firstName",
                "lastName",
                "specialization",
                "contactInfo",
                "hospitalID",
                "username",
                "timestamp",
            ],
        )),
        "UpdateMedicalRecord" => Some((
            "MedicalRecord",
            0,
            &[
                "recordID",
                "patientID",
                "doctorID",
                "hospitalID",
                "date",
                "diagnosis",
                "treatment",
                "medications",
                "notes",
                "username",
                "timestamp",
            ],
        )),
        _ => None,
    }
}

fn copy_error(e: &LedgerError) -> LedgerError {
    match e {
        LedgerError::Connection(m) => LedgerError::Connection(m.clone()),
        LedgerError::Identity(m) => LedgerError::Identity(m.clone()),
        LedgerError::Gateway(m) => LedgerError::Gateway(m.clone()),
        LedgerError::Contract(c) => LedgerError::Contract(c.clone()),
    }
}

#[derive(Default)]
struct FakeState {
    assets: Mutex<BTreeMap<(String, String), Value>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<String, LedgerError>>,
    payloads: Mutex<HashMap<String, Vec<u8>>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl FakeState {
    fn invoke(&self, mode: &'static str, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.calls.lock().unwrap().push(Call {
            mode,
            function: function.to_string(),
            args: args.to_vec(),
        });
        if let Some(e) = self.failures.lock().unwrap().get(function) {
            return Err(copy_error(e));
        }
        if let Some(payload) = self.payloads.lock().unwrap().get(function) {
            return Ok(payload.clone());
        }
        self.pass_through(function, args)
    }

    // 模拟链码: 以 (资源, ID) 为键存取 JSON 对象
    fn pass_through(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        let mut assets = self.assets.lock().unwrap();

        if let Some((resource, id_index, fields)) = write_layout(function) {
            let object: Map<String, Value> = fields
                .iter()
                .zip(args.iter())
                .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                .collect();
            let id = args.get(id_index).cloned().unwrap_or_default();
            assets.insert((resource.to_string(), id), Value::Object(object));
            return Ok(Vec::new());
        }

        let first = args.first().cloned().unwrap_or_default();
        if function == "GetMedicalRecordsByPatientID" {
            let list: Vec<Value> = assets
                .iter()
                .filter(|((r, _), v)| r == "MedicalRecord" && v["patientID"] == first.as_str())
                .map(|(_, v)| v.clone())
                .collect();
            return Ok(serde_json::to_vec(&list).unwrap());
        }
        if let Some(resource) = function.strip_prefix("GetAll") {
            let resource = resource.trim_end_matches('s');
            let list: Vec<Value> = assets
                .iter()
                .filter(|((r, _), _)| r == resource)
                .map(|(_, v)| v.clone())
                .collect();
            return Ok(serde_json::to_vec(&list).unwrap());
        }
        if let Some(resource) = function.strip_prefix("Read") {
            return match assets.get(&(resource.to_string(), first.clone())) {
                Some(value) => Ok(serde_json::to_vec(value).unwrap()),
                None => Err(ContractError::from_chaincode_message(format!(
                    "the asset {} does not exist",
                    first
                ))
                .into()),
            };
        }
        if let Some(resource) = function.strip_suffix("Exists") {
            let exists = assets.contains_key(&(resource.to_string(), first));
            return Ok(exists.to_string().into_bytes());
        }
        if let Some(resource) = function.strip_prefix("Delete") {
            return match assets.remove(&(resource.to_string(), first.clone())) {
                Some(_) => Ok(Vec::new()),
                None => Err(ContractError::from_chaincode_message(format!(
                    "the asset {} does not exist",
                    first
                ))
                .into()),
            };
        }
        Err(ContractError::validation_failed(format!("unknown function {}", function)).into())
    }
}

/// 记录调用的内存账本, 未脚本化的函数按简单的键值语义执行
#[derive(Clone, Default)]
pub struct FakeLedger {
    state: Arc<FakeState>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, function: &str, error: LedgerError) {
        self.state
            .failures
            .lock()
            .unwrap()
            .insert(function.to_string(), error);
    }

    pub fn respond_with(&self, function: &str, payload: Vec<u8>) {
        self.state
            .payloads
            .lock()
            .unwrap()
            .insert(function.to_string(), payload);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn submits(&self, function: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c.mode == "submit" && c.function == function)
            .map(|c| c.args)
            .collect()
    }

    pub fn submit_count(&self) -> usize {
        self.calls().iter().filter(|c| c.mode == "submit").count()
    }

    pub fn opened_sessions(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed_sessions(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn relay(&self) -> LedgerRelay {
        let log = Logger::root(Discard, o!());
        let pool = SessionPool::new(
            Arc::new(FakeFactory {
                state: self.state.clone(),
            }),
            4,
            log.clone(),
        );
        LedgerRelay::new(pool, "Admin", "mychannel", "hospital", log)
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            log: Logger::root(Discard, o!()),
            relay: self.relay(),
        }
    }
}

struct FakeFactory {
    state: Arc<FakeState>,
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn open_session(&self, identity_label: &str) -> Result<Arc<dyn Session>, LedgerError> {
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeSession {
            label: identity_label.to_string(),
            closed: AtomicBool::new(false),
            state: self.state.clone(),
        }))
    }
}

struct FakeSession {
    label: String,
    closed: AtomicBool,
    state: Arc<FakeState>,
}

impl Session for FakeSession {
    fn identity_label(&self) -> &str {
        &self.label
    }

    fn contract(&self, _channel: &str, _chaincode: &str) -> Arc<dyn Contract> {
        Arc::new(FakeContract {
            state: self.state.clone(),
        })
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct FakeContract {
    state: Arc<FakeState>,
}

#[async_trait]
impl Contract for FakeContract {
    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.state.invoke("evaluate", function, args)
    }

    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        self.state.invoke("submit", function, args)
    }
}
