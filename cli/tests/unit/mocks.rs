//! Shared mock infrastructure for unit tests.
//!
//! Every mock records the calls it receives so tests can assert on ordering
//! and on what was (or was not) sent to the remote side.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;
use std::time::Duration;

use agentcore_cli::application::ports::{
    CommandRunner, ContainerRegistry, ControlPlane, CreateOutcome, DescriptorStore, LocalFs,
    ProgressReporter, RegistryLogin, StatusSource,
};
use agentcore_cli::domain::config::parse_config;
use agentcore_cli::domain::deployment::RuntimeRequest;
use agentcore_cli::domain::{
    AgentStatus, AuthorizerConfig, CognitoTestConfig, ContainerSource, DeploymentConfig,
    DeploymentStatus, EndpointStatus, Protocol, RuntimeDescriptor, RuntimeRecord, RuntimeStatus,
};
use anyhow::Result;

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const CONFIG_JSON: &str = r#"{
    "user_pool": {"user_pool_id": "us-east-1_AbC123"},
    "app_client": {"client_id": "abc123"},
    "region": "us-east-1",
    "test_user": {"username": "tester"},
    "discovery_url": "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_AbC123/.well-known/openid-configuration"
}"#;

pub fn sample_config() -> CognitoTestConfig {
    parse_config("fixture", CONFIG_JSON).expect("fixture config")
}

pub fn deployment(name: &str, container: ContainerSource) -> DeploymentConfig {
    DeploymentConfig {
        agent_name: name.to_string(),
        entrypoint: PathBuf::from("agent/main.py"),
        requirements: None,
        region: "us-east-1".to_string(),
        protocol: Protocol::Http,
        execution_role_arn: "arn:aws:iam::123456789012:role/AgentRuntimeRole".to_string(),
        container,
        authorizer: AuthorizerConfig::Jwt {
            allowed_clients: BTreeSet::from(["abc123".to_string()]),
            discovery_url: "https://x/.well-known/openid_configuration".to_string(),
        },
        environment: BTreeMap::new(),
    }
}

pub fn image_source() -> ContainerSource {
    ContainerSource::Image {
        uri: "123456789012.dkr.ecr.us-east-1.amazonaws.com/agent:v1".to_string(),
    }
}

pub fn record(id: &str) -> RuntimeRecord {
    RuntimeRecord {
        runtime_id: id.to_string(),
        runtime_arn: format!("arn:aws:bedrock-agentcore:us-east-1:123456789012:runtime/{id}"),
        version: Some("1".to_string()),
    }
}

pub fn status(agent: RuntimeStatus, endpoint: RuntimeStatus) -> DeploymentStatus {
    DeploymentStatus {
        agent: AgentStatus {
            status: agent,
            arn: None,
        },
        endpoint: EndpointStatus {
            status: endpoint,
            url: None,
            arn: None,
        },
    }
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: ExitStatus::from_raw(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(stderr: &[u8]) -> Output {
    Output {
        status: ExitStatus::from_raw(1 << 8),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Descriptor store ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryDescriptorStore {
    pub descriptor: Mutex<RuntimeDescriptor>,
    pub saves: Mutex<usize>,
}

impl MemoryDescriptorStore {
    pub fn with(descriptor: RuntimeDescriptor) -> Self {
        Self {
            descriptor: Mutex::new(descriptor),
            saves: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> RuntimeDescriptor {
        self.descriptor.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl DescriptorStore for MemoryDescriptorStore {
    fn load(&self) -> Result<RuntimeDescriptor> {
        Ok(self.snapshot())
    }
    fn save(&self, descriptor: &RuntimeDescriptor) -> Result<()> {
        *self.descriptor.lock().unwrap() = descriptor.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
    fn path(&self) -> PathBuf {
        PathBuf::from(".agentcore.yaml")
    }
}

// ── Local filesystem ─────────────────────────────────────────────────────────

pub struct FakeFs {
    pub files: BTreeSet<PathBuf>,
    pub written: Mutex<BTreeMap<PathBuf, String>>,
}

impl FakeFs {
    pub fn with(paths: &[&str]) -> Self {
        Self {
            files: paths.iter().map(PathBuf::from).collect(),
            written: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn written(&self, path: &str) -> Option<String> {
        self.written.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl LocalFs for FakeFs {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path) || self.written.lock().unwrap().contains_key(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        self.written
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}

// ── Control plane ────────────────────────────────────────────────────────────

pub struct MockControlPlane {
    pub create: Mutex<Option<Result<CreateOutcome>>>,
    pub existing: Option<RuntimeRecord>,
    pub calls: Mutex<Vec<String>>,
}

impl MockControlPlane {
    pub fn creating(record: RuntimeRecord) -> Self {
        Self::with_create(Ok(CreateOutcome::Created(record)))
    }

    pub fn conflicting(existing: Option<RuntimeRecord>) -> Self {
        Self {
            existing,
            ..Self::with_create(Ok(CreateOutcome::Conflict("already exists".to_string())))
        }
    }

    pub fn with_create(outcome: Result<CreateOutcome>) -> Self {
        Self {
            create: Mutex::new(Some(outcome)),
            existing: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ControlPlane for MockControlPlane {
    async fn create_runtime(&self, request: &RuntimeRequest) -> Result<CreateOutcome> {
        self.log(format!("create:{}", request.name));
        self.create
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(anyhow::anyhow!("create called twice")))
    }

    async fn update_runtime(&self, runtime_id: &str, _: &RuntimeRequest) -> Result<RuntimeRecord> {
        self.log(format!("update:{runtime_id}"));
        let mut rec = record(runtime_id);
        rec.version = Some("2".to_string());
        Ok(rec)
    }

    async fn find_runtime(&self, name: &str) -> Result<Option<RuntimeRecord>> {
        self.log(format!("find:{name}"));
        Ok(self.existing.clone())
    }

    async fn get_runtime(&self, runtime_id: &str) -> Result<AgentStatus> {
        self.log(format!("get_runtime:{runtime_id}"));
        Ok(AgentStatus {
            status: RuntimeStatus::Ready,
            arn: None,
        })
    }

    async fn get_endpoint(&self, runtime_id: &str, name: &str) -> Result<EndpointStatus> {
        self.log(format!("get_endpoint:{runtime_id}/{name}"));
        Ok(EndpointStatus {
            status: RuntimeStatus::Ready,
            url: None,
            arn: None,
        })
    }

    fn data_plane_base(&self) -> String {
        "https://data.example.test".to_string()
    }
}

// ── Container registry ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRegistry {
    pub reject: bool,
    pub missing: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockRegistry {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn uri(name: &str) -> String {
        format!("123456789012.dkr.ecr.us-east-1.amazonaws.com/{name}")
    }
}

impl ContainerRegistry for MockRegistry {
    async fn ensure_repository(&self, name: &str) -> Result<String> {
        self.calls.lock().unwrap().push(format!("ensure:{name}"));
        if self.reject {
            anyhow::bail!("AccessDeniedException: not authorized");
        }
        Ok(Self::uri(name))
    }

    async fn describe_repository(&self, name: &str) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(format!("describe:{name}"));
        if self.reject {
            anyhow::bail!("AccessDeniedException: not authorized");
        }
        Ok((!self.missing).then(|| Self::uri(name)))
    }

    async fn login(&self) -> Result<RegistryLogin> {
        self.calls.lock().unwrap().push("login".to_string());
        Ok(RegistryLogin {
            username: "AWS".to_string(),
            password: "token".to_string(),
            endpoint: "https://123456789012.dkr.ecr.us-east-1.amazonaws.com".to_string(),
        })
    }
}

// ── Command runner ───────────────────────────────────────────────────────────

/// Records every invocation; fails the first command whose args start with
/// `fail_on` (e.g. `"build"`).
#[derive(Default)]
pub struct RecordingRunner {
    pub fail_on: Option<&'static str>,
    pub calls: Mutex<Vec<String>>,
    pub stdin: Mutex<Vec<Vec<u8>>>,
}

impl RecordingRunner {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> Output {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{program} {}", args.join(" ")));
        match self.fail_on {
            Some(sub) if args.first() == Some(&sub) => err_output(b"no space left on device"),
            _ => ok_output(b""),
        }
    }
}

impl CommandRunner for RecordingRunner {
    async fn run_with_timeout(&self, program: &str, args: &[&str], _: Duration) -> Result<Output> {
        Ok(self.record(program, args))
    }
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output> {
        self.stdin.lock().unwrap().push(stdin.to_vec());
        Ok(self.record(program, args))
    }
}

// ── Status source ────────────────────────────────────────────────────────────

/// Replays scripted snapshots; the last entry repeats forever.
pub struct ScriptedStatus {
    pub script: RefCell<VecDeque<Option<DeploymentStatus>>>,
    pub fetches: RefCell<usize>,
}

impl ScriptedStatus {
    /// `None` entries make the fetch fail.
    pub fn new(script: Vec<Option<DeploymentStatus>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            fetches: RefCell::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.borrow()
    }
}

impl StatusSource for ScriptedStatus {
    async fn fetch_status(&self, _: &RuntimeRecord) -> Result<DeploymentStatus> {
        *self.fetches.borrow_mut() += 1;
        let mut script = self.script.borrow_mut();
        let next = if script.len() > 1 {
            script.pop_front().flatten()
        } else {
            script.front().cloned().flatten()
        };
        next.ok_or_else(|| anyhow::anyhow!("control plane unavailable"))
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().unwrap().push(format!("step:{message}"));
    }
    fn success(&self, message: &str) {
        self.events.lock().unwrap().push(format!("ok:{message}"));
    }
    fn warn(&self, message: &str) {
        self.events.lock().unwrap().push(format!("warn:{message}"));
    }
}
