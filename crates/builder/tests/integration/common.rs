//! Fixtures and fake backends shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use webdist_builder::{
    BuildContext, BuildContextBuilder, CatalogTool, ExtractSummary, ExtractionMapping,
    InitOutcome, NativeCatalogTool,
};
use webdist_config::Config;
use webdist_errors::{BuildError, Error, PlatformError};
use webdist_events::{channel, AppEvent, EventReceiver, EventSender, StageEvent};
use webdist_manifest::assemble_metadata;
use webdist_platform::{CommandOutput, PlatformCommand, PlatformContext, ProcessOperations};

/// Every external call, process or catalog, in the order it happened
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub const DEV_INSTALL: &str = "npm install --only=dev";
pub const GRUNT_BUILD: &str = "node node_modules/grunt-cli/bin/grunt build";
pub const PRODUCTION_INSTALL: &str = "npm install --production";

#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Exit(i32),
    Signal,
    SpawnFailure,
}

/// Process backend that records command lines and never spawns anything
pub struct FakeProcess {
    log: CallLog,
    outcomes: HashMap<String, Outcome>,
    program_outcomes: HashMap<String, Outcome>,
}

impl FakeProcess {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            outcomes: HashMap::new(),
            program_outcomes: HashMap::new(),
        }
    }

    /// Outcome for every invocation of `program`, whatever the arguments
    pub fn with_program_outcome(mut self, program: &str, outcome: Outcome) -> Self {
        self.program_outcomes.insert(program.to_string(), outcome);
        self
    }

    pub fn with_outcome(mut self, command_line: &str, outcome: Outcome) -> Self {
        self.outcomes.insert(command_line.to_string(), outcome);
        self
    }
}

#[async_trait]
impl ProcessOperations for FakeProcess {
    async fn execute_command(
        &self,
        _ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, PlatformError> {
        let line = cmd.to_string();
        self.log.lock().unwrap().push(line.clone());
        let outcome = self
            .outcomes
            .get(&line)
            .or_else(|| self.program_outcomes.get(cmd.program()))
            .copied()
            .unwrap_or(Outcome::Exit(0));
        match outcome {
            Outcome::Exit(code) => Ok(CommandOutput {
                code: Some(code),
                stdout: Vec::new(),
                stderr: b"fake failure".to_vec(),
            }),
            Outcome::Signal => Ok(CommandOutput {
                code: None,
                stdout: Vec::new(),
                stderr: Vec::new(),
            }),
            Outcome::SpawnFailure => Err(PlatformError::ProcessSpawnFailed {
                command: line,
                message: "No such file or directory".to_string(),
            }),
        }
    }
}

/// Catalog backend that records calls and can fail one step
pub struct FakeCatalog {
    log: CallLog,
    fail_at: Option<&'static str>,
}

impl FakeCatalog {
    fn record(&self, call: String) -> Result<(), Error> {
        let step = call.split_whitespace().nth(1).unwrap_or_default().to_string();
        self.log.lock().unwrap().push(call);
        if self.fail_at == Some(step.as_str()) {
            return Err(Error::internal(format!("fake {step} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogTool for FakeCatalog {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract(
        &self,
        ctx: &BuildContext,
        _mapping: &ExtractionMapping,
    ) -> Result<ExtractSummary, Error> {
        self.record("catalog extract".to_string())?;
        Ok(ExtractSummary {
            template: ctx.config().template_path(ctx.root()),
            messages: 2,
        })
    }

    async fn init(&self, ctx: &BuildContext, locale: &str) -> Result<InitOutcome, Error> {
        self.record(format!("catalog init {locale}"))?;
        Ok(InitOutcome::Created(ctx.config().catalog_path(ctx.root(), locale)))
    }

    async fn compile(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>, Error> {
        self.record("catalog compile".to_string())?;
        Ok(vec![ctx
            .config()
            .catalog_path(ctx.root(), "en")
            .with_extension("mo")])
    }
}

pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// A temporary project laid out like the pyLoad webui checkout
pub struct Harness {
    pub temp: TempDir,
    pub log: CallLog,
    tx: EventSender,
    rx: EventReceiver,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_files(&[
            ("VERSION", "0.1.0\n"),
            ("requirements/install.txt", "six\n\nrequests>=2\n"),
            ("requirements/setup.txt", ""),
            ("README.md", "pyLoad webui\n============\n"),
            ("CHANGELOG.md", "0.1.0\n- initial\n"),
            ("pyload/__init__.py", "TITLE = _(\"Hello\")\n"),
            (
                "pyload/webui/server/api.py",
                "def f(n):\n    return ngettext(\"%d file\", \"%d files\", n)\n",
            ),
            (
                "pyload/webui/app/scripts/main.js",
                "var label = gettext('Save');\n",
            ),
            ("pyload/webui/node_modules/grunt/index.js", "x"),
        ])
    }

    /// Smallest packable project: no setup requirements, no web interface
    pub fn minimal() -> Self {
        Self::with_files(&[
            ("VERSION", "0.1.0"),
            ("requirements/install.txt", "six\n"),
            ("pyload/__init__.py", "TITLE = _(\"Hello\")\n"),
        ])
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().unwrap();
        for (rel, content) in files {
            write(temp.path(), rel, content);
        }

        let (tx, rx) = channel();
        Self {
            temp,
            log: Arc::new(Mutex::new(Vec::new())),
            tx,
            rx,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn process(&self) -> FakeProcess {
        FakeProcess::new(self.log.clone())
    }

    pub fn fake_catalog(&self, fail_at: Option<&'static str>) -> Arc<dyn CatalogTool> {
        Arc::new(FakeCatalog {
            log: self.log.clone(),
            fail_at,
        })
    }

    pub fn native_catalog(&self) -> Arc<dyn CatalogTool> {
        Arc::new(NativeCatalogTool::new())
    }

    pub async fn context(&self, process: FakeProcess, catalog: Arc<dyn CatalogTool>) -> BuildContext {
        self.context_with_config(process, catalog, Config::default())
            .await
    }

    pub async fn context_with_config(
        &self,
        process: FakeProcess,
        catalog: Arc<dyn CatalogTool>,
        config: Config,
    ) -> BuildContext {
        let metadata = assemble_metadata(&config, self.root()).await.unwrap();
        BuildContextBuilder::new()
            .with_root(self.root())
            .with_config(config)
            .with_metadata(metadata)
            .with_process_ops(Arc::new(process))
            .with_catalog_tool(catalog)
            .with_event_sender(self.tx.clone())
            .build()
            .unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn drain_events(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// `(kind, stage)` pairs for the stage lifecycle events
pub fn stage_trace(events: &[AppEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            AppEvent::Stage(StageEvent::Started { stage }) => {
                Some(("started".to_string(), stage.clone()))
            }
            AppEvent::Stage(StageEvent::Completed { stage, .. }) => {
                Some(("completed".to_string(), stage.clone()))
            }
            AppEvent::Stage(StageEvent::Failed { stage, .. }) => {
                Some(("failed".to_string(), stage.clone()))
            }
            _ => None,
        })
        .collect()
}

pub fn build_error(err: &Error) -> &BuildError {
    err.as_build()
        .unwrap_or_else(|| panic!("expected a build error, got {err:?}"))
}
