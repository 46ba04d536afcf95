//! Native LightRAG server launcher
//!
//! The server is started in one of two ways:
//! - `EntryPoint`: the `lightrag-server` console script installed with the package
//! - `Module`: `python -m lightrag.api.lightrag_server`
//!
//! Both receive the same argument list. The choice is made up front by
//! [`LaunchPlan::resolve`], either from configuration or by probing `PATH`,
//! so it can be inspected before anything is spawned.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::process::Command;

use crate::config::GatewayConfig;
use crate::error::{Error, Result};

/// How the LightRAG server process is started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchStrategy {
    /// Entry point if it is on PATH, otherwise the Python module
    #[default]
    Auto,
    /// Run the console entry point directly
    EntryPoint,
    /// Run the server module through the Python interpreter
    Module,
}

impl LaunchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::EntryPoint => "entry-point",
            Self::Module => "module",
        }
    }
}

impl fmt::Display for LaunchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaunchStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "entry-point" | "entry_point" | "entrypoint" => Ok(Self::EntryPoint),
            "module" => Ok(Self::Module),
            other => Err(format!(
                "unknown launch strategy '{}' (expected auto, entry-point or module)",
                other
            )),
        }
    }
}

/// Fixed command-line arguments for the LightRAG server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerArgs(Vec<String>);

impl ServerArgs {
    /// Build the argument list from bind and model settings
    pub fn from_config(config: &GatewayConfig) -> Self {
        let launch = &config.launch;
        let models = &config.models;

        let mut args = vec![
            "--host".to_string(),
            launch.host.clone(),
            "--port".to_string(),
            launch.port.to_string(),
            "--llm-binding".to_string(),
            models.llm_binding.clone(),
            "--llm-model".to_string(),
            models.llm_model.clone(),
            "--embedding-binding".to_string(),
            models.embedding_binding.clone(),
            "--embedding-model".to_string(),
            models.embedding_model.clone(),
        ];

        if launch.pass_directories {
            args.push("--working-dir".to_string());
            args.push(config.paths.working_dir.display().to_string());
            args.push("--input-dir".to_string());
            args.push(config.paths.input_dir.display().to_string());
        }

        Self(args)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Locates executables for strategy resolution
pub trait ProgramProbe: Send + Sync {
    /// Full path of `program` if it can be run
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Probe backed by a `PATH` search
#[derive(Debug, Default, Clone, Copy)]
pub struct WhichProbe;

impl ProgramProbe for WhichProbe {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Child environment that must not show up in `plan` output or logs
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretEnv(BTreeMap<String, String>);

impl SecretEnv {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl fmt::Debug for SecretEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|key| (key, "<redacted>")))
            .finish()
    }
}

/// A fully resolved launch: what will be executed, where, and with what
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    /// Resolved strategy, never `Auto`
    pub strategy: LaunchStrategy,
    /// Program to execute
    pub program: PathBuf,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Working directory of the child process
    pub current_dir: Option<PathBuf>,
    /// Extra environment for the child process
    pub envs: BTreeMap<String, String>,
    /// Credentials for the child process
    #[serde(skip)]
    pub secret_envs: SecretEnv,
}

impl LaunchPlan {
    /// Resolve `requested` into a concrete plan.
    ///
    /// An explicit strategy is used as-is. `Auto` picks the entry point when
    /// the probe finds it and falls back to the module exactly once.
    pub fn resolve(
        config: &GatewayConfig,
        requested: LaunchStrategy,
        probe: &dyn ProgramProbe,
    ) -> Result<Self> {
        let launch = &config.launch;

        let (strategy, program) = match requested {
            LaunchStrategy::EntryPoint => (
                LaunchStrategy::EntryPoint,
                probe
                    .locate(&launch.entry_point)
                    .unwrap_or_else(|| PathBuf::from(&launch.entry_point)),
            ),
            LaunchStrategy::Module => (
                LaunchStrategy::Module,
                probe
                    .locate(&launch.python)
                    .unwrap_or_else(|| PathBuf::from(&launch.python)),
            ),
            LaunchStrategy::Auto => {
                if let Some(path) = probe.locate(&launch.entry_point) {
                    (LaunchStrategy::EntryPoint, path)
                } else if let Some(path) = probe.locate(&launch.python) {
                    tracing::warn!(
                        "'{}' not found on PATH, falling back to '{} -m {}'",
                        launch.entry_point,
                        launch.python,
                        launch.module
                    );
                    (LaunchStrategy::Module, path)
                } else {
                    return Err(Error::launch(format!(
                        "neither '{}' nor '{}' was found on PATH",
                        launch.entry_point, launch.python
                    )));
                }
            }
        };

        let server_args = ServerArgs::from_config(config).into_vec();
        let args = match strategy {
            LaunchStrategy::Module => {
                let mut args = vec!["-m".to_string(), launch.module.clone()];
                args.extend(server_args);
                args
            }
            _ => server_args,
        };

        let paths = &config.paths;
        let working_dir = paths.working_dir.display().to_string();
        let log_dir = paths.log_dir.display().to_string();
        let envs = BTreeMap::from([
            ("LIGHTRAG_WORKING_DIR".to_string(), working_dir.clone()),
            ("LIGHTRAG_LOG_DIR".to_string(), log_dir.clone()),
            ("WORKING_DIR".to_string(), working_dir),
            ("INPUT_DIR".to_string(), paths.input_dir.display().to_string()),
            ("LOG_DIR".to_string(), log_dir),
        ]);

        // The child inherits our environment, but a key read from the
        // config file exists only here
        let mut secret_envs = SecretEnv::default();
        if let Some(key) = config
            .credentials
            .openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        {
            secret_envs.insert("OPENAI_API_KEY", key);
        }

        Ok(Self {
            strategy,
            program,
            args,
            current_dir: launch.server_dir.clone(),
            envs,
            secret_envs,
        })
    }

    /// Shell-style rendering for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs a resolved plan to completion
#[derive(Debug, Default, Clone, Copy)]
pub struct Launcher;

impl Launcher {
    /// Spawn the server and block until it exits.
    ///
    /// There is no retry or supervision: a spawn failure or non-zero exit is
    /// returned to the caller.
    pub async fn run(&self, plan: &LaunchPlan) -> Result<()> {
        tracing::info!("Launching LightRAG server ({})", plan.strategy);
        tracing::info!("  {}", plan.command_line());

        let mut command = Command::new(&plan.program);
        command
            .args(&plan.args)
            .envs(&plan.envs)
            .envs(plan.secret_envs.iter())
            .kill_on_drop(true);
        if let Some(dir) = &plan.current_dir {
            command.current_dir(dir);
        }

        let status = command.status().await.map_err(|e| {
            Error::launch(format!("Failed to start {}: {}", plan.program.display(), e))
        })?;

        if status.success() {
            tracing::info!("LightRAG server exited cleanly");
            Ok(())
        } else {
            Err(Error::ProcessExit {
                program: plan.program.display().to_string(),
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Probe that only knows a fixed set of programs
    struct FakeProbe(HashMap<&'static str, &'static str>);

    impl FakeProbe {
        fn with(programs: &[(&'static str, &'static str)]) -> Self {
            Self(programs.iter().copied().collect())
        }
    }

    impl ProgramProbe for FakeProbe {
        fn locate(&self, program: &str) -> Option<PathBuf> {
            self.0.get(program).map(PathBuf::from)
        }
    }

    const FIXED_ARGS: [&str; 12] = [
        "--host",
        "0.0.0.0",
        "--port",
        "9621",
        "--llm-binding",
        "openai",
        "--llm-model",
        "gpt-4o-mini",
        "--embedding-binding",
        "openai",
        "--embedding-model",
        "text-embedding-3-small",
    ];

    #[test]
    fn test_server_args_are_fixed_bind_and_models() {
        let args = ServerArgs::from_config(&GatewayConfig::default());
        assert_eq!(args.as_slice(), FIXED_ARGS);
    }

    #[test]
    fn test_server_args_with_directories() {
        let mut config = GatewayConfig::default();
        config.launch.pass_directories = true;

        let args = ServerArgs::from_config(&config).into_vec();
        assert_eq!(&args[..12], FIXED_ARGS);
        assert_eq!(
            &args[12..],
            ["--working-dir", "/app/data", "--input-dir", "/app/inputs"]
        );
    }

    #[test]
    fn test_auto_prefers_entry_point() {
        let probe = FakeProbe::with(&[
            ("lightrag-server", "/usr/local/bin/lightrag-server"),
            ("python3", "/usr/bin/python3"),
        ]);
        let plan =
            LaunchPlan::resolve(&GatewayConfig::default(), LaunchStrategy::Auto, &probe).unwrap();

        assert_eq!(plan.strategy, LaunchStrategy::EntryPoint);
        assert_eq!(plan.program, PathBuf::from("/usr/local/bin/lightrag-server"));
        assert_eq!(plan.args, FIXED_ARGS);
    }

    #[test]
    fn test_auto_falls_back_to_module() {
        let probe = FakeProbe::with(&[("python3", "/usr/bin/python3")]);
        let plan =
            LaunchPlan::resolve(&GatewayConfig::default(), LaunchStrategy::Auto, &probe).unwrap();

        assert_eq!(plan.strategy, LaunchStrategy::Module);
        assert_eq!(plan.program, PathBuf::from("/usr/bin/python3"));
        assert_eq!(&plan.args[..2], ["-m", "lightrag.api.lightrag_server"]);
        assert_eq!(&plan.args[2..], FIXED_ARGS);
    }

    #[test]
    fn test_auto_fails_without_any_program() {
        let probe = FakeProbe::with(&[]);
        let err = LaunchPlan::resolve(&GatewayConfig::default(), LaunchStrategy::Auto, &probe)
            .unwrap_err();
        assert!(matches!(err, Error::Launch(_)));
    }

    #[test]
    fn test_explicit_strategy_is_not_probed_away() {
        let probe = FakeProbe::with(&[("lightrag-server", "/usr/local/bin/lightrag-server")]);
        let plan =
            LaunchPlan::resolve(&GatewayConfig::default(), LaunchStrategy::Module, &probe).unwrap();

        assert_eq!(plan.strategy, LaunchStrategy::Module);
        assert_eq!(plan.program, PathBuf::from("python3"));
    }

    #[test]
    fn test_plan_exports_directories() {
        let mut config = GatewayConfig::default();
        config.launch.server_dir = Some(PathBuf::from("/app/lightrag"));
        let probe = FakeProbe::with(&[]);

        let plan = LaunchPlan::resolve(&config, LaunchStrategy::EntryPoint, &probe).unwrap();

        assert_eq!(plan.current_dir, Some(PathBuf::from("/app/lightrag")));
        assert_eq!(plan.envs["LIGHTRAG_WORKING_DIR"], "/app/data");
        assert_eq!(plan.envs["LIGHTRAG_LOG_DIR"], "/app/logs");
        assert!(plan.command_line().starts_with("lightrag-server --host 0.0.0.0"));
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("auto".parse::<LaunchStrategy>(), Ok(LaunchStrategy::Auto));
        assert_eq!(
            "Entry-Point".parse::<LaunchStrategy>(),
            Ok(LaunchStrategy::EntryPoint)
        );
        assert_eq!("module".parse::<LaunchStrategy>(), Ok(LaunchStrategy::Module));
        assert!("subprocess".parse::<LaunchStrategy>().is_err());
        assert_eq!(LaunchStrategy::EntryPoint.to_string(), "entry-point");
    }

    fn plan_for(program: &str) -> LaunchPlan {
        LaunchPlan {
            strategy: LaunchStrategy::EntryPoint,
            program: PathBuf::from(program),
            args: Vec::new(),
            current_dir: None,
            envs: BTreeMap::new(),
            secret_envs: SecretEnv::default(),
        }
    }

    fn config_with_file_key(dir: &TempDir) -> GatewayConfig {
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[credentials]\nopenai_api_key = \"sk-from-file\"\n").unwrap();
        let config = GatewayConfig::from_file(&path).unwrap();
        assert!(config.credentials.has_llm_key());
        config
    }

    #[test]
    fn test_file_credential_is_exported_but_not_printed() {
        let dir = TempDir::new().unwrap();
        let config = config_with_file_key(&dir);

        let plan =
            LaunchPlan::resolve(&config, LaunchStrategy::EntryPoint, &FakeProbe::with(&[])).unwrap();

        assert_eq!(plan.secret_envs.get("OPENAI_API_KEY"), Some("sk-from-file"));
        assert!(!plan.envs.contains_key("OPENAI_API_KEY"));
        let json = serde_json::to_string(&plan).unwrap();
        assert!(!json.contains("sk-from-file"));
        assert!(!json.contains("secret_envs"));
        let debug = format!("{:?}", plan);
        assert!(!debug.contains("sk-from-file"));
        assert!(debug.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_missing_credential_exports_nothing() {
        let plan = LaunchPlan::resolve(
            &GatewayConfig::default(),
            LaunchStrategy::EntryPoint,
            &FakeProbe::with(&[]),
        )
        .unwrap();
        assert_eq!(plan.secret_envs.get("OPENAI_API_KEY"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_credential_reaches_child() {
        let dir = TempDir::new().unwrap();
        let config = config_with_file_key(&dir);
        let mut plan =
            LaunchPlan::resolve(&config, LaunchStrategy::EntryPoint, &FakeProbe::with(&[])).unwrap();
        plan.program = PathBuf::from("sh");
        plan.args = vec![
            "-c".to_string(),
            "test \"$OPENAI_API_KEY\" = sk-from-file".to_string(),
        ];

        Launcher.run(&plan).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_success() {
        Launcher.run(&plan_for("true")).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_propagates_non_zero_exit() {
        let err = Launcher.run(&plan_for("false")).await.unwrap_err();
        assert!(matches!(err, Error::ProcessExit { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_run_reports_missing_program() {
        let err = Launcher
            .run(&plan_for("definitely-not-a-lightrag-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Launch(_)));
    }
}
