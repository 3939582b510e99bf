use anyhow::{Context as _, Result};
use mpienv_core::{Detector, InheritedEnv, MpienvEnv, PipBinding, Registry, Settings};
use mpienv_fs::FileLock;
use mpienv_platform::SystemRunner;
use mpienv_shim::SearchPathResolver;

const DEFAULT_PYTHON: &str = "python3";

/// Everything a command needs, loaded once per invocation.
pub struct Context {
    pub env: MpienvEnv,
    pub settings: Settings,
    pub registry: Registry,
    pub binding: PipBinding,
    pub inherited: InheritedEnv,
}

impl Context {
    pub fn load() -> Result<Self> {
        let env = MpienvEnv::from_env(DEFAULT_PYTHON)?;
        let settings = Settings::load(&env.settings_file())?
            .with_env_overrides(|k| std::env::var_os(k));
        let env = if settings.python == DEFAULT_PYTHON {
            env
        } else {
            MpienvEnv::from_env(&settings.python)?
        };

        let registry = Registry::load(
            env.clone(),
            Detector::new(SystemRunner),
            SearchPathResolver::from_env(),
        )
        .with_context(|| format!("failed to load registry from {}", env.root().display()))?;
        let binding = PipBinding::new(SystemRunner, &env, &settings);

        Ok(Self {
            env,
            settings,
            registry,
            binding,
            inherited: InheritedEnv::from_process(),
        })
    }

    /// Serialize registry mutations across concurrent invocations.
    pub fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(self.env.lock_file())
            .with_context(|| format!("failed to lock {}", self.env.lock_file().display()))
    }

    /// The named installation, or the active one when `name` is `None`.
    pub fn name_or_current(&self, name: Option<String>) -> Result<String> {
        match name {
            Some(name) => Ok(name),
            None => Ok(self.registry.current_name()?),
        }
    }
}
