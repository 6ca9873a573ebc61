use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cli::Args;
use crate::core::catalog::ModelCatalog;
use crate::core::config::{Config, ConfigError};
use crate::core::inference::{
    InferenceGateway, MissingCredential, WorkersAiCredentials, WorkersAiGateway, BASE_URL_ENV,
};
use crate::core::persistence::{PersistenceError, PersistenceGateway, SqliteSessionStore};
use crate::core::session::{SessionController, SessionOptions, Viewport};
use crate::ui::chat_loop::ChatContext;
use crate::ui::theme::Theme;
use crate::utils::logging::DebugSink;

/// Anything that prevents the chat screen from starting.
#[derive(Debug)]
pub enum StartupError {
    Config(ConfigError),
    UnknownModel(String),
    UnknownTheme(String),
    Credentials(MissingCredential),
    HttpClient(reqwest::Error),
    Storage(PersistenceError),
    DebugLog(io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Config(e) => write!(f, "{e}"),
            StartupError::UnknownModel(name) => write!(
                f,
                "Unknown model '{name}'. Run 'chatbox models' to see the available models."
            ),
            StartupError::UnknownTheme(name) => {
                write!(f, "Unknown theme '{name}'. Available themes: dark, light")
            }
            StartupError::Credentials(e) => write!(f, "{e}"),
            StartupError::HttpClient(e) => write!(f, "Failed to create HTTP client: {e}"),
            StartupError::Storage(e) => write!(f, "{e}"),
            StartupError::DebugLog(e) => write!(f, "Failed to open debug event log: {e}"),
        }
    }
}

impl StdError for StartupError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StartupError::Config(e) => Some(e),
            StartupError::Credentials(e) => Some(e),
            StartupError::HttpClient(e) => Some(e),
            StartupError::Storage(e) => Some(e),
            StartupError::DebugLog(e) => Some(e),
            StartupError::UnknownModel(_) | StartupError::UnknownTheme(_) => None,
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        StartupError::Config(e)
    }
}

impl From<MissingCredential> for StartupError {
    fn from(e: MissingCredential) -> Self {
        StartupError::Credentials(e)
    }
}

impl From<PersistenceError> for StartupError {
    fn from(e: PersistenceError) -> Self {
        StartupError::Storage(e)
    }
}

/// Effective settings after layering flags over the config file over
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct StartupSettings {
    pub model: String,
    pub theme: Theme,
    /// `None` when saving is disabled.
    pub database: Option<PathBuf>,
    pub input_char_limit: usize,
    pub request_timeout: Duration,
    pub api_base_url: Option<String>,
}

impl StartupSettings {
    /// `base_url_env` is the value of `CLOUDFLARE_API_BASE_URL`, which wins
    /// over the config file.
    pub fn resolve(
        args: &Args,
        config: &Config,
        catalog: &ModelCatalog,
        base_url_env: Option<String>,
    ) -> Result<Self, StartupError> {
        let model = match args.model.as_deref().or(config.default_model.as_deref()) {
            Some(name) => catalog
                .resolve(name)
                .ok_or_else(|| StartupError::UnknownModel(name.to_string()))?,
            None => catalog.default_model(),
        };

        let theme_name = args.theme.as_deref().or(config.theme.as_deref());
        let theme = match theme_name {
            Some(name) => {
                Theme::from_name(name).ok_or_else(|| StartupError::UnknownTheme(name.to_string()))?
            }
            None => Theme::default(),
        };

        let database = if args.no_save {
            None
        } else {
            Some(args.database.clone().unwrap_or_else(|| config.database_path()))
        };

        let api_base_url = base_url_env
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .or_else(|| config.api_base_url.clone());

        Ok(Self {
            model: model.identifier.to_string(),
            theme,
            database,
            input_char_limit: config.input_char_limit(),
            request_timeout: config.request_timeout(),
            api_base_url,
        })
    }
}

pub async fn prepare_chat(args: &Args) -> Result<ChatContext, StartupError> {
    let catalog = ModelCatalog::builtin();
    let config = Config::load()?;
    let settings =
        StartupSettings::resolve(args, &config, &catalog, std::env::var(BASE_URL_ENV).ok())?;

    let credentials = WorkersAiCredentials::from_env()?;
    let gateway = WorkersAiGateway::new(
        credentials,
        settings.api_base_url.clone(),
        settings.request_timeout,
    )
    .map_err(StartupError::HttpClient)?;
    let inference: Arc<dyn InferenceGateway> = Arc::new(gateway);

    let persistence: Option<Arc<dyn PersistenceGateway>> = match &settings.database {
        Some(path) => {
            let store = SqliteSessionStore::open(path).await?;
            info!(path = %path.display(), "session store opened");
            Some(Arc::new(store))
        }
        None => None,
    };

    let debug_sink = DebugSink::from_env().map_err(StartupError::DebugLog)?;

    let session = SessionController::new(
        catalog,
        SessionOptions {
            initial_model: Some(settings.model),
            input_char_limit: settings.input_char_limit,
            persistence_enabled: persistence.is_some(),
            viewport: Viewport::default(),
        },
    );

    Ok(ChatContext {
        session,
        theme: settings.theme,
        inference,
        persistence,
        debug_sink,
    })
}
