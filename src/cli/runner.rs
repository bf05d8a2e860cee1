//! CLI runner - executes commands

use crate::auth::Authenticator;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{config_spec, Catalog, TapConfig};
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, RequestExecutor};
use crate::output::JsonLinesWriter;
use crate::partition::{AccountFilter, StreamContext};
use crate::state::StateManager;
use crate::streams::{RecordProcessor, StreamRegistry, ACCESSIBLE_CUSTOMERS};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read { streams } => self.read(streams.as_deref()).await,
        }
    }

    /// Load configuration; inline JSON takes precedence over the file
    fn load_config(&self) -> Result<TapConfig> {
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }
        if let Some(path) = &self.cli.config {
            return TapConfig::from_file(path);
        }
        Err(Error::config("no configuration given (use --config or --config-json)"))
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
                .with_context(|| format!("loading state from {}", path.display()))
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Executor sharing one HTTP client between API calls and token refreshes
    fn build_executor(config: &TapConfig, today: NaiveDate) -> Result<RequestExecutor> {
        let client = HttpClient::new()?;
        let auth = config.auth_config()?;
        info!(auth = auth.kind(), "Using credentials");
        let authenticator = Authenticator::with_client(auth, client.inner().clone());

        Ok(RequestExecutor::new(
            Arc::new(client),
            Arc::new(authenticator),
            config.executor_config(today)?,
        ))
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "documentationUrl": "https://developers.google.com/google-ads/api/rest/overview",
                "connectionSpecification": config_spec()
            }
        }));
        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;

        let today = Utc::now().date_naive();
        let executor = Self::build_executor(&config, today)?;
        let registry = StreamRegistry::default_streams(config.enable_click_view_report_stream);
        let listing = registry.require(ACCESSIBLE_CUSTOMERS)?;

        match executor.execute(listing, &StreamContext::Root, None).await {
            Ok(page) => {
                let count = page
                    .records
                    .first()
                    .and_then(|r| r.get("resourceNames"))
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": format!("Connection successful, {count} accessible customers")
                    }
                }));
            }
            Err(e) => {
                warn!("Connection check failed: {e}");
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection failed: {e}")
                    }
                }));
            }
        }

        Ok(())
    }

    /// Discover streams
    fn discover(&self) -> Result<()> {
        let enable_click_view = if self.cli.config.is_none() && self.cli.config_json.is_none() {
            false
        } else {
            self.load_config()?.enable_click_view_report_stream
        };

        let catalog = Catalog::from_registry(&StreamRegistry::default_streams(enable_click_view));
        self.output_message(&serde_json::to_value(&catalog)?);
        Ok(())
    }

    /// Read streams, writing Singer messages to stdout
    async fn read(&self, streams: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;
        let state = self.load_state()?;

        let today = Utc::now().date_naive();
        let registry = Arc::new(StreamRegistry::default_streams(
            config.enable_click_view_report_stream,
        ));
        let executor = Self::build_executor(&config, today)?;

        let mut sync_config = SyncConfig::new()
            .with_today(today)
            .with_start_date(config.start_date()?)
            .with_end_date(config.end_date()?);
        if let Some(selected) = streams.map(parse_stream_list).filter(|s| !s.is_empty()) {
            sync_config = sync_config.with_selected_streams(selected);
        }

        let processor = RecordProcessor::new(AccountFilter::new(config.customer_ids()));
        let mut engine = SyncEngine::new(
            registry,
            executor,
            state,
            Box::new(JsonLinesWriter::stdout()),
        )
        .with_config(sync_config)
        .with_processor(processor);

        let stats = engine.run().await?;

        if !engine.state().is_in_memory() {
            engine.state().save().await?;
            info!(path = %engine.state().path().display(), "State saved");
        }
        info!(
            records = stats.records_synced,
            pages = stats.pages_fetched,
            contexts = stats.contexts_completed,
            skipped = stats.contexts_skipped,
            "Read finished"
        );
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Split `a, b,,c` into `["a", "b", "c"]`
pub fn parse_stream_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
