//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - walks the stream tree depth-first, writing messages and checkpoints
//! - `SyncConfig` - run date, window bounds and stream selection
//! - `ContextOutcome` / `StreamStatus` - result of one (stream, context) run
//!
//! Everything runs on one task: one stream, one context, one page at a time.
//! Each record of a parent stream is fanned out to the child streams, which
//! run to completion before the next parent record is handled.

mod types;

pub use types::{ContextOutcome, StreamStatus, SyncConfig, SyncStats};

use crate::error::{Error, Result};
use crate::http::RequestExecutor;
use crate::output::{Message, MessageSink};
use crate::partition::{ContextKey, DateWindowPlanner, FanOutEngine, StreamContext};
use crate::state::{compare_values, StateManager};
use crate::streams::{RecordProcessor, StreamDefinition, StreamRegistry};
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    registry: Arc<StreamRegistry>,
    executor: RequestExecutor,
    state: StateManager,
    processor: RecordProcessor,
    sink: Box<dyn MessageSink>,
    config: SyncConfig,
    planner: DateWindowPlanner,
    fan_out: FanOutEngine,
    /// Streams that run: selected streams and their ancestors
    active: HashSet<String>,
    schemas_sent: HashSet<String>,
    synced_once: HashSet<String>,
    statuses: BTreeMap<(String, ContextKey), StreamStatus>,
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        registry: Arc<StreamRegistry>,
        executor: RequestExecutor,
        state: StateManager,
        sink: Box<dyn MessageSink>,
    ) -> Self {
        let config = SyncConfig::default();
        let planner = DateWindowPlanner::from_config(None, None, config.today);
        Self {
            registry,
            executor,
            state,
            processor: RecordProcessor::default(),
            sink,
            config,
            planner,
            fan_out: FanOutEngine::new(),
            active: HashSet::new(),
            schemas_sent: HashSet::new(),
            synced_once: HashSet::new(),
            statuses: BTreeMap::new(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.planner = DateWindowPlanner::from_config(config.start_date, config.end_date, config.today);
        self.config = config;
        self
    }

    /// Set the record post-processor
    #[must_use]
    pub fn with_processor(mut self, processor: RecordProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Last status of a (stream, context) pair
    pub fn status(&self, stream: &str, key: &ContextKey) -> Option<StreamStatus> {
        self.statuses.get(&(stream.to_string(), key.clone())).copied()
    }

    /// Run every root stream and everything below it
    ///
    /// Writes the initial state first and the final state last. A fatal
    /// stream failure aborts the run; checkpoints written before it stay.
    pub async fn run(&mut self) -> Result<SyncStats> {
        let start = Instant::now();
        self.active = self.active_streams()?;

        self.emit_state().await?;

        let registry = Arc::clone(&self.registry);
        for root in registry.roots() {
            if !self.active.contains(&root.name) {
                continue;
            }
            self.set_status(&root.name, &StreamContext::Root, StreamStatus::Pending);
            self.run_context(root, StreamContext::Root).await?;
        }

        self.emit_state().await?;
        self.sink.flush()?;
        debug_assert!(
            self.statuses.values().all(|s| s.is_terminal()),
            "every scheduled context settles before the run ends"
        );

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            records = self.stats.records_synced,
            pages = self.stats.pages_fetched,
            skipped = self.stats.contexts_skipped,
            "Sync completed in {}ms",
            self.stats.duration_ms
        );
        Ok(self.stats.clone())
    }

    /// Selected streams plus their ancestors
    fn active_streams(&self) -> Result<HashSet<String>> {
        let Some(selected) = &self.config.selected_streams else {
            return Ok(self.registry.names().into_iter().map(String::from).collect());
        };

        let mut active = HashSet::new();
        for name in selected {
            self.registry.require(name)?;
            active.insert(name.clone());
            active.extend(self.registry.ancestors(name).into_iter().map(String::from));
        }
        Ok(active)
    }

    /// Run one stream for one context, then settle its status
    fn run_context<'a>(
        &'a mut self,
        definition: &'a StreamDefinition,
        context: StreamContext,
    ) -> BoxFuture<'a, Result<ContextOutcome>> {
        async move {
            let name = definition.name.as_str();
            self.set_status(name, &context, StreamStatus::Running);
            info!(stream = name, %context, "Syncing stream");

            let outcome = match self.sync_context(definition, &context).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.set_status(name, &context, StreamStatus::Failed);
                    return Err(e);
                }
            };

            self.set_status(name, &context, outcome.status());
            self.stats.add_outcome(&outcome);

            match &outcome {
                ContextOutcome::Completed => {
                    if definition.is_sync_once() {
                        self.synced_once.insert(name.to_string());
                    }
                    self.emit_state().await?;
                }
                ContextOutcome::SkippedPermission { status } => {
                    warn!(
                        stream = name,
                        %context,
                        status,
                        "Insufficient permissions for stream, skipping context"
                    );
                }
                ContextOutcome::Fatal { status, body } => {
                    return Err(Error::stream_failed(name, *status, body.clone()));
                }
            }
            Ok(outcome)
        }
        .boxed()
    }

    /// Fetch every window and page of one context
    async fn sync_context(
        &mut self,
        definition: &StreamDefinition,
        context: &StreamContext,
    ) -> Result<ContextOutcome> {
        let name = definition.name.as_str();
        let emits = self.config.is_selected(name);

        if emits && self.schemas_sent.insert(name.to_string()) {
            self.write(&Message::schema(
                name,
                definition.schema.to_json(),
                definition.primary_keys.clone(),
                definition.replication_key.iter().cloned().collect(),
            ))?;
        }

        let registry = Arc::clone(&self.registry);
        let children: Vec<&StreamDefinition> = registry
            .children_of(name)
            .into_iter()
            .filter(|child| self.active.contains(&child.name))
            .collect();
        let child_names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();

        let key = context.key();
        let windows = if definition.is_date_windowed() {
            let checkpoint = self.state.get_checkpoint(name, &key).await;
            self.planner
                .plan(checkpoint.as_deref(), self.config.today)?
                .into_iter()
                .map(|day| context.with_date(day))
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![context.clone()]
        };

        for window in windows {
            let mut page_token: Option<String> = None;

            loop {
                let page = match self
                    .executor
                    .execute(definition, &window, page_token.as_deref())
                    .await
                {
                    Ok(page) => page,
                    Err(Error::HttpStatus { status, body }) => {
                        return Ok(ContextOutcome::from_status(
                            status,
                            body,
                            definition.tolerates_permission_errors(),
                        ));
                    }
                    Err(e) => return Err(e),
                };
                self.stats.add_page();
                debug!(stream = name, context = %window, records = page.records.len(), "page fetched");

                let mut page_max: Option<String> = None;
                for raw in page.records {
                    let Some(record) =
                        self.processor
                            .process(&definition.transforms, raw, &window)?
                    else {
                        continue;
                    };
                    definition.primary_key_values(&record, &window)?;

                    if let Some(value) = definition.replication_value(&record) {
                        if page_max
                            .as_deref()
                            .map_or(true, |max| compare_values(&value, max).is_gt())
                        {
                            page_max = Some(value);
                        }
                    }

                    let dispatches = if child_names.is_empty() {
                        Vec::new()
                    } else {
                        self.fan_out
                            .fan_out(definition.child_rule, &record, &child_names)?
                    };

                    if emits {
                        self.write(&Message::record(name, record, Utc::now()))?;
                        self.stats.add_records(1);
                    }

                    for dispatch in dispatches {
                        let due: Vec<&StreamDefinition> = children
                            .iter()
                            .copied()
                            .filter(|c| dispatch.children.contains(&c.name))
                            .filter(|c| self.is_due(c, &dispatch.context))
                            .collect();

                        for child in &due {
                            self.set_status(&child.name, &dispatch.context, StreamStatus::Pending);
                        }
                        for child in due {
                            self.run_context(child, dispatch.context.clone()).await?;
                        }
                    }
                }

                if let (Some(replication_key), Some(value)) =
                    (definition.replication_key.as_deref(), page_max)
                {
                    if self
                        .state
                        .advance_checkpoint(name, &key, replication_key, &value)
                        .await?
                    {
                        self.emit_state().await?;
                    }
                }

                match page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }
        }

        Ok(ContextOutcome::Completed)
    }

    /// Sync-once streams take only the first context that completes
    fn is_due(&self, child: &StreamDefinition, context: &StreamContext) -> bool {
        if child.is_sync_once() && self.synced_once.contains(&child.name) {
            debug!(stream = %child.name, %context, "already synced once, not scheduling");
            return false;
        }
        true
    }

    fn set_status(&mut self, stream: &str, context: &StreamContext, status: StreamStatus) {
        self.statuses
            .insert((stream.to_string(), context.key()), status);
    }

    fn write(&mut self, message: &Message) -> Result<()> {
        self.sink.write(message)
    }

    async fn emit_state(&mut self) -> Result<()> {
        let value = self.state.to_value().await?;
        self.write(&Message::state(value))?;
        self.stats.add_state();
        Ok(())
    }
}
