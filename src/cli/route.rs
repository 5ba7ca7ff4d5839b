//! CLI route: run context and command dispatch.
//!
//! `inspect` plays the part of an editor's UI thread: it owns the
//! orchestrator, blocks on flush requests, and drains the queue itself.

use crate::cli::parse::Commands;
use crate::cli::presentation::{check_sheets_format, format_config, format_sheets, SheetReport};
use crate::config::{ConfigLoader, PropsheetConfig};
use crate::dispatch::{DeferredCommandQueue, FlushSignal};
use crate::error::SheetError;
use crate::generation::{GenerationOrchestrator, NullSink};
use crate::schema::Scene;
use crate::selection::Style;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// Runtime context for CLI execution: workspace and effective configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: PropsheetConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, SheetError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        }
        .validated()?;

        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &PropsheetConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, SheetError> {
        match command {
            Commands::Inspect {
                scene,
                select,
                then_select,
                style,
                format,
                timeout_ms,
            } => {
                check_sheets_format(format)?;
                let sheets = self.inspect(
                    scene,
                    select,
                    then_select,
                    *style,
                    Duration::from_millis(*timeout_ms),
                )?;
                format_sheets(&sheets, format)
            }
            Commands::Config { format } => format_config(&self.config, format),
        }
    }

    fn inspect(
        &self,
        scene_path: &Path,
        select: &[String],
        then_select: &[String],
        style: Option<Style>,
        timeout: Duration,
    ) -> Result<Vec<SheetReport>, SheetError> {
        let scene_path = if scene_path.is_relative() {
            self.workspace_root.join(scene_path)
        } else {
            scene_path.to_path_buf()
        };
        let scene = Scene::load(&scene_path)?;
        info!(
            scene = %scene_path.display(),
            objects = scene.objects().len(),
            "Loaded scene"
        );

        let (signal, flush_requests) = FlushSignal::new_pair();
        let queue = Arc::new(DeferredCommandQueue::new(signal));
        let mut orchestrator = GenerationOrchestrator::with_config(
            scene.registry(),
            queue,
            NullSink,
            self.config.orchestrator.clone(),
        );

        let sheets = Arc::new(Mutex::new(Vec::new()));
        let collected = Arc::clone(&sheets);
        orchestrator.subscribe(move |event| collected.lock().push(SheetReport::from(event)));

        if let Some(style) = style {
            orchestrator.set_style(style);
        }
        orchestrator.set_selection(scene.select(select)?);
        orchestrator.create_properties()?;

        if !then_select.is_empty() {
            orchestrator.set_selection(scene.select(then_select)?);
            orchestrator.create_properties()?;
        }

        pump_until_idle(&orchestrator, &flush_requests, timeout)?;

        let sheets = sheets.lock().clone();
        Ok(sheets)
    }
}

/// Host loop: flush whenever the queue asks, until no worker is running and
/// nothing is left to apply.
fn pump_until_idle(
    orchestrator: &GenerationOrchestrator,
    flush_requests: &Receiver<()>,
    timeout: Duration,
) -> Result<(), SheetError> {
    let deadline = Instant::now() + timeout;
    loop {
        if !orchestrator.is_active() && orchestrator.queue().is_empty() {
            return Ok(());
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(SheetError::Timeout(format!(
                "property generation did not finish within {} ms",
                timeout.as_millis()
            )));
        }

        match flush_requests.recv_timeout(remaining.min(PUMP_INTERVAL)) {
            Ok(()) | Err(RecvTimeoutError::Timeout) => {
                let report = orchestrator.queue().flush();
                if report.executed > 0 {
                    debug!(executed = report.executed, "Host loop flushed queue");
                }
            }
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}
