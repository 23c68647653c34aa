//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use nf_core::timing::Timer;
use nf_engine::EngineProgress;
use nf_results::{RunManifest, RunStore, RunTables};

use crate::analysis::{AnalysisInputs, AnalysisPlan, PreparedAnalysis, read_inputs};
use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage};
use crate::project_service;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for running an analysis.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
    /// Force sequential evaluation regardless of the definition.
    pub sequential: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: ENGINE_VERSION.to_string(),
            sequential: false,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub definition_path: &'a Path,
    pub options: RunOptions,
}

/// Wall-clock time spent in each phase of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub read_inputs_time_s: f64,
    pub build_time_s: f64,
    pub evaluate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: &str,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            Some(message.to_string()),
        ));
    }
}

/// Execute or load a run.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingDefinition,
        started,
        "Loading analysis definition",
    );
    let def = project_service::load_definition(request.definition_path)?;
    let inputs = AnalysisInputs::resolve(&def, request.definition_path);
    inputs.ensure_exist()?;

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        "Checking run cache",
    );
    let run_id = nf_results::compute_run_id(&def, &inputs.all(), &request.options.engine_version)?;
    let store = RunStore::for_definition(request.definition_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            "Loading cached run",
        );

        let timer = Timer::start("load cache");
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = timer.stop();
        timing.total_time_s = started.elapsed().as_secs_f64();

        tracing::info!(run_id = %run_id, "loaded cached run");
        emit_progress(&mut progress_cb, RunStage::Completed, started, "Loaded cached run");

        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    let mut plan = AnalysisPlan::from_definition(&def);
    if request.options.sequential {
        plan.engine.parallel = false;
    }

    emit_progress(
        &mut progress_cb,
        RunStage::ReadingInputs,
        started,
        "Reading input tables",
    );
    let timer = Timer::start("read inputs");
    let loaded = read_inputs(&inputs, &plan)?;
    timing.read_inputs_time_s = timer.stop();

    emit_progress(
        &mut progress_cb,
        RunStage::BuildingNetwork,
        started,
        "Building network",
    );
    let timer = Timer::start("build");
    let prepared = PreparedAnalysis::build(&plan, &loaded)?;
    timing.build_time_s = timer.stop();

    emit_progress(
        &mut progress_cb,
        RunStage::EvaluatingSamples,
        started,
        "Evaluating samples",
    );
    let timer = Timer::start("evaluate");
    let results = {
        let mut on_chunk = |p: EngineProgress| {
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(RunProgressEvent {
                    stage: RunStage::EvaluatingSamples,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: None,
                    samples: Some(p),
                });
            }
        };
        prepared.run(Some(&mut on_chunk))?
    };
    timing.evaluate_time_s = timer.stop();

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        "Saving results",
    );
    let timer = Timer::start("save");
    let manifest = RunManifest {
        run_id: run_id.clone(),
        analysis: def.kind_name().to_string(),
        result_name: def.result_name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        engine_version: request.options.engine_version.clone(),
        num_samples: results.num_samples,
        distribution_nodes: results.failure_state.len(),
        mean_failure_probability: results.mean_failure_probability(),
    };
    let tables = RunTables {
        failure_state: results.failure_state,
        failure_probability: results.failure_probability,
    };
    store.save_run(&manifest, &tables)?;
    timing.save_time_s = timer.stop();
    timing.total_time_s = started.elapsed().as_secs_f64();

    tracing::info!(
        run_id = %run_id,
        nodes = manifest.distribution_nodes,
        samples = manifest.num_samples,
        total_s = timing.total_time_s,
        "run completed"
    );
    emit_progress(&mut progress_cb, RunStage::Completed, started, "Run completed");

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

/// List stored runs of the analysis, most recent first.
pub fn list_runs(definition_path: &Path) -> AppResult<Vec<RunManifest>> {
    let def = project_service::load_definition(definition_path)?;
    let store = RunStore::for_definition(definition_path)?;
    Ok(store.list_runs(&def.result_name)?)
}

/// Load a stored run.
pub fn load_run(definition_path: &Path, run_id: &str) -> AppResult<(RunManifest, RunTables)> {
    let store = RunStore::for_definition(definition_path)?;

    let manifest = store.load_manifest(run_id)?;
    let tables = store.load_tables(run_id)?;

    Ok((manifest, tables))
}
