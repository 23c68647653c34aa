//! Run storage API.
//!
//! Layout: `<root>/<run_id>/manifest.json` plus the two result tables named
//! after the run's result name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{RunManifest, RunTables, failure_probability_file, failure_state_file};
use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to an analysis definition, under `.netfunc/runs`.
    pub fn for_definition(definition_path: &Path) -> ResultsResult<Self> {
        let dir = definition_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "definition path has no parent directory".to_string(),
            })?;
        Self::new(dir.join(".netfunc").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    /// Write the tables first and the manifest last, so a run only counts as
    /// cached once it is complete.
    pub fn save_run(&self, manifest: &RunManifest, tables: &RunTables) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        write_csv(
            &run_dir.join(failure_state_file(&manifest.result_name)),
            &tables.failure_state,
        )?;
        write_csv(
            &run_dir.join(failure_probability_file(&manifest.result_name)),
            &tables.failure_probability,
        )?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join("manifest.json"), manifest_json)?;

        tracing::debug!(run_id = %manifest.run_id, dir = %run_dir.display(), "run saved");
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_tables(&self, run_id: &str) -> ResultsResult<RunTables> {
        let manifest = self.load_manifest(run_id)?;
        let run_dir = self.run_dir(run_id);
        Ok(RunTables {
            failure_state: read_csv(&run_dir.join(failure_state_file(&manifest.result_name)))?,
            failure_probability: read_csv(
                &run_dir.join(failure_probability_file(&manifest.result_name)),
            )?,
        })
    }

    /// Manifests of every stored run with this result name, newest first.
    pub fn list_runs(&self, result_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            match self.load_manifest(&run_id) {
                Ok(manifest) if manifest.result_name == result_name => runs.push(manifest),
                Ok(_) => {}
                Err(err) => tracing::debug!(run_id = %run_id, error = %err, "skipping run directory"),
            }
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ResultsResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> ResultsResult<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}
