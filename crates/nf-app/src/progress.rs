use nf_engine::EngineProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingDefinition,
    CheckingCache,
    LoadingCachedResult,
    ReadingInputs,
    BuildingNetwork,
    EvaluatingSamples,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::LoadingDefinition => "load-definition",
            RunStage::CheckingCache => "check-cache",
            RunStage::LoadingCachedResult => "load-cache",
            RunStage::ReadingInputs => "read-inputs",
            RunStage::BuildingNetwork => "build-network",
            RunStage::EvaluatingSamples => "evaluate",
            RunStage::SavingResults => "save",
            RunStage::Completed => "done",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    /// Set while samples are being evaluated.
    pub samples: Option<EngineProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            samples: None,
        }
    }
}
