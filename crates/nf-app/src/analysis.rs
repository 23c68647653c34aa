//! Electric power (EPN) and water facility (WFN) network analyses.
//!
//! Both run the same functionality engine; they differ in which tables carry
//! node and link samples, how sources are chosen, which link column is the
//! weight, and how strictly dangling link endpoints are treated.

use std::path::{Path, PathBuf};

use nf_core::Nwid;
use nf_engine::{
    BoundSamples, EngineOptions, EngineProgress, FunctionalityEngine, FunctionalityResults,
    LinkRecord, Network, NodeRecord, Partition, PenaltyPolicy, SampleTable, SentinelWeight,
    SourceSelector,
};
use nf_graph::TopologyPolicy;
use nf_project::{
    AnalysisDef, AnalysisKindDef, DEFAULT_GATE_STATION_CLASS, EngineDef, PenaltyDef, TopologyDef,
    resolve_input,
};

use crate::error::{AppError, AppResult};

pub const EPN_WEIGHT_FIELD: &str = "length_km";
pub const WFN_WEIGHT_FIELD: &str = "length";

/// Input tables of an analysis, resolved against the definition file.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInputs {
    pub nodes: PathBuf,
    pub links: PathBuf,
    pub node_samples: PathBuf,
    pub link_samples: Option<PathBuf>,
}

impl AnalysisInputs {
    pub fn resolve(def: &AnalysisDef, definition_path: &Path) -> Self {
        let resolve = |p: &Path| resolve_input(definition_path, p);
        let (node_samples, link_samples) = match &def.analysis {
            AnalysisKindDef::Epn {
                epf_sample_failure_state,
                epl_sample_failure_state,
                ..
            } => (
                resolve(epf_sample_failure_state),
                epl_sample_failure_state.as_deref().map(resolve),
            ),
            AnalysisKindDef::Wfn {
                wf_sample_failure_state,
                pp_sample_failure_state,
                ..
            } => (
                resolve(wf_sample_failure_state),
                Some(resolve(pp_sample_failure_state)),
            ),
        };
        Self {
            nodes: resolve(&def.network.nodes),
            links: resolve(&def.network.links),
            node_samples,
            link_samples,
        }
    }

    /// Every input file, in a fixed order.
    pub fn all(&self) -> Vec<&Path> {
        let mut paths = vec![
            self.nodes.as_path(),
            self.links.as_path(),
            self.node_samples.as_path(),
        ];
        if let Some(p) = &self.link_samples {
            paths.push(p.as_path());
        }
        paths
    }

    /// Fail on the first input that does not exist.
    pub fn ensure_exist(&self) -> AppResult<()> {
        for path in self.all() {
            if !path.is_file() {
                return Err(AppError::MissingInput {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}

/// Analysis-specific choices derived from a definition.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPlan {
    pub weight_field: String,
    /// Node column to read as the role, when sources are chosen by class.
    pub role_field: Option<String>,
    pub topology: TopologyPolicy,
    pub sources: SourceSelector,
    pub excluded: Vec<Nwid>,
    pub num_samples: Option<usize>,
    pub engine: EngineOptions,
}

impl AnalysisPlan {
    pub fn from_definition(def: &AnalysisDef) -> Self {
        let engine = engine_options(&def.engine);
        let topology_override = def.engine.topology.map(topology_policy);

        match &def.analysis {
            AnalysisKindDef::Epn {
                num_samples,
                gate_station_node_list,
                gate_station_node_class,
                class_field,
                ..
            } => {
                let (sources, role_field) = match gate_station_node_list {
                    Some(list) => (SourceSelector::Nodes(list.clone()), None),
                    None => {
                        let class = gate_station_node_class
                            .clone()
                            .unwrap_or_else(|| DEFAULT_GATE_STATION_CLASS.to_string());
                        (SourceSelector::RoleClass(class), Some(class_field.clone()))
                    }
                };
                Self {
                    weight_field: weight_field(def, EPN_WEIGHT_FIELD),
                    role_field,
                    topology: topology_override.unwrap_or(TopologyPolicy::Relaxed),
                    sources,
                    excluded: Vec::new(),
                    num_samples: *num_samples,
                    engine,
                }
            }
            AnalysisKindDef::Wfn {
                tank_node_list,
                pumpstation_node_list,
                tanks_are_sources,
                ..
            } => {
                let mut sources = pumpstation_node_list.clone();
                let excluded = if *tanks_are_sources {
                    sources.extend(tank_node_list.iter().copied());
                    Vec::new()
                } else {
                    tank_node_list.clone()
                };
                Self {
                    weight_field: weight_field(def, WFN_WEIGHT_FIELD),
                    role_field: None,
                    topology: topology_override.unwrap_or(TopologyPolicy::Strict),
                    sources: SourceSelector::Nodes(sources),
                    excluded,
                    num_samples: None,
                    engine,
                }
            }
        }
    }
}

fn weight_field(def: &AnalysisDef, default: &str) -> String {
    def.network
        .weight_field
        .clone()
        .unwrap_or_else(|| default.to_string())
}

pub fn engine_options(def: &EngineDef) -> EngineOptions {
    EngineOptions {
        parallel: def.parallel,
        chunk_size: def.chunk_size,
        threads: def.threads,
        penalty: match def.penalty {
            PenaltyDef::Exclude => PenaltyPolicy::Exclude,
            PenaltyDef::Sentinel { weight: None } => PenaltyPolicy::Sentinel(SentinelWeight::Auto),
            PenaltyDef::Sentinel { weight: Some(m) } => {
                PenaltyPolicy::Sentinel(SentinelWeight::Fixed(m))
            }
        },
    }
}

pub fn topology_policy(def: TopologyDef) -> TopologyPolicy {
    match def {
        TopologyDef::Relaxed => TopologyPolicy::Relaxed,
        TopologyDef::Strict => TopologyPolicy::Strict,
    }
}

/// Raw rows of every input table.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
    pub node_samples: SampleTable,
    pub link_samples: Option<SampleTable>,
}

pub fn read_inputs(inputs: &AnalysisInputs, plan: &AnalysisPlan) -> AppResult<LoadedInputs> {
    inputs.ensure_exist()?;
    let nodes = nf_project::read_nodes(&inputs.nodes, plan.role_field.as_deref())?;
    let links = nf_project::read_links(&inputs.links, &plan.weight_field)?;
    let node_samples = nf_project::read_sample_table(&inputs.node_samples, "node samples")?;
    let link_samples = inputs
        .link_samples
        .as_deref()
        .map(|p| nf_project::read_sample_table(p, "link samples"))
        .transpose()?;
    Ok(LoadedInputs {
        nodes,
        links,
        node_samples,
        link_samples,
    })
}

/// Network, partition and bound samples, ready to evaluate.
#[derive(Debug)]
pub struct PreparedAnalysis {
    pub network: Network,
    pub partition: Partition,
    pub samples: BoundSamples,
    pub options: EngineOptions,
}

impl PreparedAnalysis {
    pub fn build(plan: &AnalysisPlan, inputs: &LoadedInputs) -> AppResult<Self> {
        let network = Network::build(&inputs.nodes, &inputs.links, plan.topology)?;
        let sources = plan.sources.resolve(&network);
        let partition = Partition::new(&network, &sources, &plan.excluded, plan.topology)?;
        let samples = BoundSamples::bind(
            &network,
            Some(&inputs.node_samples),
            inputs.link_samples.as_ref(),
            plan.num_samples,
        )?;

        tracing::info!(
            sources = partition.sources().len(),
            excluded = partition.excluded().len(),
            distribution = partition.distribution().len(),
            samples = nf_engine::SampleProvider::num_samples(&samples),
            "analysis prepared"
        );

        Ok(Self {
            network,
            partition,
            samples,
            options: plan.engine.clone(),
        })
    }

    pub fn run(
        &self,
        progress: Option<&mut dyn FnMut(EngineProgress)>,
    ) -> AppResult<FunctionalityResults> {
        let engine = FunctionalityEngine::new(
            &self.network,
            &self.partition,
            &self.samples,
            self.options.clone(),
        );
        Ok(engine.run_to_results(progress)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_project::NetworkDef;

    fn def(analysis: AnalysisKindDef) -> AnalysisDef {
        AnalysisDef {
            version: 1,
            result_name: "r".to_string(),
            network: NetworkDef {
                nodes: "nodes.csv".into(),
                links: "links.csv".into(),
                weight_field: None,
            },
            analysis,
            engine: EngineDef::default(),
        }
    }

    fn epn(list: Option<Vec<Nwid>>, class: Option<&str>) -> AnalysisDef {
        def(AnalysisKindDef::Epn {
            epf_sample_failure_state: "epf.csv".into(),
            epl_sample_failure_state: None,
            num_samples: Some(10),
            gate_station_node_list: list,
            gate_station_node_class: class.map(String::from),
            class_field: "utilfcltyc".to_string(),
        })
    }

    fn wfn(tanks_are_sources: bool) -> AnalysisDef {
        def(AnalysisKindDef::Wfn {
            wf_sample_failure_state: "wf.csv".into(),
            pp_sample_failure_state: "pp.csv".into(),
            tank_node_list: vec![7],
            pumpstation_node_list: vec![1, 2],
            tanks_are_sources,
        })
    }

    #[test]
    fn epn_defaults() {
        let plan = AnalysisPlan::from_definition(&epn(None, None));
        assert_eq!(plan.weight_field, "length_km");
        assert_eq!(plan.topology, TopologyPolicy::Relaxed);
        assert_eq!(plan.sources, SourceSelector::RoleClass("EPPL".to_string()));
        assert_eq!(plan.role_field.as_deref(), Some("utilfcltyc"));
        assert_eq!(plan.num_samples, Some(10));
        assert_eq!(plan.engine, EngineOptions::default());
    }

    #[test]
    fn epn_explicit_list_skips_role_column() {
        let plan = AnalysisPlan::from_definition(&epn(Some(vec![3]), None));
        assert_eq!(plan.sources, SourceSelector::Nodes(vec![3]));
        assert_eq!(plan.role_field, None);
    }

    #[test]
    fn wfn_tanks_are_excluded_by_default() {
        let plan = AnalysisPlan::from_definition(&wfn(false));
        assert_eq!(plan.weight_field, "length");
        assert_eq!(plan.topology, TopologyPolicy::Strict);
        assert_eq!(plan.sources, SourceSelector::Nodes(vec![1, 2]));
        assert_eq!(plan.excluded, vec![7]);

        let plan = AnalysisPlan::from_definition(&wfn(true));
        assert_eq!(plan.sources, SourceSelector::Nodes(vec![1, 2, 7]));
        assert!(plan.excluded.is_empty());
    }

    #[test]
    fn engine_and_topology_overrides() {
        let mut d = wfn(false);
        d.engine.topology = Some(TopologyDef::Relaxed);
        d.engine.penalty = PenaltyDef::Sentinel { weight: None };
        d.network.weight_field = Some("len".to_string());
        let plan = AnalysisPlan::from_definition(&d);
        assert_eq!(plan.topology, TopologyPolicy::Relaxed);
        assert_eq!(plan.weight_field, "len");
        assert_eq!(
            plan.engine.penalty,
            PenaltyPolicy::Sentinel(SentinelWeight::Auto)
        );
    }

    #[test]
    fn inputs_resolve_per_kind() {
        let inputs = AnalysisInputs::resolve(&wfn(false), Path::new("/study/analysis.yaml"));
        assert_eq!(inputs.nodes, PathBuf::from("/study/nodes.csv"));
        assert_eq!(inputs.node_samples, PathBuf::from("/study/wf.csv"));
        assert_eq!(inputs.link_samples, Some(PathBuf::from("/study/pp.csv")));
        assert_eq!(inputs.all().len(), 4);

        let inputs = AnalysisInputs::resolve(&epn(None, None), Path::new("/study/analysis.yaml"));
        assert_eq!(inputs.link_samples, None);
        assert_eq!(inputs.all().len(), 3);
    }
}
