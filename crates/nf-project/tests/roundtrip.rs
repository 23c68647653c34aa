use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use nf_project::*;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

const EPN_YAML: &str = r#"
version: 1
result_name: mmsa_epn_functionality
network:
  nodes: epn_nodes.csv
  links: epn_links.csv
analysis:
  type: Epn
  epf_sample_failure_state: epf_mcs_failure_state.csv
  num_samples: 2
  gate_station_node_list: [1, 2]
engine:
  chunk_size: 64
  penalty: { type: Sentinel, weight: 9999 }
  topology: Strict
"#;

#[test]
fn parse_epn_definition_with_defaults() {
    let dir = unique_temp_dir("nf_project_epn");
    let path = dir.join("analysis.yaml");
    fs::write(&path, EPN_YAML).unwrap();

    let def = load_yaml(&path).expect("definition should load");
    assert_eq!(def.result_name, "mmsa_epn_functionality");
    assert_eq!(def.kind_name(), "epn-functionality");
    assert!(def.engine.parallel);
    assert_eq!(def.engine.chunk_size, 64);
    assert_eq!(
        def.engine.penalty,
        PenaltyDef::Sentinel {
            weight: Some(9999.0)
        }
    );
    assert_eq!(def.engine.topology, Some(TopologyDef::Strict));
    match &def.analysis {
        AnalysisKindDef::Epn {
            gate_station_node_list,
            epl_sample_failure_state,
            class_field,
            ..
        } => {
            assert_eq!(gate_station_node_list.as_deref(), Some(&[1, 2][..]));
            assert!(epl_sample_failure_state.is_none());
            assert_eq!(class_field, "utilfcltyc");
        }
        other => panic!("unexpected analysis kind: {other:?}"),
    }
}

#[test]
fn yaml_and_json_roundtrip() {
    let dir = unique_temp_dir("nf_project_roundtrip");
    let def = AnalysisDef {
        version: 1,
        result_name: "wfn".to_string(),
        network: NetworkDef {
            nodes: "nodes.csv".into(),
            links: "links.csv".into(),
            weight_field: Some("length".to_string()),
        },
        analysis: AnalysisKindDef::Wfn {
            wf_sample_failure_state: "wf.csv".into(),
            pp_sample_failure_state: "pp.csv".into(),
            tank_node_list: vec![5],
            pumpstation_node_list: vec![1, 2],
            tanks_are_sources: false,
        },
        engine: EngineDef::default(),
    };

    let yaml_path = dir.join("analysis.yaml");
    save_yaml(&yaml_path, &def).unwrap();
    assert_eq!(load_yaml(&yaml_path).unwrap(), def);

    let json_path = dir.join("analysis.json");
    save_json(&json_path, &def).unwrap();
    assert_eq!(load_definition(&json_path).unwrap(), def);
}

#[test]
fn invalid_definition_is_not_saved() {
    let dir = unique_temp_dir("nf_project_invalid");
    let path = dir.join("analysis.yaml");
    fs::write(&path, EPN_YAML.replace("chunk_size: 64", "chunk_size: 0")).unwrap();
    assert!(matches!(load_yaml(&path), Err(ProjectError::Validation(_))));
}

#[test]
fn unknown_analysis_type_is_a_parse_error() {
    let dir = unique_temp_dir("nf_project_unknown");
    let path = dir.join("analysis.yaml");
    fs::write(&path, EPN_YAML.replace("type: Epn", "type: Gas")).unwrap();
    assert!(matches!(load_yaml(&path), Err(ProjectError::Yaml(_))));
}

#[test]
fn inputs_resolve_against_definition_dir() {
    let def_path = Path::new("/data/study/analysis.yaml");
    assert_eq!(
        resolve_input(def_path, Path::new("nodes.csv")),
        PathBuf::from("/data/study/nodes.csv")
    );
    assert_eq!(
        resolve_input(def_path, Path::new("/abs/links.csv")),
        PathBuf::from("/abs/links.csv")
    );
}
