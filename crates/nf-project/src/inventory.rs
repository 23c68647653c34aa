//! CSV readers for the node and link inventories and the sample failure
//! state tables.
//!
//! Inventories are located by header name, so extra attribute columns (as
//! exported from the GIS layers) are ignored.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use nf_core::{Nwid, Real};
use nf_engine::{LinkRecord, NodeRecord, SampleTable, parse_failure_string};
use serde::Deserialize;

use crate::{ProjectError, ProjectResult};

pub const GUID_FIELD: &str = "guid";
pub const NODE_ID_FIELD: &str = "nodenwid";
pub const FROM_NODE_FIELD: &str = "fromnode";
pub const TO_NODE_FIELD: &str = "tonode";

struct Columns<'a> {
    file: &'a Path,
    headers: StringRecord,
}

impl<'a> Columns<'a> {
    fn position(&self, column: &str) -> ProjectResult<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .ok_or_else(|| ProjectError::MissingColumn {
                file: self.file.display().to_string(),
                column: column.to_string(),
            })
    }

    fn cell<'r>(&self, record: &'r StringRecord, row: usize, col: usize) -> ProjectResult<&'r str> {
        record.get(col).map(str::trim).ok_or_else(|| ProjectError::BadCell {
            file: self.file.display().to_string(),
            row,
            column: self.headers.get(col).unwrap_or_default().to_string(),
            value: String::new(),
            reason: "missing cell".to_string(),
        })
    }

    fn bad_cell(&self, row: usize, col: usize, value: &str, reason: &str) -> ProjectError {
        ProjectError::BadCell {
            file: self.file.display().to_string(),
            row,
            column: self.headers.get(col).unwrap_or_default().to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Node ids often arrive as floats (`12.0`) from attribute tables.
    fn nwid(&self, record: &StringRecord, row: usize, col: usize) -> ProjectResult<Nwid> {
        let raw = self.cell(record, row, col)?;
        if let Ok(id) = raw.parse::<Nwid>() {
            return Ok(id);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as Nwid),
            _ => Err(self.bad_cell(row, col, raw, "expected an integer node id")),
        }
    }

    fn real(&self, record: &StringRecord, row: usize, col: usize) -> ProjectResult<Real> {
        let raw = self.cell(record, row, col)?;
        raw.parse::<Real>()
            .map_err(|_| self.bad_cell(row, col, raw, "expected a number"))
    }
}

fn open(path: &Path) -> ProjectResult<(csv::Reader<std::fs::File>, StringRecord)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let headers = rdr.headers()?.clone();
    Ok((rdr, headers))
}

/// Read the node inventory. `role_field`, when given, must exist.
pub fn read_nodes(path: &Path, role_field: Option<&str>) -> ProjectResult<Vec<NodeRecord>> {
    let (mut rdr, headers) = open(path)?;
    let cols = Columns {
        file: path,
        headers,
    };
    let guid = cols.position(GUID_FIELD)?;
    let nwid = cols.position(NODE_ID_FIELD)?;
    let role = role_field.map(|f| cols.position(f)).transpose()?;

    let mut nodes = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        nodes.push(NodeRecord {
            guid: cols.cell(&record, row, guid)?.to_string(),
            nwid: cols.nwid(&record, row, nwid)?,
            role: match role {
                Some(col) => Some(cols.cell(&record, row, col)?.to_string()),
                None => None,
            },
        });
    }
    tracing::debug!(path = %path.display(), rows = nodes.len(), "node inventory read");
    Ok(nodes)
}

/// Read the link inventory, taking weights from `weight_field`.
pub fn read_links(path: &Path, weight_field: &str) -> ProjectResult<Vec<LinkRecord>> {
    let (mut rdr, headers) = open(path)?;
    let cols = Columns {
        file: path,
        headers,
    };
    let guid = cols.position(GUID_FIELD)?;
    let from = cols.position(FROM_NODE_FIELD)?;
    let to = cols.position(TO_NODE_FIELD)?;
    let weight = cols.position(weight_field)?;

    let mut links = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        links.push(LinkRecord {
            guid: cols.cell(&record, row, guid)?.to_string(),
            from: cols.nwid(&record, row, from)?,
            to: cols.nwid(&record, row, to)?,
            weight: cols.real(&record, row, weight)?,
        });
    }
    tracing::debug!(path = %path.display(), rows = links.len(), "link inventory read");
    Ok(links)
}

#[derive(Debug, Deserialize)]
struct FailureStateRecord {
    guid: String,
    failure: String,
}

/// Read a `guid,failure` sample failure state table.
pub fn read_sample_table(path: &Path, name: &'static str) -> ProjectResult<SampleTable> {
    let (mut rdr, _) = open(path)?;
    let mut table = SampleTable::new(name);
    for result in rdr.deserialize() {
        let record: FailureStateRecord = result?;
        let bits = parse_failure_string(&record.guid, &record.failure)?;
        table.insert(record.guid, bits)?;
    }
    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        samples = table.num_samples().unwrap_or(0),
        "sample failure state read"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("nf_project_inventory_{}_{}", name, nanos));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn nodes_by_header_name() {
        let path = write_temp(
            "nodes.csv",
            "utilfcltyc,nodenwid,guid,x\nEPPL,1,g1,0.5\nESSL,2.0,g2,0.1\n",
        );
        let nodes = read_nodes(&path, Some("utilfcltyc")).unwrap();
        assert_eq!(
            nodes,
            vec![
                NodeRecord {
                    guid: "g1".into(),
                    nwid: 1,
                    role: Some("EPPL".into())
                },
                NodeRecord {
                    guid: "g2".into(),
                    nwid: 2,
                    role: Some("ESSL".into())
                },
            ]
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let path = write_temp("nodes.csv", "guid,id\ng1,1\n");
        let err = read_nodes(&path, None).unwrap_err();
        assert!(matches!(err, ProjectError::MissingColumn { ref column, .. } if column == "nodenwid"));
    }

    #[test]
    fn links_with_weight_field() {
        let path = write_temp(
            "links.csv",
            "guid,fromnode,tonode,length_km\nl1,1,2,0.25\nl2,2,3,1\n",
        );
        let links = read_links(&path, "length_km").unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].weight, 0.25);
        assert_eq!((links[1].from, links[1].to), (2, 3));

        assert!(matches!(
            read_links(&path, "length"),
            Err(ProjectError::MissingColumn { .. })
        ));
    }

    #[test]
    fn bad_node_id_cell() {
        let path = write_temp("links.csv", "guid,fromnode,tonode,length\nl1,1.5,2,1\n");
        let err = read_links(&path, "length").unwrap_err();
        assert!(matches!(err, ProjectError::BadCell { row: 0, .. }));
    }

    #[test]
    fn sample_table_from_csv() {
        let path = write_temp("fs.csv", "guid,failure\ng1,\"1,0,1\"\ng2,\"0,0,1\"\n");
        let table = read_sample_table(&path, "nodes").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.num_samples(), Some(3));
        assert_eq!(
            table.to_wire_rows()[1],
            ("g2".to_string(), "0,0,1".to_string())
        );
    }

    #[test]
    fn sample_table_headers_are_trimmed() {
        let path = write_temp("fs_spaced.csv", "guid, failure \ng1,\"1,1\"\n");
        let table = read_sample_table(&path, "links").unwrap();
        assert_eq!(table.num_samples(), Some(2));
        assert!(table.get("g1").is_some());
    }

    #[test]
    fn sample_table_rejects_bad_flags() {
        let path = write_temp("fs.csv", "guid,failure\ng1,\"1,x\"\n");
        assert!(matches!(
            read_sample_table(&path, "nodes"),
            Err(ProjectError::Samples(_))
        ));
    }
}
