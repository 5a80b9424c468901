//! Positional input arguments.

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// A log file, optionally tagged with the run it belongs to (`RUN=FILE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    /// Manifest run identifier.
    pub run_id: Option<String>,
    /// Path of the log file.
    pub path: PathBuf,
}

impl RunInput {
    /// Run identifier, required when timestamps are resolved.
    pub fn require_run_id(&self) -> Result<&str> {
        self.run_id.as_deref().ok_or_else(|| {
            anyhow!(
                "{} has no run identifier; pass it as RUN={}",
                self.path.display(),
                self.path.display()
            )
        })
    }
}

/// Bandwidth logs one node wrote while sending to its peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLogs {
    /// Run the node's logs belong to.
    pub run_id: Option<String>,
    /// Directory holding the logs, which names the node.
    pub node: PathBuf,
    /// One log per peer.
    pub files: Vec<PathBuf>,
}

impl NodeLogs {
    /// Run identifier, required when timestamps are resolved.
    pub fn require_run_id(&self) -> Result<&str> {
        self.run_id.as_deref().ok_or_else(|| {
            anyhow!(
                "node {} has no run identifier; pass its logs as RUN=FILE",
                self.node.display()
            )
        })
    }
}

/// Group inputs by run and by the directory that holds them.
///
/// `bandwidth_<n>.log` inside `result_<n>/` is a node measuring itself and
/// is left out.
pub fn group_by_node(inputs: &[RunInput]) -> Vec<NodeLogs> {
    let mut nodes: BTreeMap<(Option<String>, PathBuf), Vec<PathBuf>> = BTreeMap::new();
    for input in inputs {
        if is_loopback(&input.path) {
            debug!(file = %input.path.display(), "Skipping a node's log of itself");
            continue;
        }
        let node = input.path.parent().map(Path::to_path_buf).unwrap_or_default();
        nodes
            .entry((input.run_id.clone(), node))
            .or_default()
            .push(input.path.clone());
    }

    nodes
        .into_iter()
        .map(|((run_id, node), files)| NodeLogs { run_id, node, files })
        .collect()
}

fn is_loopback(path: &Path) -> bool {
    fn rank<'a>(name: Option<&'a OsStr>, prefix: &str) -> Option<&'a str> {
        name?.to_str()?.strip_prefix(prefix)
    }
    let peer = rank(path.file_stem(), "bandwidth_");
    let node = rank(path.parent().and_then(Path::file_name), "result_");
    matches!((node, peer), (Some(node), Some(peer)) if node == peer)
}

impl FromStr for RunInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (run_id, path) = match s.split_once('=') {
            Some((run, path)) => {
                if run.is_empty() {
                    return Err(format!("'{s}' has an empty run identifier"));
                }
                (Some(run.to_string()), path)
            }
            None => (None, s),
        };
        if path.is_empty() {
            return Err(format!("'{s}' has no file path"));
        }
        Ok(Self {
            run_id,
            path: PathBuf::from(path),
        })
    }
}
