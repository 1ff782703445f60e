//! Cluster health via `kubectl`: unhealthy pods, restart loops, node readiness.
use crate::briefing::{SectionPayload, SectionResult};
use crate::config::BriefingConfig;
use crate::process::run_command;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const KUBECTL_TIMEOUT: Duration = Duration::from_secs(15);
const HEALTHY_PHASES: [&str; 3] = ["Running", "Succeeded", "Completed"];
const RESTART_THRESHOLD: u32 = 5;
const ROLE_LABEL_PREFIX: &str = "node-role.kubernetes.io/";

pub const NOT_INSTALLED_NOTE: &str = "kubectl not installed — skipping Kubernetes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnhealthyPod {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub phase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartIssue {
    pub pod: Option<String>,
    pub namespace: Option<String>,
    pub container: Option<String>,
    pub restarts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStatus {
    pub name: Option<String>,
    pub ready: bool,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterHealth {
    pub total_pods: usize,
    pub unhealthy_pods: Vec<UnhealthyPod>,
    pub unhealthy_count: usize,
    pub restart_issues: Vec<RestartIssue>,
    pub restart_issue_count: usize,
    /// Node details; `None` when the node listing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_ready: Option<usize>,
}

impl ClusterHealth {
    fn with_nodes(mut self, nodes: Option<Vec<NodeStatus>>) -> Self {
        self.node_count = nodes.as_ref().map(Vec::len);
        self.nodes_ready = nodes
            .as_ref()
            .map(|nodes| nodes.iter().filter(|n| n.ready).count());
        self.nodes = nodes;
        self
    }
}

// Minimal views of `kubectl get ... -o json`.
#[derive(Debug, Deserialize)]
struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    name: Option<String>,
    namespace: Option<String>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    status: PodStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodStatus {
    phase: Option<String>,
    #[serde(default)]
    container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerStatus {
    name: Option<String>,
    #[serde(default)]
    restart_count: u32,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    status: NodeConditions,
}

#[derive(Debug, Default, Deserialize)]
struct NodeConditions {
    #[serde(default)]
    conditions: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
}

pub fn gather(_config: &BriefingConfig) -> Result<SectionResult> {
    let kubectl = which::which("kubectl").ok();
    gather_with(kubectl.as_deref())
}

/// Summarize the cluster through the given `kubectl`, if one was found.
fn gather_with(kubectl: Option<&Path>) -> Result<SectionResult> {
    let Some(kubectl) = kubectl else {
        return Ok(SectionResult::unavailable(NOT_INSTALLED_NOTE));
    };
    let kubectl = kubectl.to_string_lossy();

    let pods_json = kubectl_json(&kubectl, &["get", "pods", "--all-namespaces", "-o", "json"])?;
    let health = summarize_pods(&pods_json)?;

    let nodes = match kubectl_json(&kubectl, &["get", "nodes", "-o", "json"]) {
        Ok(raw) => parse_nodes(&raw),
        Err(err) => {
            tracing::debug!(error = %err, "node listing unavailable");
            None
        }
    };

    Ok(SectionResult::Ready(SectionPayload::Kubernetes(
        health.with_nodes(nodes),
    )))
}

fn kubectl_json(kubectl: &str, args: &[&str]) -> Result<String> {
    run_command(kubectl, args, None, KUBECTL_TIMEOUT)?.into_stdout()
}

fn summarize_pods(raw: &str) -> Result<ClusterHealth> {
    let pods: ObjectList<Pod> =
        serde_json::from_str(raw).map_err(|_| anyhow!("Failed to parse kubectl output"))?;

    let unhealthy_pods: Vec<UnhealthyPod> = pods
        .items
        .iter()
        .filter(|pod| {
            let phase = pod.status.phase.as_deref().unwrap_or("");
            !HEALTHY_PHASES.contains(&phase)
        })
        .map(|pod| UnhealthyPod {
            name: pod.metadata.name.clone(),
            namespace: pod.metadata.namespace.clone(),
            phase: pod.status.phase.clone(),
        })
        .collect();

    let restart_issues: Vec<RestartIssue> = pods
        .items
        .iter()
        .flat_map(|pod| {
            pod.status
                .container_statuses
                .iter()
                .filter(|c| c.restart_count > RESTART_THRESHOLD)
                .map(move |c| RestartIssue {
                    pod: pod.metadata.name.clone(),
                    namespace: pod.metadata.namespace.clone(),
                    container: c.name.clone(),
                    restarts: c.restart_count,
                })
        })
        .collect();

    Ok(ClusterHealth {
        total_pods: pods.items.len(),
        unhealthy_count: unhealthy_pods.len(),
        unhealthy_pods,
        restart_issue_count: restart_issues.len(),
        restart_issues,
        nodes: None,
        node_count: None,
        nodes_ready: None,
    })
}

fn parse_nodes(raw: &str) -> Option<Vec<NodeStatus>> {
    let nodes: ObjectList<Node> = serde_json::from_str(raw).ok()?;
    Some(
        nodes
            .items
            .into_iter()
            .map(|node| NodeStatus {
                ready: node
                    .status
                    .conditions
                    .iter()
                    .find(|c| c.kind == "Ready")
                    .map(|c| c.status == "True")
                    .unwrap_or(false),
                roles: node
                    .metadata
                    .labels
                    .keys()
                    .filter_map(|label| label.strip_prefix(ROLE_LABEL_PREFIX))
                    .map(str::to_string)
                    .collect(),
                name: node.metadata.name,
            })
            .collect(),
    )
}
