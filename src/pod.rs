//! Descriptive pod metadata from the Kubernetes Downward API.

use serde::Serialize;

/// Value shown when a variable is not set
pub const UNKNOWN: &str = "unknown";

/// Pod identity shown on the dashboard and in the status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodInfo {
    pub pod_name: String,
    pub pod_ip: String,
    pub node_name: String,
    pub namespace: String,
}

impl PodInfo {
    /// Read pod metadata from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            pod_name: get("POD_NAME")
                .or_else(|| get("HOSTNAME"))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            pod_ip: get("POD_IP").unwrap_or_else(|| UNKNOWN.to_string()),
            node_name: get("NODE_NAME").unwrap_or_else(|| UNKNOWN.to_string()),
            namespace: get("POD_NAMESPACE").unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_all_variables_present() {
        let info = PodInfo::from_lookup(lookup(&[
            ("POD_NAME", "probe-demo-7f9c"),
            ("POD_IP", "10.1.2.3"),
            ("NODE_NAME", "worker-1"),
            ("POD_NAMESPACE", "demo"),
        ]));
        assert_eq!(info.pod_name, "probe-demo-7f9c");
        assert_eq!(info.pod_ip, "10.1.2.3");
        assert_eq!(info.node_name, "worker-1");
        assert_eq!(info.namespace, "demo");
    }

    #[test]
    fn test_pod_name_falls_back_to_hostname() {
        let info = PodInfo::from_lookup(lookup(&[("HOSTNAME", "box")]));
        assert_eq!(info.pod_name, "box");
    }

    #[test]
    fn test_missing_and_empty_are_unknown() {
        let info = PodInfo::from_lookup(lookup(&[("POD_IP", "")]));
        assert_eq!(info.pod_name, UNKNOWN);
        assert_eq!(info.pod_ip, UNKNOWN);
        assert_eq!(info.node_name, UNKNOWN);
        assert_eq!(info.namespace, UNKNOWN);
    }
}
