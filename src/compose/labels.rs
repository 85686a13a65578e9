// ABOUTME: docker-compose label conventions for containers and networks.
// ABOUTME: Lets the adapter find projects deployed by itself or by docker-compose.

use crate::runtime::ContainerFilters;
use crate::types::ProjectName;
use std::collections::HashMap;

pub const PROJECT: &str = "com.docker.compose.project";
pub const SERVICE: &str = "com.docker.compose.service";
pub const ONEOFF: &str = "com.docker.compose.oneoff";
pub const CONTAINER_NUMBER: &str = "com.docker.compose.container-number";
pub const NETWORK: &str = "com.docker.compose.network";

/// Every container of a project, stopped and one-off ones included.
pub fn project_filter(project: &ProjectName) -> ContainerFilters {
    ContainerFilters::default()
        .label(PROJECT, project.label())
        .all()
}

/// Labels identifying the single regular container of a service.
pub fn service_labels(project: &ProjectName, service: &str) -> HashMap<String, String> {
    HashMap::from([
        (PROJECT.to_string(), project.label().to_string()),
        (SERVICE.to_string(), service.to_string()),
        (ONEOFF.to_string(), "False".to_string()),
        (CONTAINER_NUMBER.to_string(), "1".to_string()),
    ])
}

pub fn network_labels(project: &ProjectName, network: &str) -> HashMap<String, String> {
    HashMap::from([
        (PROJECT.to_string(), project.label().to_string()),
        (NETWORK.to_string(), network.to_string()),
    ])
}

/// Whether the labels mark a one-off (`compose run`) container.
pub fn is_oneoff(labels: &HashMap<String, String>) -> bool {
    labels.get(ONEOFF).is_some_and(|v| v == "True")
}
