//! Filename-based component classification.

use codecache_shared::ComponentType;

use crate::base_name;

const INFRASTRUCTURE_FILES: [&str; 3] = ["dockerfile", "docker-compose.yml", "docker-compose.yaml"];

const CONFIGURATION_FILES: [&str; 4] = ["package.json", "requirements.txt", "go.mod", "cargo.toml"];

/// Classify the role of `path` from its lower-cased base name.
///
/// Rules are ordered and the first match wins, so `test_service.py` is a
/// test rather than a service.
pub fn classify(path: &str) -> ComponentType {
    let name = base_name(path).to_lowercase();
    let has = |needle: &str| name.contains(needle);

    if has("test") || has("spec") {
        ComponentType::Test
    } else if name.ends_with(".md") {
        ComponentType::Documentation
    } else if INFRASTRUCTURE_FILES.contains(&name.as_str()) {
        ComponentType::Infrastructure
    } else if CONFIGURATION_FILES.contains(&name.as_str()) {
        ComponentType::Configuration
    } else if has("api") || has("route") {
        ComponentType::Api
    } else if has("model") || has("schema") {
        ComponentType::Model
    } else if has("service") {
        ComponentType::Service
    } else if has("util") || has("helper") {
        ComponentType::Utility
    } else {
        ComponentType::Component
    }
}
