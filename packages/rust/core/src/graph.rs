//! Knowledge-graph updates for changed files.
//!
//! Turns a [`FileRecord`] into entity, relation, and activity payloads and
//! forwards them through a [`RemoteExecutor`]. Every method reports whether a
//! call was delivered; an unavailable graph only means the update is skipped.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::json;
use tracing::{instrument, warn};

use codecache_extract::{base_name, extract_file, python_import_modules, read_source};
use codecache_shared::FileRecord;

use crate::remote::{RemoteExecutor, deliver};

const CREATE_ENTITIES: &str = "mcp__memory__create_entities";
const ADD_OBSERVATIONS: &str = "mcp__memory__add_observations";
const CREATE_RELATIONS: &str = "mcp__memory__create_relations";

/// How many observations are quoted in an edit summary.
const EDIT_PREVIEW_LEN: usize = 3;

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityAction {
    Create,
    Edit,
}

/// A graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub entity_type: String,
    pub observations: Vec<String>,
}

/// Observations appended to an existing node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationUpdate {
    pub entity_name: String,
    pub contents: Vec<String>,
}

/// A directed edge between a file and something it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub relation_type: String,
}

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

/// Entity describing a newly created file.
pub fn file_entity(record: &FileRecord) -> Entity {
    let mut observations = vec![
        format!("File path: {}", record.path),
        format!("Language: {}", record.language),
        format!("Component type: {}", record.component_type),
    ];
    observations.extend(record.observations.iter().cloned());

    Entity {
        name: record.name.clone(),
        entity_type: record.component_type.to_string(),
        observations,
    }
}

/// Observation summarising an edit to an existing file.
pub fn edit_observation(record: &FileRecord) -> ObservationUpdate {
    let mut observation = format!(
        "Modified {} - {} elements detected",
        record.path,
        record.observations.len()
    );
    if !record.observations.is_empty() {
        let preview: Vec<&str> = record
            .observations
            .iter()
            .take(EDIT_PREVIEW_LEN)
            .map(String::as_str)
            .collect();
        observation.push_str(": ");
        observation.push_str(&preview.join(", "));
    }

    ObservationUpdate {
        entity_name: record.name.clone(),
        contents: vec![observation],
    }
}

/// Import relations for a Python file; other files have none.
pub fn import_relations(path: &str, content: &str) -> Vec<Relation> {
    if !path.ends_with(".py") {
        return Vec::new();
    }

    let from = base_name(path);
    python_import_modules(content)
        .into_iter()
        .map(|module| Relation {
            from: from.to_string(),
            to: module,
            relation_type: "imports".into(),
        })
        .collect()
}

/// Entity recording a development activity at `now`.
pub fn activity_entity(
    action: &str,
    path: &str,
    project: &str,
    details: &str,
    now: DateTime<Local>,
) -> Entity {
    Entity {
        name: format!("Activity_{action}_{}_{}", base_name(path), now.timestamp()),
        entity_type: "activity".into(),
        observations: vec![
            format!("Action: {action}"),
            format!("File: {path}"),
            format!("Project: {project}"),
            format!("Details: {details}"),
            format!("Timestamp: {}", now.format("%Y-%m-%d %H:%M:%S")),
        ],
    }
}

// ---------------------------------------------------------------------------
// Integrator
// ---------------------------------------------------------------------------

/// Sends file and activity updates to the knowledge graph.
pub struct GraphIntegrator<E> {
    executor: E,
    project: String,
}

impl<E: RemoteExecutor> GraphIntegrator<E> {
    pub fn new(executor: E, project: impl Into<String>) -> Self {
        Self {
            executor,
            project: project.into(),
        }
    }

    /// Create an entity for a new file, or add an edit observation to an
    /// existing one. Skipped when the file has no readable content.
    #[instrument(skip(self, content))]
    pub fn record_entity(&self, path: &str, action: EntityAction, content: Option<&str>) -> bool {
        let record = extract_file(path, content);
        if !record.analyzed {
            warn!(file = path, "no component info extracted");
            return false;
        }

        match action {
            EntityAction::Create => deliver(
                &self.executor,
                CREATE_ENTITIES,
                json!({ "entities": [file_entity(&record)] }),
            ),
            EntityAction::Edit => deliver(
                &self.executor,
                ADD_OBSERVATIONS,
                json!({ "observations": [edit_observation(&record)] }),
            ),
        }
    }

    /// Record the file's import relations, if it has any.
    #[instrument(skip(self, content))]
    pub fn record_relationships(&self, path: &str, content: Option<&str>) -> bool {
        let owned;
        let content = match content {
            Some(c) => c,
            None => {
                owned = read_source(path).unwrap_or_default();
                owned.as_str()
            }
        };

        let relations = import_relations(path, content);
        if relations.is_empty() {
            return false;
        }

        deliver(
            &self.executor,
            CREATE_RELATIONS,
            json!({ "relations": relations }),
        )
    }

    /// Record a development activity on `path`.
    pub fn record_activity(&self, action: &str, path: &str, details: &str) -> bool {
        let entity = activity_entity(action, path, &self.project, details, Local::now());
        deliver(
            &self.executor,
            CREATE_ENTITIES,
            json!({ "entities": [entity] }),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use codecache_shared::{ComponentType, Language};

    use super::*;
    use crate::test_support::RecordingExecutor;

    fn record(observations: &[&str]) -> FileRecord {
        FileRecord {
            name: "routes.py".into(),
            path: "src/api/routes.py".into(),
            component_type: ComponentType::Api,
            language: Language::Python,
            observations: observations.iter().map(|s| s.to_string()).collect(),
            analyzed: true,
        }
    }

    #[test]
    fn entity_lists_metadata_before_observations() {
        let entity = file_entity(&record(&["Defines function: index"]));
        assert_eq!(entity.name, "routes.py");
        assert_eq!(entity.entity_type, "api");
        assert_eq!(
            entity.observations,
            vec![
                "File path: src/api/routes.py",
                "Language: python",
                "Component type: api",
                "Defines function: index",
            ]
        );
    }

    #[test]
    fn edit_observation_previews_three_elements() {
        let update = edit_observation(&record(&["a", "b", "c", "d"]));
        assert_eq!(update.entity_name, "routes.py");
        assert_eq!(
            update.contents,
            vec!["Modified src/api/routes.py - 4 elements detected: a, b, c"]
        );

        let update = edit_observation(&record(&[]));
        assert_eq!(
            update.contents,
            vec!["Modified src/api/routes.py - 0 elements detected"]
        );
    }

    #[test]
    fn relations_only_for_python() {
        let content = "from flask import Flask\nfrom .local import x\n";
        let relations = import_relations("app/main.py", content);
        assert_eq!(
            relations,
            vec![Relation {
                from: "main.py".into(),
                to: "flask".into(),
                relation_type: "imports".into(),
            }]
        );

        assert!(import_relations("app/main.js", content).is_empty());
    }

    #[test]
    fn activity_entity_is_stamped() {
        let now = Local.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let entity =
            activity_entity("log_activity", "src/app.py", "billing", "File operation", now);

        assert_eq!(entity.entity_type, "activity");
        assert_eq!(entity.name, format!("Activity_log_activity_app.py_{}", now.timestamp()));
        assert_eq!(entity.observations[2], "Project: billing");
        assert_eq!(entity.observations[4], "Timestamp: 2026-03-01 12:30:00");
    }

    #[test]
    fn create_sends_entity_payload() {
        let exec = RecordingExecutor::available();
        let graph = GraphIntegrator::new(&exec, "billing");

        let content = "class User:\n    pass\n";
        assert!(graph.record_entity("src/models.py", EntityAction::Create, Some(content)));

        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, CREATE_ENTITIES);
        let entity = &calls[0].1["entities"][0];
        assert_eq!(entity["name"], "models.py");
        assert_eq!(entity["entityType"], "model");
        assert_eq!(entity["observations"][3], "Defines class: User");
    }

    #[test]
    fn edit_sends_observation_payload() {
        let exec = RecordingExecutor::available();
        let graph = GraphIntegrator::new(&exec, "billing");

        assert!(graph.record_entity("main.go", EntityAction::Edit, Some("func main() {}\n")));

        let calls = exec.calls();
        assert_eq!(calls[0].0, ADD_OBSERVATIONS);
        assert_eq!(calls[0].1["observations"][0]["entityName"], "main.go");
        assert_eq!(
            calls[0].1["observations"][0]["contents"][0],
            "Modified main.go - 1 elements detected: Defines function: main"
        );
    }

    #[test]
    fn empty_content_skips_entity() {
        let exec = RecordingExecutor::available();
        let graph = GraphIntegrator::new(&exec, "billing");

        assert!(!graph.record_entity("src/app.py", EntityAction::Create, Some("")));
        assert!(!graph.record_entity("/nonexistent/app.py", EntityAction::Create, None));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn unavailable_graph_is_skipped() {
        let exec = RecordingExecutor::unavailable();
        let graph = GraphIntegrator::new(&exec, "billing");

        assert!(!graph.record_entity("src/app.py", EntityAction::Create, Some("x = 1\n")));
        assert!(!graph.record_activity("log_activity", "src/app.py", "details"));
        assert!(!graph.record_relationships("src/app.py", Some("from os import path\n")));
    }

    #[test]
    fn relationships_sent_when_found() {
        let exec = RecordingExecutor::available();
        let graph = GraphIntegrator::new(&exec, "billing");

        assert!(!graph.record_relationships("src/app.py", Some("import os\n")));
        assert!(graph.record_relationships("src/app.py", Some("from os import path\n")));

        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, CREATE_RELATIONS);
        assert_eq!(calls[0].1["relations"][0]["relationType"], "imports");
        assert_eq!(calls[0].1["relations"][0]["to"], "os");
    }
}
