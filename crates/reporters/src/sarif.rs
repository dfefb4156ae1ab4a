//! Conversion of issues to SARIF 2.1.0 specification.

use ir::{Issue, Severity};
use serde_sarif::sarif;

fn level(sev: Severity) -> sarif::ResultLevel {
    match sev {
        Severity::Info | Severity::Low => sarif::ResultLevel::Note,
        Severity::Medium => sarif::ResultLevel::Warning,
        Severity::High | Severity::Critical => sarif::ResultLevel::Error,
    }
}

pub fn to_sarif(issues: &[Issue]) -> sarif::Sarif {
    let results: Vec<sarif::Result> = issues
        .iter()
        .map(|i| {
            let location = sarif::Location::builder()
                .physical_location(
                    sarif::PhysicalLocation::builder()
                        .artifact_location(
                            sarif::ArtifactLocation::builder()
                                .uri(i.file.display().to_string().replace('\\', "/"))
                                .build(),
                        )
                        .region(
                            sarif::Region::builder()
                                .start_line(i.line as i64)
                                .start_column(i.column as i64)
                                .build(),
                        )
                        .build(),
                )
                .build();

            let text = match &i.suggestion {
                Some(s) => format!("{} ({s})", i.message),
                None => i.message.clone(),
            };

            sarif::Result::builder()
                .rule_id(i.rule_id.clone())
                .message(sarif::Message::builder().text(text).build())
                .level(level(i.severity))
                .locations(vec![location])
                .build()
        })
        .collect();

    sarif::Sarif::builder()
        .version(serde_json::json!("2.1.0"))
        .schema(sarif::SCHEMA_URL.to_string())
        .runs(vec![sarif::Run::builder()
            .tool(
                sarif::Tool::builder()
                    .driver(sarif::ToolComponent::builder().name("taintmap").build())
                    .build(),
            )
            .results(results)
            .build()])
        .build()
}
