//! Job definition.

use serde::{Deserialize, Serialize};

/// What to scrape: page, element selector and extraction instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeTarget {
    /// Page URL.
    pub href: String,
    /// CSS selector of the elements whose text is extracted.
    pub selector: String,
    /// Natural-language description of the data to extract.
    #[serde(default)]
    pub description: String,
}

impl ScrapeTarget {
    pub fn new(
        href: impl Into<String>,
        selector: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            href: href.into(),
            selector: selector.into(),
            description: description.into(),
        }
    }
}

/// A user-defined scraping job, owned by the job store.
///
/// The scheduler only ever holds read-only snapshots of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Unique, opaque job ID.
    pub id: String,
    /// Cron trigger expression.
    #[serde(rename = "cron_schedule", alias = "schedule")]
    pub schedule: String,
    /// Scrape parameters.
    #[serde(flatten)]
    pub target: ScrapeTarget,
}

impl JobDefinition {
    /// Create a new job definition.
    pub fn new(id: impl Into<String>, schedule: impl Into<String>, target: ScrapeTarget) -> Self {
        Self {
            id: id.into(),
            schedule: schedule.into(),
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ScrapeTarget {
        ScrapeTarget::new("https://example.com", "h1", "the page title")
    }

    #[test]
    fn test_job_definition_new() {
        let def = JobDefinition::new("j1", "*/5 * * * *", target());
        assert_eq!(def.id, "j1");
        assert_eq!(def.schedule, "*/5 * * * *");
        assert_eq!(def.target.selector, "h1");
    }

    #[test]
    fn test_job_definition_wire_format() {
        let def = JobDefinition::new("j1", "0 9 * * 1-5", target());
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["id"], "j1");
        assert_eq!(json["cron_schedule"], "0 9 * * 1-5");
        assert_eq!(json["href"], "https://example.com");
        assert_eq!(json["description"], "the page title");
        assert!(json.get("target").is_none());
    }

    #[test]
    fn test_job_definition_accepts_schedule_alias() {
        let json = serde_json::json!({
            "id": "j2",
            "schedule": "0 * * * *",
            "href": "https://example.com/news",
            "selector": ".headline"
        });
        let def: JobDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(def.schedule, "0 * * * *");
        assert_eq!(def.target.description, "");
    }
}
