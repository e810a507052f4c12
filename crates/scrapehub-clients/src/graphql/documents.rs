//! Fixed GraphQL documents. Parameters are always passed as variables.

pub const LIST_JOBS: &str = r#"
query ListScrapingJobs {
  scrapingJobs {
    id
    cron_schedule
    href
    selector
    description
  }
}
"#;

pub const GET_JOB: &str = r#"
query GetScrapingJob($id: ID!) {
  scrapingJob(id: $id) {
    id
    cron_schedule
    href
    selector
    description
  }
}
"#;

pub const LIST_HISTORY: &str = r#"
query ListScrapingJobHistories($id: ID!) {
  scrapingJob(id: $id) {
    histories {
      id
      scraping_job_id
      started_at
      ended_at
      successful
      content
    }
  }
}
"#;

pub const CREATE_HISTORY: &str = r#"
mutation CreateScrapingJobHistory($input: ScrapingJobHistoryInput!) {
  createScrapingJobHistory(input: $input) {
    id
  }
}
"#;
