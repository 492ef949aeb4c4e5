pub mod pagination;

pub use pagination::{PageWindow, JIRA_DEFAULT_MAX_RESULTS, JIRA_MAX_RESULTS_CAP};
