//! Fixed Jira lookup tables
//!
//! Issue types, priorities, statuses and workflow transitions never change at
//! runtime, so they live here as constants instead of in the database.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueType {
    pub id: &'static str,
    pub name: &'static str,
    pub subtask: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub id: &'static str,
    pub name: &'static str,
    /// 1 is most urgent
    pub rank: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub id: &'static str,
    pub name: &'static str,
    pub category_key: &'static str,
    pub category_name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub id: &'static str,
    pub name: &'static str,
    /// Status name the issue moves to
    pub to: &'static str,
}

pub const ISSUE_TYPES: &[IssueType] = &[
    IssueType { id: "10000", name: "Epic", subtask: false },
    IssueType { id: "10001", name: "Bug", subtask: false },
    IssueType { id: "10002", name: "Task", subtask: false },
    IssueType { id: "10003", name: "Story", subtask: false },
    IssueType { id: "10004", name: "Subtask", subtask: true },
];

pub const PRIORITIES: &[Priority] = &[
    Priority { id: "1", name: "Highest", rank: 1 },
    Priority { id: "2", name: "High", rank: 2 },
    Priority { id: "3", name: "Medium", rank: 3 },
    Priority { id: "4", name: "Low", rank: 4 },
    Priority { id: "5", name: "Lowest", rank: 5 },
];

pub const DEFAULT_PRIORITY: &str = "Medium";

pub const STATUSES: &[Status] = &[
    Status { id: "10000", name: "To Do", category_key: "new", category_name: "To Do" },
    Status { id: "3", name: "In Progress", category_key: "indeterminate", category_name: "In Progress" },
    Status { id: "10001", name: "Done", category_key: "done", category_name: "Done" },
];

/// Status every new issue starts in
pub const INITIAL_STATUS: &str = "To Do";

pub const TRANSITIONS: &[Transition] = &[
    Transition { id: "11", name: "To Do", to: "To Do" },
    Transition { id: "21", name: "In Progress", to: "In Progress" },
    Transition { id: "31", name: "Done", to: "Done" },
];

/// Issue type by name (case-insensitive) or id
pub fn issue_type(name_or_id: &str) -> Option<&'static IssueType> {
    ISSUE_TYPES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name_or_id) || t.id == name_or_id)
}

/// Priority by name (case-insensitive) or id
pub fn priority(name_or_id: &str) -> Option<&'static Priority> {
    PRIORITIES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name_or_id) || p.id == name_or_id)
}

/// Status by name (case-insensitive) or id
pub fn status(name_or_id: &str) -> Option<&'static Status> {
    STATUSES
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name_or_id) || s.id == name_or_id)
}

pub fn transition(id: &str) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.id == id)
}

/// Transitions available from `current`: every status except the current one
pub fn transitions_from(current: &str) -> impl Iterator<Item = &'static Transition> + '_ {
    TRANSITIONS.iter().filter(move |t| !t.to.eq_ignore_ascii_case(current))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_id() {
        assert_eq!(issue_type("bug").unwrap().id, "10001");
        assert_eq!(issue_type("10003").unwrap().name, "Story");
        assert!(issue_type("Incident").is_none());

        assert_eq!(priority("HIGH").unwrap().rank, 2);
        assert_eq!(priority("5").unwrap().name, "Lowest");
        assert!(priority(DEFAULT_PRIORITY).is_some());

        assert_eq!(status("in progress").unwrap().category_key, "indeterminate");
        assert!(status(INITIAL_STATUS).is_some());
    }

    #[test]
    fn test_transitions() {
        assert_eq!(transition("31").unwrap().to, "Done");
        assert!(transition("41").is_none());

        let available: Vec<_> = transitions_from("To Do").map(|t| t.id).collect();
        assert_eq!(available, vec!["21", "31"]);
    }
}
