//! Static TestRail lookups: result statuses, case types, priorities and templates

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultStatus {
    pub id: i32,
    /// System name, lowercase
    pub name: &'static str,
    pub label: &'static str,
    pub is_untested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseType {
    pub id: i32,
    pub name: &'static str,
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasePriority {
    pub id: i32,
    pub name: &'static str,
    pub short_name: &'static str,
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: i32,
    pub name: &'static str,
    pub is_default: bool,
}

pub const STATUS_PASSED: i32 = 1;
pub const STATUS_BLOCKED: i32 = 2;
pub const STATUS_UNTESTED: i32 = 3;
pub const STATUS_RETEST: i32 = 4;
pub const STATUS_FAILED: i32 = 5;

pub const STATUSES: &[ResultStatus] = &[
    ResultStatus { id: STATUS_PASSED, name: "passed", label: "Passed", is_untested: false },
    ResultStatus { id: STATUS_BLOCKED, name: "blocked", label: "Blocked", is_untested: false },
    ResultStatus { id: STATUS_UNTESTED, name: "untested", label: "Untested", is_untested: true },
    ResultStatus { id: STATUS_RETEST, name: "retest", label: "Retest", is_untested: false },
    ResultStatus { id: STATUS_FAILED, name: "failed", label: "Failed", is_untested: false },
];

pub const CASE_TYPES: &[CaseType] = &[
    CaseType { id: 1, name: "Functional", is_default: true },
    CaseType { id: 2, name: "Regression", is_default: false },
    CaseType { id: 3, name: "Smoke", is_default: false },
    CaseType { id: 4, name: "Performance", is_default: false },
    CaseType { id: 5, name: "Security", is_default: false },
];

pub const PRIORITIES: &[CasePriority] = &[
    CasePriority { id: 1, name: "Critical", short_name: "Crit", is_default: false },
    CasePriority { id: 2, name: "High", short_name: "High", is_default: true },
    CasePriority { id: 3, name: "Medium", short_name: "Med", is_default: false },
    CasePriority { id: 4, name: "Low", short_name: "Low", is_default: false },
];

pub const TEMPLATES: &[Template] = &[
    Template { id: 1, name: "Test Case (Text)", is_default: true },
    Template { id: 2, name: "Test Case (Steps)", is_default: false },
    Template { id: 3, name: "Exploratory Session", is_default: false },
];

pub const DEFAULT_TEMPLATE_ID: i32 = 1;
pub const DEFAULT_TYPE_ID: i32 = 1;
pub const DEFAULT_PRIORITY_ID: i32 = 2;

pub fn status(id: i32) -> Option<&'static ResultStatus> {
    STATUSES.iter().find(|s| s.id == id)
}

pub fn case_type(id: i32) -> Option<&'static CaseType> {
    CASE_TYPES.iter().find(|t| t.id == id)
}

pub fn priority(id: i32) -> Option<&'static CasePriority> {
    PRIORITIES.iter().find(|p| p.id == id)
}

pub fn template(id: i32) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_default_per_table() {
        assert_eq!(CASE_TYPES.iter().filter(|t| t.is_default).count(), 1);
        assert_eq!(PRIORITIES.iter().filter(|p| p.is_default).count(), 1);
        assert_eq!(TEMPLATES.iter().filter(|t| t.is_default).count(), 1);

        assert!(case_type(DEFAULT_TYPE_ID).unwrap().is_default);
        assert!(priority(DEFAULT_PRIORITY_ID).unwrap().is_default);
        assert!(template(DEFAULT_TEMPLATE_ID).unwrap().is_default);
    }

    #[test]
    fn test_status_lookup() {
        assert_eq!(status(STATUS_FAILED).unwrap().label, "Failed");
        assert!(status(STATUS_UNTESTED).unwrap().is_untested);
        assert!(status(0).is_none());
        assert!(status(6).is_none());
    }
}
