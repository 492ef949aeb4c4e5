//! A small JQL subset for `/rest/api/3/search`
//!
//! Supported: clauses joined by `AND` using `=`, `!=`, `~`, `IN`, `NOT IN`,
//! `IS EMPTY` and `IS NOT EMPTY`, plus an optional trailing
//! `ORDER BY field [ASC|DESC]`. Field names and keywords are case-insensitive,
//! as are value comparisons.

use std::cmp::Ordering as CmpOrdering;

use qa_mocks_storage::jira::entities::Issue;
use qa_mocks_storage::jira::lookups;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JqlError {
    #[error("Field '{0}' does not exist or you do not have permission to view it.")]
    UnknownField(String),

    #[error("The operator '{op}' is not supported by the '{field}' field.")]
    UnsupportedOperator { op: String, field: String },

    #[error("Error in the JQL Query: Expecting {expected} but got '{found}'.")]
    Unexpected { expected: &'static str, found: String },

    #[error("Error in the JQL Query: Expecting {0} but reached the end of the query.")]
    UnexpectedEnd(&'static str),

    #[error("Error in the JQL Query: The quoted string starting at character {0} has not been completed.")]
    UnterminatedString(usize),

    #[error("Field '{0}' cannot be used to order results.")]
    UnsortableField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Project,
    Key,
    Status,
    IssueType,
    Priority,
    Assignee,
    Reporter,
    Labels,
    Component,
    Summary,
    Description,
    Text,
}

impl Field {
    fn parse(name: &str) -> Result<Self, JqlError> {
        let field = match name.to_ascii_lowercase().as_str() {
            "project" => Field::Project,
            "key" | "issuekey" | "id" => Field::Key,
            "status" => Field::Status,
            "issuetype" | "type" => Field::IssueType,
            "priority" => Field::Priority,
            "assignee" => Field::Assignee,
            "reporter" => Field::Reporter,
            "labels" | "label" => Field::Labels,
            "component" | "components" => Field::Component,
            "summary" => Field::Summary,
            "description" => Field::Description,
            "text" => Field::Text,
            _ => return Err(JqlError::UnknownField(name.to_string())),
        };
        Ok(field)
    }

    fn is_text(self) -> bool {
        matches!(self, Field::Summary | Field::Description | Field::Text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    In,
    NotIn,
    IsEmpty,
    IsNotEmpty,
}

impl Operator {
    fn symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::Contains => "~",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::IsEmpty => "is empty",
            Operator::IsNotEmpty => "is not empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: Field,
    pub operator: Operator,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Key,
    Created,
    Updated,
    Priority,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: SortField,
    pub descending: bool,
}

/// A parsed query; the empty query matches everything in id order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub clauses: Vec<Clause>,
    pub order: Option<OrderBy>,
}

impl Query {
    pub fn parse(input: &str) -> Result<Self, JqlError> {
        let tokens = tokenize(input)?;
        Parser { tokens, pos: 0 }.query()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        self.clauses.iter().all(|clause| clause.matches(issue))
    }

    /// Sort in place; ties keep ascending id order
    pub fn sort(&self, issues: &mut [Issue]) {
        issues.sort_by_key(|issue| issue.id);
        if let Some(order) = self.order {
            issues.sort_by(|a, b| {
                let ordering = compare(order.field, a, b);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
    }

    /// Filter and sort a full issue list
    pub fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        let mut matched: Vec<Issue> = issues.into_iter().filter(|issue| self.matches(issue)).collect();
        self.sort(&mut matched);
        matched
    }
}

impl Clause {
    fn matches(&self, issue: &Issue) -> bool {
        match self.field {
            Field::Labels => self.matches_set(&issue.label_list()),
            Field::Component => self.matches_set(&issue.component_list()),
            Field::Summary => self.matches_text(&[issue.summary.clone()]),
            Field::Description => self.matches_text(&[description_text(issue)]),
            Field::Text => self.matches_text(&[issue.summary.clone(), description_text(issue)]),
            Field::Project => self.matches_single(Some(&issue.project_key)),
            Field::Key => self.matches_identity(issue),
            Field::Status => self.matches_single(Some(&issue.status)),
            Field::IssueType => self.matches_single(Some(&issue.issue_type)),
            Field::Priority => self.matches_single(Some(&issue.priority)),
            Field::Assignee => self.matches_single(issue.assignee.as_ref()),
            Field::Reporter => self.matches_single(issue.reporter.as_ref()),
        }
    }

    fn matches_single(&self, actual: Option<&String>) -> bool {
        let equals_any = |actual: &str| self.values.iter().any(|v| v.eq_ignore_ascii_case(actual));
        match self.operator {
            Operator::Equals | Operator::In => actual.is_some_and(|a| equals_any(a)),
            Operator::NotEquals | Operator::NotIn => actual.is_some_and(|a| !equals_any(a)),
            Operator::IsEmpty => actual.is_none_or(|a| a.is_empty()),
            Operator::IsNotEmpty => actual.is_some_and(|a| !a.is_empty()),
            Operator::Contains => false,
        }
    }

    /// `key`/`id` values name an issue by key or by numeric id
    fn matches_identity(&self, issue: &Issue) -> bool {
        let id = issue.id.to_string();
        let names_issue = |value: &String| value.eq_ignore_ascii_case(&issue.key) || *value == id;
        match self.operator {
            Operator::Equals | Operator::In => self.values.iter().any(names_issue),
            Operator::NotEquals | Operator::NotIn => !self.values.iter().any(names_issue),
            Operator::IsEmpty | Operator::Contains => false,
            Operator::IsNotEmpty => true,
        }
    }

    fn matches_set(&self, actual: &[String]) -> bool {
        let contains = |value: &String| actual.iter().any(|a| a.eq_ignore_ascii_case(value));
        match self.operator {
            Operator::Equals | Operator::In => self.values.iter().any(contains),
            Operator::NotEquals | Operator::NotIn => !self.values.iter().any(contains),
            Operator::IsEmpty => actual.is_empty(),
            Operator::IsNotEmpty => !actual.is_empty(),
            Operator::Contains => false,
        }
    }

    fn matches_text(&self, haystacks: &[String]) -> bool {
        let needle = self.values.first().map(|v| v.to_lowercase()).unwrap_or_default();
        match self.operator {
            Operator::Contains => haystacks.iter().any(|h| h.to_lowercase().contains(&needle)),
            Operator::IsEmpty => haystacks.iter().all(|h| h.is_empty()),
            Operator::IsNotEmpty => haystacks.iter().any(|h| !h.is_empty()),
            _ => false,
        }
    }
}

/// Plain text of a description stored as a string or an ADF document
pub fn description_text(issue: &Issue) -> String {
    fn collect(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => out.push(s.clone()),
            Value::Object(map) => {
                if let Some(Value::String(text)) = map.get("text") {
                    out.push(text.clone());
                }
                if let Some(content) = map.get("content") {
                    collect(content, out);
                }
            }
            Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
            _ => {}
        }
    }

    let mut parts = Vec::new();
    if let Some(description) = &issue.description {
        collect(description, &mut parts);
    }
    parts.join(" ")
}

fn compare(field: SortField, a: &Issue, b: &Issue) -> CmpOrdering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Key => (&a.project_key, a.number).cmp(&(&b.project_key, b.number)),
        SortField::Created => a.created_at.cmp(&b.created_at),
        SortField::Updated => a.updated_at.cmp(&b.updated_at),
        // Ascending runs from the least to the most urgent
        SortField::Priority => priority_rank(&b.priority).cmp(&priority_rank(&a.priority)),
        SortField::Summary => a.summary.to_lowercase().cmp(&b.summary.to_lowercase()),
    }
}

fn priority_rank(name: &str) -> u8 {
    lookups::priority(name).map(|p| p.rank).unwrap_or(u8::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Equals,
    NotEquals,
    Tilde,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Quoted(q) => format!("\"{}\"", q),
            Token::Equals => "=".into(),
            Token::NotEquals => "!=".into(),
            Token::Tilde => "~".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Comma => ",".into(),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, JqlError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '=' => {
                tokens.push(Token::Equals);
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::NotEquals);
                i += 2;
            }
            '~' => {
                tokens.push(Token::Tilde);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '"' | '\'' => {
                let start = i;
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(JqlError::UnterminatedString(start)),
                        Some('\\') if i + 1 < chars.len() => {
                            value.push(chars[i + 1]);
                            i += 2;
                        }
                        Some(&q) if q == c => {
                            i += 1;
                            break;
                        }
                        Some(&other) => {
                            value.push(other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Quoted(value));
            }
            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() && !"=!~(),\"'".contains(chars[i]) {
                    i += 1;
                }
                if start == i {
                    return Err(JqlError::Unexpected {
                        expected: "a field, operator or value",
                        found: c.to_string(),
                    });
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self, expected: &'static str) -> Result<Token, JqlError> {
        let token = self.tokens.get(self.pos).cloned().ok_or(JqlError::UnexpectedEnd(expected))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), JqlError> {
        let token = self.next(keyword)?;
        if token.is_keyword(keyword) {
            Ok(())
        } else {
            Err(JqlError::Unexpected { expected: keyword, found: token.describe() })
        }
    }

    fn query(mut self) -> Result<Query, JqlError> {
        let mut query = Query::default();

        if self.peek().is_some_and(|t| !t.is_keyword("ORDER")) {
            query.clauses.push(self.clause()?);
            while self.peek().is_some_and(|t| t.is_keyword("AND")) {
                self.pos += 1;
                query.clauses.push(self.clause()?);
            }
        }

        if self.peek().is_some() {
            self.expect_keyword("ORDER")?;
            self.expect_keyword("BY")?;
            query.order = Some(self.order_by()?);
        }

        if let Some(extra) = self.peek() {
            return Err(JqlError::Unexpected { expected: "AND or ORDER BY", found: extra.describe() });
        }

        Ok(query)
    }

    fn clause(&mut self) -> Result<Clause, JqlError> {
        let field = match self.next("a field name")? {
            Token::Word(name) | Token::Quoted(name) => Field::parse(&name)?,
            other => return Err(JqlError::Unexpected { expected: "a field name", found: other.describe() }),
        };

        let operator = match self.next("an operator")? {
            Token::Equals => Operator::Equals,
            Token::NotEquals => Operator::NotEquals,
            Token::Tilde => Operator::Contains,
            token if token.is_keyword("IN") => Operator::In,
            token if token.is_keyword("NOT") => {
                self.expect_keyword("IN")?;
                Operator::NotIn
            }
            token if token.is_keyword("IS") => {
                if self.peek().is_some_and(|t| t.is_keyword("NOT")) {
                    self.pos += 1;
                    self.empty_keyword()?;
                    Operator::IsNotEmpty
                } else {
                    self.empty_keyword()?;
                    Operator::IsEmpty
                }
            }
            other => return Err(JqlError::Unexpected { expected: "an operator", found: other.describe() }),
        };

        let supported = match operator {
            Operator::Contains => field.is_text(),
            Operator::IsEmpty | Operator::IsNotEmpty => true,
            _ => !field.is_text(),
        };
        if !supported {
            return Err(JqlError::UnsupportedOperator {
                op: operator.symbol().to_string(),
                field: format!("{:?}", field).to_lowercase(),
            });
        }

        let values = match operator {
            Operator::In | Operator::NotIn => self.value_list()?,
            Operator::IsEmpty | Operator::IsNotEmpty => Vec::new(),
            _ => vec![self.value()?],
        };

        Ok(Clause { field, operator, values })
    }

    fn empty_keyword(&mut self) -> Result<(), JqlError> {
        let token = self.next("EMPTY")?;
        if token.is_keyword("EMPTY") || token.is_keyword("NULL") {
            Ok(())
        } else {
            Err(JqlError::Unexpected { expected: "EMPTY", found: token.describe() })
        }
    }

    fn value(&mut self) -> Result<String, JqlError> {
        match self.next("a value")? {
            Token::Word(value) | Token::Quoted(value) => Ok(value),
            other => Err(JqlError::Unexpected { expected: "a value", found: other.describe() }),
        }
    }

    fn value_list(&mut self) -> Result<Vec<String>, JqlError> {
        match self.next("(")? {
            Token::LParen => {}
            other => return Err(JqlError::Unexpected { expected: "(", found: other.describe() }),
        }

        let mut values = vec![self.value()?];
        loop {
            match self.next(")")? {
                Token::Comma => values.push(self.value()?),
                Token::RParen => return Ok(values),
                other => return Err(JqlError::Unexpected { expected: "',' or ')'", found: other.describe() }),
            }
        }
    }

    fn order_by(&mut self) -> Result<OrderBy, JqlError> {
        let name = match self.next("a field name")? {
            Token::Word(name) | Token::Quoted(name) => name,
            other => return Err(JqlError::Unexpected { expected: "a field name", found: other.describe() }),
        };
        let field = match name.to_ascii_lowercase().as_str() {
            "id" => SortField::Id,
            "key" | "issuekey" => SortField::Key,
            "created" => SortField::Created,
            "updated" => SortField::Updated,
            "priority" => SortField::Priority,
            "summary" => SortField::Summary,
            _ => return Err(JqlError::UnsortableField(name)),
        };

        let descending = match self.peek() {
            Some(t) if t.is_keyword("DESC") => {
                self.pos += 1;
                true
            }
            Some(t) if t.is_keyword("ASC") => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        Ok(OrderBy { field, descending })
    }
}
