//! Typed pipeline model: predicates, stages and the pipeline itself.

use std::fmt;

/// Literal a predicate compares against
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    Number(f64),
    String(String),
    Bool(bool),
}

/// Condition on a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals value
    Eq(PredicateValue),
    /// Field does not equal value (also true when the field is absent)
    Ne(PredicateValue),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
    /// Field is a string matching the pattern
    Regex(String),
    /// Field is not a string matching the pattern
    NotRegex(String),
}

/// A predicate bound to the field it tests
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub predicate: Predicate,
}

impl FieldPredicate {
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `asc` is ascending; every other token is descending
    pub fn from_token(token: &str) -> Self {
        if token == "asc" {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    /// Numeric form used by aggregation documents
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse `"<field> <asc|desc>"`. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace();
        let field = parts.next()?;
        let direction = SortDirection::from_token(parts.next().unwrap_or_default());

        Some(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Window applied by the data branch of the fan-out stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u64,
}

/// One unit of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Full-text search over every indexed field
    Search { query: String },
    /// Conjunction of field predicates
    Match(Vec<FieldPredicate>),
    /// Order the working set
    Sort(SortSpec),
    /// Split into a paginated data branch and an unbounded count branch
    PageAndCount(PageWindow),
}

/// Stage kind, used for diagnostics and ordering checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StageKind {
    Search,
    Match,
    Sort,
    PageAndCount,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Search => "search",
            StageKind::Match => "match",
            StageKind::Sort => "sort",
            StageKind::PageAndCount => "facet",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Search { .. } => StageKind::Search,
            Stage::Match(_) => StageKind::Match,
            Stage::Sort(_) => StageKind::Sort,
            Stage::PageAndCount(_) => StageKind::PageAndCount,
        }
    }
}

/// Ordered sequence of stages submitted to the store as one unit.
///
/// Built only by the composer; stages cannot be modified once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub(crate) fn from_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(Stage::kind).collect()
    }

    /// The fan-out window, if the pipeline ends in one
    pub fn window(&self) -> Option<PageWindow> {
        match self.stages.last() {
            Some(Stage::PageAndCount(window)) => Some(*window),
            _ => None,
        }
    }
}
