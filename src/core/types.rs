use serde::{Deserialize, Serialize};

/// Stable position of a row in the demand ledger (1-based, header row excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u32);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Production order identifier, canonical string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Material document identifier, canonical string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The reference written back into a resolved demand row: either the
/// production order that consumed the material or the material document
/// of a direct issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedReference {
    Order(OrderId),
    Document(DocumentId),
}

impl ResolvedReference {
    /// The raw identifier, as written to the output column
    pub fn as_str(&self) -> &str {
        match self {
            Self::Order(id) => id.as_str(),
            Self::Document(id) => id.as_str(),
        }
    }
}

impl std::fmt::Display for ResolvedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse partition key for nearest-neighbor search: rows and supply
/// entities compare only within the same item/quantity/material bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeighborhoodKey {
    pub item: String,
    pub qty: i64,
    pub material: String,
}

impl std::fmt::Display for NeighborhoodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x{} / {}", self.item, self.qty, self.material)
    }
}

/// How a resolution was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Row already carried an order/document reference
    Reference,
    /// Same item/material/quantity, area within the strict tolerance
    Tight,
    /// Same predicate with the wide area tolerance
    Loose,
    /// Direct issue claimed through the row's program or ledger id
    CrossReference,
    /// Tight predicate with ordering relaxed to the same calendar day
    SameDay,
    /// Nearest-neighbor assignment within a neighborhood
    Nearest,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Tight => write!(f, "tight"),
            Self::Loose => write!(f, "loose"),
            Self::CrossReference => write!(f, "cross-reference"),
            Self::SameDay => write!(f, "same-day"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

/// Which ledger a malformed row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Demand,
    Supply,
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Demand => write!(f, "demand"),
            Self::Supply => write!(f, "supply"),
        }
    }
}

/// One entry of the externally supplied exclusion list: a demand row
/// matching it is marked resolved-as-excluded (the source system already
/// rejected the movement, so no consumption will ever arrive for it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionEntry {
    pub item: String,
    pub reference: String,
    pub qty: i64,
    pub program: String,
}
