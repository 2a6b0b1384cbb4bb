//! Module: access
//! Responsibility: declared query shapes (equality + range + order) and their
//! validation, plus the signature that binds continuation cursors to a shape.
//! Does not own: cursor token wire format or store query compilation.

use crate::{
    serialize::serialize,
    value::{FieldValue, Value},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error as ThisError;

// Domain separator for pattern signatures; bump when the hashed layout changes.
const SIGNATURE_DOMAIN: &[u8] = b"ferrydb.pattern.v1";

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    const fn tag(self) -> u8 {
        match self {
            Self::Asc => 0,
            Self::Desc => 1,
        }
    }
}

impl std::fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// OrderSpec
///
/// Declared sort fields in priority order. Cursor pagination only behaves
/// exactly-once when the trailing sort field is effectively unique (for
/// example the primary key); ties spanning a page boundary are otherwise
/// re-emitted or skipped on resume.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrderSpec {
    pub fields: Vec<(String, OrderDirection)>,
}

impl OrderSpec {
    #[must_use]
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Direction of the leading sort field.
    ///
    /// Valid patterns always carry at least one sort field, so an empty spec
    /// defaults to ascending rather than panicking.
    #[must_use]
    pub fn leading_direction(&self) -> OrderDirection {
        self.fields
            .first()
            .map_or(OrderDirection::Asc, |(_, direction)| *direction)
    }
}

///
/// RangeOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeOp {
    /// Whether a candidate ordered `cmp` relative to the bound satisfies
    /// this operator (`cmp` = candidate vs bound).
    #[must_use]
    pub const fn admits(self, cmp: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};

        match self {
            Self::Gt => matches!(cmp, Greater),
            Self::Gte => matches!(cmp, Greater | Equal),
            Self::Lt => matches!(cmp, Less),
            Self::Lte => matches!(cmp, Less | Equal),
        }
    }

    const fn tag(self) -> u8 {
        match self {
            Self::Gt => 0,
            Self::Gte => 1,
            Self::Lt => 2,
            Self::Lte => 3,
        }
    }
}

///
/// RangeFilter
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RangeFilter {
    pub field: String,
    pub op: RangeOp,
    pub bound: Value,
}

///
/// AccessPattern
///
/// The declared filter + sort shape of a scan. Immutable once built; the
/// signature computed at build time binds cursors to both the shape and the
/// filter values, so a token minted for `category = "books"` can never
/// resume a `category = "pens"` scan.
///

#[derive(Clone, Debug)]
pub struct AccessPattern {
    equality: Vec<(String, Value)>,
    range: Option<RangeFilter>,
    order: OrderSpec,
    signature: PatternSignature,
}

impl AccessPattern {
    #[must_use]
    pub fn builder() -> AccessPatternBuilder {
        AccessPatternBuilder::default()
    }

    #[must_use]
    pub fn equality(&self) -> &[(String, Value)] {
        &self.equality
    }

    #[must_use]
    pub const fn range(&self) -> Option<&RangeFilter> {
        self.range.as_ref()
    }

    #[must_use]
    pub const fn order(&self) -> &OrderSpec {
        &self.order
    }

    #[must_use]
    pub const fn signature(&self) -> PatternSignature {
        self.signature
    }
}

///
/// AccessPatternBuilder
///

#[derive(Debug, Default)]
pub struct AccessPatternBuilder {
    equality: Vec<(String, Value)>,
    range: Option<RangeFilter>,
    order: Vec<(String, OrderDirection)>,
}

impl AccessPatternBuilder {
    /// Add an equality filter: `field == value`.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl FieldValue) -> Self {
        self.equality.push((field.into(), value.to_value()));
        self
    }

    /// Set the range filter: `field op bound`. At most one range filter is
    /// supported; a second call replaces the first.
    #[must_use]
    pub fn range(mut self, field: impl Into<String>, op: RangeOp, bound: impl FieldValue) -> Self {
        self.range = Some(RangeFilter {
            field: field.into(),
            op,
            bound: bound.to_value(),
        });
        self
    }

    /// Append a sort field.
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order.push((field.into(), direction));
        self
    }

    #[must_use]
    pub fn sort_asc(self, field: impl Into<String>) -> Self {
        self.sort(field, OrderDirection::Asc)
    }

    #[must_use]
    pub fn sort_desc(self, field: impl Into<String>) -> Self {
        self.sort(field, OrderDirection::Desc)
    }

    /// Validate the declared shape and freeze it into an [`AccessPattern`].
    pub fn build(self) -> Result<AccessPattern, PatternError> {
        if self.order.is_empty() {
            return Err(PatternError::EmptySort);
        }

        for (field, _) in &self.order {
            if field.is_empty() {
                return Err(PatternError::EmptyFieldName);
            }
        }
        for (field, value) in &self.equality {
            if field.is_empty() {
                return Err(PatternError::EmptyFieldName);
            }
            if value.is_null() {
                return Err(PatternError::NullBound {
                    field: field.clone(),
                });
            }
        }

        if let Some(dup) = first_duplicate(self.order.iter().map(|(f, _)| f.as_str())) {
            return Err(PatternError::DuplicateSortField {
                field: dup.to_string(),
            });
        }
        if let Some(dup) = first_duplicate(self.equality.iter().map(|(f, _)| f.as_str())) {
            return Err(PatternError::DuplicateEqualityField {
                field: dup.to_string(),
            });
        }

        if let Some(range) = &self.range {
            if range.field.is_empty() {
                return Err(PatternError::EmptyFieldName);
            }
            if range.bound.is_null() {
                return Err(PatternError::NullBound {
                    field: range.field.clone(),
                });
            }

            // Cursor resumption folds the range bound and the continuation
            // boundary into the same scan dimension, which only works when
            // the range field leads the sort order.
            let (leading, _) = &self.order[0];
            if *leading != range.field {
                return Err(PatternError::RangeNotLeadingSort {
                    range_field: range.field.clone(),
                    leading_sort: leading.clone(),
                });
            }
        }

        let order = OrderSpec { fields: self.order };
        let signature = compute_signature(&self.equality, self.range.as_ref(), &order)?;

        Ok(AccessPattern {
            equality: self.equality,
            range: self.range,
            order,
            signature,
        })
    }
}

fn first_duplicate<'a>(fields: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for field in fields {
        if seen.contains(&field) {
            return Some(field);
        }
        seen.push(field);
    }

    None
}

// Hash the continuation-relevant pattern semantics. Excludes windowing
// (page size), which is free to vary between resumed runs.
fn compute_signature(
    equality: &[(String, Value)],
    range: Option<&RangeFilter>,
    order: &OrderSpec,
) -> Result<PatternSignature, PatternError> {
    let mut hasher = Sha256::new();
    hasher.update(SIGNATURE_DOMAIN);

    for (field, value) in equality {
        hasher.update([0x01]);
        update_str(&mut hasher, field);
        update_value(&mut hasher, value)?;
    }

    if let Some(range) = range {
        hasher.update([0x02]);
        update_str(&mut hasher, &range.field);
        hasher.update([range.op.tag()]);
        update_value(&mut hasher, &range.bound)?;
    }

    for (field, direction) in &order.fields {
        hasher.update([0x03]);
        update_str(&mut hasher, field);
        hasher.update([direction.tag()]);
    }

    Ok(PatternSignature(hasher.finalize().into()))
}

fn update_str(hasher: &mut Sha256, text: &str) {
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
}

fn update_value(hasher: &mut Sha256, value: &Value) -> Result<(), PatternError> {
    let bytes = serialize(value).map_err(|err| PatternError::Signature(err.to_string()))?;
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(&bytes);

    Ok(())
}

///
/// PatternSignature
///
/// Stable, deterministic hash of continuation-relevant pattern semantics.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PatternSignature([u8; 32]);

impl PatternSignature {
    pub(crate) const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub(crate) const fn into_bytes(self) -> [u8; 32] {
        self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        crate::cursor::codec::encode_token(&self.0)
    }
}

impl std::fmt::Display for PatternSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hex())
    }
}

///
/// PatternError
/// Access-pattern construction failures. All fatal.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PatternError {
    #[error("field names must be non-empty")]
    EmptyFieldName,

    #[error("access pattern requires at least one sort field")]
    EmptySort,

    #[error("duplicate sort field: {field}")]
    DuplicateSortField { field: String },

    #[error("duplicate equality field: {field}")]
    DuplicateEqualityField { field: String },

    #[error("range field '{range_field}' must be the leading sort field (found '{leading_sort}')")]
    RangeNotLeadingSort {
        range_field: String,
        leading_sort: String,
    },

    #[error("filter value for '{field}' must not be null")]
    NullBound { field: String },

    #[error("failed to compute pattern signature: {0}")]
    Signature(String),
}

///
/// TESTS
///
