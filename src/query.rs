//! Read-query shaping for directory listings
//!
//! Pure construction of the `$select` / `$top` / `$orderby` parameter set
//! used by the user-listing endpoint. No I/O happens here, which keeps the
//! query rules testable without a live service.

use std::collections::BTreeSet;

use crate::error::{DirGraphError, Result};

/// Service-imposed maximum page size for directory listings.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 25;

/// Fields that may be projected and ordered by unless the builder is
/// configured otherwise.
pub const DEFAULT_ALLOWED_FIELDS: [&str; 3] = ["displayName", "id", "mail"];

// ---------------------------------------------------------------------------
// QueryParameters
// ---------------------------------------------------------------------------

/// An immutable, validated parameter set for one listing call.
///
/// Constructed fresh per call by [`DirectoryQueryBuilder`]; never stored by
/// the facade. Equal builder inputs always produce equal parameter sets:
/// the projection is kept sorted and deduplicated, and the ordering sequence
/// is preserved as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters {
    select: Vec<String>,
    top: u32,
    order_by: Vec<String>,
}

impl QueryParameters {
    /// The projected field names, sorted and deduplicated.
    pub fn select(&self) -> &[String] {
        &self.select
    }

    /// The result cap.
    pub fn top(&self) -> u32 {
        self.top
    }

    /// The ordering sequence, in caller order.
    pub fn order_by(&self) -> &[String] {
        &self.order_by
    }

    /// Renders the parameter set as URL query pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirgraph::query::DirectoryQueryBuilder;
    ///
    /// let query = DirectoryQueryBuilder::default()
    ///     .user_list_query(&["displayName", "id", "mail"], 25, &["displayName"])
    ///     .unwrap();
    /// assert_eq!(
    ///     query.to_pairs(),
    ///     vec![
    ///         ("$select".to_string(), "displayName,id,mail".to_string()),
    ///         ("$top".to_string(), "25".to_string()),
    ///         ("$orderby".to_string(), "displayName".to_string()),
    ///     ],
    /// );
    /// ```
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("$select".to_string(), self.select.join(",")),
            ("$top".to_string(), self.top.to_string()),
        ];
        if !self.order_by.is_empty() {
            pairs.push(("$orderby".to_string(), self.order_by.join(",")));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// DirectoryQueryBuilder
// ---------------------------------------------------------------------------

/// Validating constructor for [`QueryParameters`].
///
/// Carries the service cap and the allowed-field set. The defaults match
/// the directory service's documented listing limits; both can be widened
/// for services that permit more.
#[derive(Debug, Clone)]
pub struct DirectoryQueryBuilder {
    max_page_size: u32,
    allowed_fields: BTreeSet<String>,
}

impl Default for DirectoryQueryBuilder {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            allowed_fields: DEFAULT_ALLOWED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DirectoryQueryBuilder {
    /// Overrides the service page cap.
    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = max;
        self
    }

    /// Replaces the allowed-field set.
    pub fn with_allowed_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the parameter set for a user listing.
    ///
    /// # Errors
    ///
    /// Returns [`DirGraphError::Validation`] when:
    ///
    /// - `select` is empty, or names a field outside the allowed set;
    /// - `top` is zero or exceeds the service cap;
    /// - an `order_by` field is not part of the projection.
    ///
    /// No I/O is performed; a rejected query never reaches the wire.
    pub fn user_list_query(
        &self,
        select: &[&str],
        top: u32,
        order_by: &[&str],
    ) -> Result<QueryParameters> {
        if select.is_empty() {
            return Err(
                DirGraphError::Validation("select must name at least one field".to_string())
                    .into(),
            );
        }
        for field in select {
            if !self.allowed_fields.contains(*field) {
                return Err(DirGraphError::Validation(format!(
                    "field `{}` is not in the allowed set [{}]",
                    field,
                    self.allowed_fields
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", "),
                ))
                .into());
            }
        }

        if top == 0 {
            return Err(DirGraphError::Validation("top must be positive".to_string()).into());
        }
        if top > self.max_page_size {
            return Err(DirGraphError::Validation(format!(
                "top={} exceeds the service cap of {}",
                top, self.max_page_size
            ))
            .into());
        }

        // Sorted, deduplicated projection keeps equal inputs producing equal
        // parameter sets.
        let normalized: BTreeSet<&str> = select.iter().copied().collect();
        for field in order_by {
            if !normalized.contains(*field) {
                return Err(DirGraphError::Validation(format!(
                    "order_by field `{}` is not selected",
                    field
                ))
                .into());
            }
        }

        Ok(QueryParameters {
            select: normalized.into_iter().map(str::to_string).collect(),
            top,
            order_by: order_by.iter().map(|s| s.to_string()).collect(),
        })
    }
}
