//! Typed list query arguments.

/// Page size used when neither the caller nor the config supplies one.
///
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Static extra filters a list screen may pin onto its queries.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filters {
    pub company_id: Option<String>,
    pub course_id: Option<String>,
    pub test_id: Option<String>,
    pub status: Option<String>,
}

impl Filters {
    /// Return true if no filter is set.
    ///
    pub fn is_empty(&self) -> bool {
        self.company_id.is_none()
            && self.course_id.is_none()
            && self.test_id.is_none()
            && self.status.is_none()
    }
}

/// Arguments of a paginated, searchable list query.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub search_term: Option<String>,
    pub filters: Filters,
}

impl ListParams {
    /// Return params for the given page and limit. Both are raised to at
    /// least 1.
    ///
    pub fn new(page: u32, limit: u32) -> Self {
        ListParams {
            page: page.max(1),
            limit: limit.max(1),
            search_term: None,
            filters: Filters::default(),
        }
    }

    /// Set the search term; blank terms are dropped so that "" and "  "
    /// share a cache entry with no search at all.
    ///
    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search_term = if term.is_empty() {
            None
        } else {
            Some(term.to_owned())
        };
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Return the query string pairs in the shape the REST API expects.
    ///
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(ref term) = self.search_term {
            pairs.push(("searchTerm", term.clone()));
        }
        if let Some(ref id) = self.filters.company_id {
            pairs.push(("companyId", id.clone()));
        }
        if let Some(ref id) = self.filters.course_id {
            pairs.push(("courseId", id.clone()));
        }
        if let Some(ref id) = self.filters.test_id {
            pairs.push(("testId", id.clone()));
        }
        if let Some(ref status) = self.filters.status {
            pairs.push(("status", status.clone()));
        }
        pairs
    }
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams::new(1, DEFAULT_PAGE_SIZE)
    }
}
