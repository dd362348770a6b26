//! Search request builder for the engine's `/select` endpoint.
//!
//! A [`SearchRequest`] holds the parameters of one search (query string,
//! pagination, filters, sorting, faceting, collapsing, joins) and renders
//! them into the ordered `key=value` fragments the engine expects.
//! Requests are built fluently:
//!
//! ```
//! use opensearchserver::SearchRequestBuilder;
//!
//! let request = SearchRequestBuilder::new()
//!     .query("café")
//!     .rows(20)
//!     .add_filter("category:books")
//!     .build();
//!
//! assert_eq!(
//!     request.query_params(),
//!     vec!["q=caf%C3%A9", "rows=20", "fq=category%3Abooks"],
//! );
//! ```
//!
//! Assembly is a pure read of the request state: calling
//! [`SearchRequest::query_params`] twice yields identical output.

use serde::{Deserialize, Serialize};

use crate::util::encode;

/// Options attached to a single facet field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    /// Minimum bucket count for a value to be returned, rendered as a
    /// `(min)` suffix on the facet fragment.
    pub min: Option<u64>,
    /// Facet over a multi-valued field (`facet.multi`).
    pub multi: bool,
    /// Facet over a multi-valued field after collapsing
    /// (`facet.multi.collapse`). Ignored when `multi` is also set.
    pub multi_collapse: bool,
}

impl FacetOptions {
    pub fn min(mut self, min: u64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn multi_collapse(mut self, multi_collapse: bool) -> Self {
        self.multi_collapse = multi_collapse;
        self
    }
}

/// Field-collapsing configuration. Each sub-field is independently
/// optional; unset sub-fields are omitted from the assembled request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collapse {
    pub field: Option<String>,
    pub max: Option<u64>,
    pub mode: Option<String>,
    #[serde(rename = "type")]
    pub collapse_type: Option<String>,
}

/// Parameters of one search against the `/select` endpoint.
///
/// Usually constructed through [`SearchRequestBuilder`]. Fields are
/// public so a request can also be assembled or inspected directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query. Unset or empty renders the match-all wildcard `*:*`.
    pub query: Option<String>,
    /// Server-side query template name (`qt`).
    pub template: Option<String>,
    /// Result offset.
    pub start: Option<u64>,
    /// Page size.
    pub rows: Option<u64>,
    /// Language code used for query analysis.
    pub lang: Option<String>,
    /// Default boolean operator (`AND` / `OR`).
    pub operator: Option<String>,
    /// Fields to return (`rf`). Ordered, duplicates removed on insert.
    pub fields: Vec<String>,
    /// Positive filter queries (`fq`).
    pub filters: Vec<String>,
    /// Negative filter queries (`fqn`).
    pub negative_filters: Vec<String>,
    /// Sort clauses (`sort`), a bare field or `-field` for descending.
    pub sorts: Vec<String>,
    /// Facet options per field, in insertion order.
    pub facets: Vec<(String, FacetOptions)>,
    /// Field-collapsing configuration.
    pub collapse: Collapse,
    /// Join sub-queries keyed by `jq<N>` or a custom key, in insertion order.
    pub join_parameters: Vec<(String, String)>,
    /// Positive filters scoped to a join position (`jq<N>.fq`).
    pub join_filters: Vec<(u64, Vec<String>)>,
    /// Negative filters scoped to a join position (`jq<N>.fqn`).
    pub join_negative_filters: Vec<(u64, Vec<String>)>,
}

impl SearchRequest {
    /// Render this request into ordered `key=value` query-string fragments.
    ///
    /// The fragment order and per-key encoding follow the engine's wire
    /// protocol: `qt`, `q` (always present), `lang`, `rows`, `start`,
    /// `operator`, then `sort`/`fq`/`fqn`/`rf` lists, facets, join
    /// parameters, join filters, and collapse settings. Values carrying
    /// query syntax (`q`, `sort`, `fq`, `fqn`, join values) are
    /// percent-encoded; bare field names and tokens (`lang`, `operator`,
    /// `rf`, facet and collapse fragments) travel verbatim.
    ///
    /// This is a pure read: the request is not mutated and repeated
    /// calls yield identical output.
    pub fn query_params(&self) -> Vec<String> {
        let mut params = Vec::new();

        if let Some(template) = &self.template {
            if !template.is_empty() {
                params.push(format!("qt={}", encode(template)));
            }
        }

        // An unset or empty query means match-all.
        let query = match self.query.as_deref() {
            None | Some("") => "*:*",
            Some(query) => query,
        };
        params.push(format!("q={}", encode(query)));

        if let Some(lang) = &self.lang {
            if !lang.is_empty() {
                params.push(format!("lang={lang}"));
            }
        }

        if let Some(rows) = self.rows {
            params.push(format!("rows={rows}"));
        }

        if let Some(start) = self.start {
            params.push(format!("start={start}"));
        }

        if let Some(operator) = &self.operator {
            params.push(format!("operator={operator}"));
        }

        for sort in &self.sorts {
            if sort.is_empty() {
                continue;
            }
            params.push(format!("sort={}", encode(sort)));
        }

        for filter in &self.filters {
            if filter.is_empty() {
                continue;
            }
            params.push(format!("fq={}", encode(filter)));
        }

        for filter in &self.negative_filters {
            if filter.is_empty() {
                continue;
            }
            params.push(format!("fqn={}", encode(filter)));
        }

        for field in &self.fields {
            if field.is_empty() {
                continue;
            }
            params.push(format!("rf={field}"));
        }

        for (field, options) in &self.facets {
            let key = if options.multi {
                "facet.multi"
            } else if options.multi_collapse {
                "facet.multi.collapse"
            } else {
                "facet"
            };
            let mut fragment = format!("{key}={field}");
            if let Some(min) = options.min {
                fragment.push_str(&format!("({min})"));
            }
            params.push(fragment);
        }

        for (key, value) in &self.join_parameters {
            params.push(format!("{key}={}", encode(value)));
        }

        for (position, filters) in &self.join_filters {
            for filter in filters {
                if filter.is_empty() {
                    continue;
                }
                params.push(format!("jq{position}.fq={}", encode(filter)));
            }
        }

        for (position, filters) in &self.join_negative_filters {
            for filter in filters {
                if filter.is_empty() {
                    continue;
                }
                params.push(format!("jq{position}.fqn={}", encode(filter)));
            }
        }

        // Collapse field and type are skipped when empty; mode and max
        // are emitted for any set value, including "" and 0.
        if let Some(field) = &self.collapse.field {
            if !field.is_empty() {
                params.push(format!("collapse.field={field}"));
            }
        }
        if let Some(collapse_type) = &self.collapse.collapse_type {
            if !collapse_type.is_empty() {
                params.push(format!("collapse.type={collapse_type}"));
            }
        }
        if let Some(mode) = &self.collapse.mode {
            params.push(format!("collapse.mode={mode}"));
        }
        if let Some(max) = self.collapse.max {
            params.push(format!("collapse.max={max}"));
        }

        params
    }
}

/// Fluent builder for [`SearchRequest`].
///
/// Setters for scalar parameters overwrite; setters for list and map
/// parameters accumulate. Calls may come in any order — the assembled
/// fragment order is fixed by [`SearchRequest::query_params`], not by
/// the order of configuration.
pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl Default for SearchRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchRequestBuilder {
    pub fn new() -> Self {
        Self {
            request: SearchRequest::default(),
        }
    }

    /// Set the query string.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.request.query = Some(query.into());
        self
    }

    /// Set the server-side query template name.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.request.template = Some(template.into());
        self
    }

    /// Set the result offset.
    pub fn start(mut self, start: u64) -> Self {
        self.request.start = Some(start);
        self
    }

    /// Set the page size.
    pub fn rows(mut self, rows: u64) -> Self {
        self.request.rows = Some(rows);
        self
    }

    /// Set the language code used for query analysis.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.request.lang = Some(lang.into());
        self
    }

    /// Set the default boolean operator (`AND` or `OR`).
    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.request.operator = Some(operator.into());
        self
    }

    /// Append a positive filter query.
    ///
    /// Empty expressions are accepted here and skipped at assembly time.
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        self.request.filters.push(filter.into());
        self
    }

    /// Append a negative filter query.
    pub fn add_negative_filter(mut self, filter: impl Into<String>) -> Self {
        self.request.negative_filters.push(filter.into());
        self
    }

    /// Add a returned field. Duplicates are dropped, insertion order is kept.
    pub fn add_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.request.fields.contains(&field) {
            self.request.fields.push(field);
        }
        self
    }

    /// Add several returned fields, deduplicating against existing entries.
    pub fn add_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self = self.add_field(field);
        }
        self
    }

    /// Append a sort clause. No deduplication is performed.
    pub fn add_sort(mut self, sort: impl Into<String>) -> Self {
        self.request.sorts.push(sort.into());
        self
    }

    /// Append several sort clauses, in order.
    pub fn add_sorts<I, S>(mut self, sorts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for sort in sorts {
            self.request.sorts.push(sort.into());
        }
        self
    }

    /// Set the field to collapse results on.
    pub fn collapse_field(mut self, field: impl Into<String>) -> Self {
        self.request.collapse.field = Some(field.into());
        self
    }

    /// Set the collapse mode.
    pub fn collapse_mode(mut self, mode: impl Into<String>) -> Self {
        self.request.collapse.mode = Some(mode.into());
        self
    }

    /// Set the collapse type.
    pub fn collapse_type(mut self, collapse_type: impl Into<String>) -> Self {
        self.request.collapse.collapse_type = Some(collapse_type.into());
        self
    }

    /// Set the maximum number of documents kept per collapsed group.
    /// Zero is a valid value and is emitted as `collapse.max=0`.
    pub fn collapse_max(mut self, max: u64) -> Self {
        self.request.collapse.max = Some(max);
        self
    }

    /// Set the facet options for a field.
    ///
    /// Configuring the same field again replaces its options in place,
    /// keeping the original position in the facet order.
    pub fn facet(mut self, field: impl Into<String>, options: FacetOptions) -> Self {
        let field = field.into();
        match self
            .request
            .facets
            .iter_mut()
            .find(|(name, _)| *name == field)
        {
            Some(entry) => entry.1 = options,
            None => self.request.facets.push((field, options)),
        }
        self
    }

    /// Set a join sub-query under an explicit key (e.g. `jq0`).
    ///
    /// Setting the same key again overwrites the value in place without
    /// changing its position in the join order.
    pub fn add_join_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .request
            .join_parameters
            .iter_mut()
            .find(|(name, _)| *name == key)
        {
            Some(entry) => entry.1 = value,
            None => self.request.join_parameters.push((key, value)),
        }
        self
    }

    /// Set the join sub-query at an integer position (key `jq<position>`).
    pub fn join(self, position: u64, value: impl Into<String>) -> Self {
        self.add_join_parameter(format!("jq{position}"), value)
    }

    /// Append a positive filter scoped to a join position.
    pub fn add_join_filter(mut self, position: u64, filter: impl Into<String>) -> Self {
        position_filters(&mut self.request.join_filters, position).push(filter.into());
        self
    }

    /// Append a negative filter scoped to a join position.
    pub fn add_join_negative_filter(
        mut self,
        position: u64,
        filter: impl Into<String>,
    ) -> Self {
        position_filters(&mut self.request.join_negative_filters, position).push(filter.into());
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}

/// Get the filter list for a join position, creating it on first use.
/// Positions keep their insertion order.
fn position_filters(list: &mut Vec<(u64, Vec<String>)>, position: u64) -> &mut Vec<String> {
    match list.iter().position(|(pos, _)| *pos == position) {
        Some(index) => &mut list[index].1,
        None => {
            list.push((position, Vec::new()));
            let last = list.len() - 1;
            &mut list[last].1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_yields_wildcard_query_only() {
        let request = SearchRequestBuilder::new().build();
        assert_eq!(request.query_params(), vec!["q=*%3A*"]);
    }

    #[test]
    fn test_empty_query_string_yields_wildcard() {
        let request = SearchRequestBuilder::new().query("").build();
        assert_eq!(request.query_params(), vec!["q=*%3A*"]);
    }

    #[test]
    fn test_query_is_percent_encoded() {
        let request = SearchRequestBuilder::new().query("café").build();
        assert_eq!(request.query_params(), vec!["q=caf%C3%A9"]);
    }

    #[test]
    fn test_later_query_overwrites() {
        let request = SearchRequestBuilder::new()
            .query("first")
            .query("second")
            .build();
        assert_eq!(request.query_params(), vec!["q=second"]);
    }

    #[test]
    fn test_scalar_parameter_order() {
        let request = SearchRequestBuilder::new()
            .operator("AND")
            .start(40)
            .rows(20)
            .lang("en")
            .query("hello")
            .build();
        assert_eq!(
            request.query_params(),
            vec!["q=hello", "lang=en", "rows=20", "start=40", "operator=AND"],
        );
    }

    #[test]
    fn test_rows_and_start_zero_are_emitted() {
        let request = SearchRequestBuilder::new().rows(0).start(0).build();
        assert_eq!(request.query_params(), vec!["q=*%3A*", "rows=0", "start=0"]);
    }

    #[test]
    fn test_fields_deduplicate_preserving_order() {
        let request = SearchRequestBuilder::new()
            .add_fields(["a", "b", "a"])
            .build();
        assert_eq!(request.query_params(), vec!["q=*%3A*", "rf=a", "rf=b"]);
    }

    #[test]
    fn test_field_dedup_is_case_sensitive() {
        let request = SearchRequestBuilder::new().add_fields(["Title", "title"]).build();
        assert_eq!(
            request.query_params(),
            vec!["q=*%3A*", "rf=Title", "rf=title"],
        );
    }

    #[test]
    fn test_sorts_keep_order_without_dedup() {
        let request = SearchRequestBuilder::new()
            .add_sorts(["x", "-y"])
            .add_sort("x")
            .build();
        assert_eq!(
            request.query_params(),
            vec!["q=*%3A*", "sort=x", "sort=-y", "sort=x"],
        );
    }

    #[test]
    fn test_filters_encode_and_skip_empties() {
        let request = SearchRequestBuilder::new()
            .add_filter("category:books")
            .add_filter("")
            .add_negative_filter("status:draft")
            .build();
        assert_eq!(
            request.query_params(),
            vec!["q=*%3A*", "fq=category%3Abooks", "fqn=status%3Adraft"],
        );
    }

    #[test]
    fn test_facet_fragment_variants() {
        let request = SearchRequestBuilder::new()
            .facet("cat", FacetOptions::default().min(5).multi(true))
            .facet("author", FacetOptions::default())
            .facet("tags", FacetOptions::default().multi_collapse(true))
            .build();
        assert_eq!(
            request.query_params(),
            vec![
                "q=*%3A*",
                "facet.multi=cat(5)",
                "facet=author",
                "facet.multi.collapse=tags",
            ],
        );
    }

    #[test]
    fn test_facet_multi_takes_priority_over_multi_collapse() {
        let request = SearchRequestBuilder::new()
            .facet(
                "cat",
                FacetOptions::default().multi(true).multi_collapse(true),
            )
            .build();
        assert_eq!(request.query_params(), vec!["q=*%3A*", "facet.multi=cat"]);
    }

    #[test]
    fn test_facet_reconfiguration_replaces_in_place() {
        let request = SearchRequestBuilder::new()
            .facet("cat", FacetOptions::default().min(5).multi(true))
            .facet("author", FacetOptions::default())
            .facet("cat", FacetOptions::default())
            .build();
        assert_eq!(
            request.query_params(),
            vec!["q=*%3A*", "facet=cat", "facet=author"],
        );
    }

    #[test]
    fn test_join_parameter_and_scoped_filters() {
        let request = SearchRequestBuilder::new()
            .join(0, "foo:bar")
            .add_join_filter(0, "x:y")
            .build();
        assert_eq!(
            request.query_params(),
            vec!["q=*%3A*", "jq0=foo%3Abar", "jq0.fq=x%3Ay"],
        );
    }

    #[test]
    fn test_custom_join_key_overwrites_in_place() {
        let request = SearchRequestBuilder::new()
            .add_join_parameter("jq1", "title:foo")
            .add_join_parameter("jq2", "author:bar")
            .add_join_parameter("jq1", "title:baz")
            .build();
        assert_eq!(
            request.query_params(),
            vec!["q=*%3A*", "jq1=title%3Abaz", "jq2=author%3Abar"],
        );
    }

    #[test]
    fn test_join_filters_group_by_position_in_insertion_order() {
        let request = SearchRequestBuilder::new()
            .add_join_filter(1, "a:1")
            .add_join_filter(0, "b:2")
            .add_join_filter(1, "c:3")
            .add_join_filter(1, "")
            .add_join_negative_filter(1, "d:4")
            .build();
        assert_eq!(
            request.query_params(),
            vec![
                "q=*%3A*",
                "jq1.fq=a%3A1",
                "jq1.fq=c%3A3",
                "jq0.fq=b%3A2",
                "jq1.fqn=d%3A4",
            ],
        );
    }

    #[test]
    fn test_collapse_fragments() {
        let request = SearchRequestBuilder::new()
            .collapse_field("host")
            .collapse_type("optimized")
            .collapse_mode("adjacent")
            .collapse_max(2)
            .build();
        assert_eq!(
            request.query_params(),
            vec![
                "q=*%3A*",
                "collapse.field=host",
                "collapse.type=optimized",
                "collapse.mode=adjacent",
                "collapse.max=2",
            ],
        );
    }

    #[test]
    fn test_collapse_max_zero_is_emitted() {
        let request = SearchRequestBuilder::new().collapse_max(0).build();
        assert_eq!(request.query_params(), vec!["q=*%3A*", "collapse.max=0"]);
    }

    #[test]
    fn test_collapse_empty_field_and_type_are_skipped_but_mode_is_kept() {
        let request = SearchRequestBuilder::new()
            .collapse_field("")
            .collapse_type("")
            .collapse_mode("")
            .build();
        assert_eq!(request.query_params(), vec!["q=*%3A*", "collapse.mode="]);
    }

    #[test]
    fn test_template_is_emitted_first() {
        let request = SearchRequestBuilder::new()
            .template("news search")
            .query("rust")
            .build();
        assert_eq!(
            request.query_params(),
            vec!["qt=news%20search", "q=rust"],
        );
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let request = SearchRequestBuilder::new()
            .query("hello world")
            .add_filter("a:b")
            .facet("cat", FacetOptions::default().min(1))
            .join(3, "x:y")
            .collapse_max(0)
            .build();
        assert_eq!(request.query_params(), request.query_params());
    }

    #[test]
    fn test_example_scenario() {
        let request = SearchRequestBuilder::new()
            .query("café")
            .rows(20)
            .add_filter("category:books")
            .add_join_parameter("jq1", "title:foo")
            .build();
        assert_eq!(
            request.query_params(),
            vec![
                "q=caf%C3%A9",
                "rows=20",
                "fq=category%3Abooks",
                "jq1=title%3Afoo",
            ],
        );
    }

    #[test]
    fn test_request_serializes_collapse_type_key() {
        let request = SearchRequestBuilder::new()
            .collapse_type("optimized")
            .build();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["collapse"]["type"], "optimized");

        let back: SearchRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back.collapse.collapse_type.as_deref(), Some("optimized"));
    }

    #[test]
    fn test_round_trip_key_value_multiset() {
        let request = SearchRequestBuilder::new()
            .query("a:b c")
            .add_filter("price:[0 TO 10]")
            .add_sort("-date")
            .join(0, "ref:x")
            .build();

        let mut decoded: Vec<(String, String)> = request
            .query_params()
            .iter()
            .map(|fragment| {
                let (key, value) = fragment.split_once('=').unwrap();
                (
                    key.to_string(),
                    urlencoding::decode(value).unwrap().into_owned(),
                )
            })
            .collect();
        decoded.sort();

        let mut expected = vec![
            ("q".to_string(), "a:b c".to_string()),
            ("fq".to_string(), "price:[0 TO 10]".to_string()),
            ("sort".to_string(), "-date".to_string()),
            ("jq0".to_string(), "ref:x".to_string()),
        ];
        expected.sort();
        assert_eq!(decoded, expected);
    }
}
