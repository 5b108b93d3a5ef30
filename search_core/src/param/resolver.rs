//! Parameter resolution
//!
//! Keys are matched against the schema first. A key that is not a field name
//! is split at the last separator into a field and a modifier:
//!
//! | key            | meaning                               |
//! |----------------|---------------------------------------|
//! | `age`          | value(s) for `age`                    |
//! | `age_op=gt`    | explicit operator for `age`           |
//! | `age_gt`       | value for `age` with operator `gt`    |
//! | `age_0`, `age_1` | positional values for `age`         |
//! | `name_ic=true` | compare `name` case-insensitively     |
//!
//! Each operator suffix yields its own filter, so `age_ge=18&age_le=65`
//! is a range. Keys that name no field, or carry an unknown modifier, are
//! ignored.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use config::ParamsConfig;
use indexmap::IndexMap;

use super::field_param::FieldParam;
use super::filter::{ParamFilter, SizeLimitParamFilter};
use super::operator::{Arity, Operator};
use super::{ParamValue, SearchParams};
use crate::errors::SearchError;
use crate::ordering::{SortOrder, SortSpec};
use crate::pagination::{Pagination, PagingSpec};
use crate::schema::SchemaDescriptor;

/// Output of one resolution pass
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    pub filters: Vec<FieldParam>,
    pub sort: SortSpec,
    pub paging: PagingSpec,
}

enum Modifier {
    Plain,
    Operator,
    IgnoreCase,
    Index(usize),
    OperatorValue(Operator),
}

/// Values collected for one filter
///
/// A field has a default entry, fed by bare values, `_op` and positional
/// keys, plus one entry per operator suffix such as `age_ge`.
#[derive(Default)]
struct PendingField {
    operator: Option<Operator>,
    values: Vec<String>,
    indexed: BTreeMap<usize, String>,
}

/// Turns request parameters into filters, sort and paging
#[derive(Clone)]
pub struct ParamResolver {
    separator: String,
    operator_key: String,
    ignore_case_key: String,
    sort_key: String,
    order_key: String,
    pagination: Pagination,
    filters: Vec<Arc<dyn ParamFilter>>,
}

impl std::fmt::Debug for ParamResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamResolver")
            .field("separator", &self.separator)
            .field("operator_key", &self.operator_key)
            .field("ignore_case_key", &self.ignore_case_key)
            .field("sort_key", &self.sort_key)
            .field("order_key", &self.order_key)
            .field("pagination", &self.pagination)
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl ParamResolver {
    /// Build a resolver from configuration
    ///
    /// Fails only when the pagination type is not supported. A non-zero
    /// `max_param_count` registers a [`SizeLimitParamFilter`].
    pub fn from_config(config: &ParamsConfig) -> Result<Self, SearchError> {
        let pagination = Pagination::from_config(&config.pagination)?;
        let resolver = Self {
            separator: config.separator.clone(),
            operator_key: config.operator_key.clone(),
            ignore_case_key: config.ignore_case_key.clone(),
            sort_key: config.sort.clone(),
            order_key: config.order.clone(),
            pagination,
            filters: Vec::new(),
        };

        Ok(if config.max_param_count > 0 {
            resolver.with_filter(SizeLimitParamFilter::new(config.max_param_count))
        } else {
            resolver
        })
    }

    /// Register a parameter filter; filters run in registration order
    pub fn with_filter(mut self, filter: impl ParamFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Resolve `params` against `schema`
    pub fn resolve(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<ResolvedParams, SearchError> {
        let params = self
            .filters
            .iter()
            .try_fold(params.clone(), |acc, filter| filter.filter(schema, acc))?;

        let mut pending: IndexMap<(&str, Option<Operator>), PendingField> = IndexMap::new();
        let mut ignore_case: HashSet<&str> = HashSet::new();
        for (key, value) in params.iter() {
            if self.is_control_key(key) {
                continue;
            }
            let Some((field, modifier)) = self.split_key(schema, key) else {
                crate::trace_log!("Ignoring parameter '{}'", key);
                continue;
            };

            match modifier {
                Modifier::Plain => pending
                    .entry((field, None))
                    .or_default()
                    .values
                    .extend(value.iter().map(str::to_string)),
                Modifier::Operator => {
                    let entry = pending.entry((field, None)).or_default();
                    if let Some(name) = value.first().filter(|v| !v.trim().is_empty()) {
                        entry.operator = Some(name.parse()?);
                    }
                }
                Modifier::IgnoreCase => {
                    if value.first().is_some_and(is_truthy) {
                        ignore_case.insert(field);
                    } else {
                        ignore_case.remove(field);
                    }
                }
                Modifier::Index(idx) => {
                    if let Some(v) = value.first() {
                        pending
                            .entry((field, None))
                            .or_default()
                            .indexed
                            .insert(idx, v.to_string());
                    }
                }
                Modifier::OperatorValue(op) => {
                    let entry = pending.entry((field, Some(op))).or_default();
                    entry.operator = Some(op);
                    entry.values.extend(value.iter().map(str::to_string));
                }
            }
        }

        let mut filters = Vec::with_capacity(pending.len());
        for ((field, _), entry) in pending {
            let ignore_case = ignore_case.contains(field);
            if let Some(param) = Self::build_field_param(field, entry, ignore_case)? {
                filters.push(param);
            }
        }

        Ok(ResolvedParams {
            filters,
            sort: self.resolve_sort(&params),
            paging: self.pagination.paginate(&params),
        })
    }

    fn build_field_param(
        field: &str,
        entry: PendingField,
        ignore_case: bool,
    ) -> Result<Option<FieldParam>, SearchError> {
        let PendingField {
            operator,
            mut values,
            indexed,
        } = entry;

        values.extend(indexed.into_values());
        values.retain(|v| !v.trim().is_empty());

        let operator = operator.unwrap_or(if values.len() > 1 {
            Operator::In
        } else {
            Operator::Equal
        });

        // Blank input for a field means "no filter", not an arity error
        if values.is_empty() && operator.arity() != Arity::Zero {
            return Ok(None);
        }

        FieldParam::new(field, operator, values, ignore_case).map(Some)
    }

    fn is_control_key(&self, key: &str) -> bool {
        key == self.sort_key || key == self.order_key || self.pagination.is_paging_param(key)
    }

    fn split_key<'k>(
        &self,
        schema: &SchemaDescriptor,
        key: &'k str,
    ) -> Option<(&'k str, Modifier)> {
        if schema.contains(key) {
            return Some((key, Modifier::Plain));
        }

        let (field, suffix) = key.rsplit_once(self.separator.as_str())?;
        if !schema.contains(field) {
            return None;
        }

        let modifier = if suffix == self.operator_key {
            Modifier::Operator
        } else if suffix == self.ignore_case_key {
            Modifier::IgnoreCase
        } else if let Ok(idx) = suffix.parse::<usize>() {
            Modifier::Index(idx)
        } else {
            Modifier::OperatorValue(Operator::from_name(suffix)?)
        };
        Some((field, modifier))
    }

    fn resolve_sort(&self, params: &SearchParams) -> SortSpec {
        let fields = split_list(params.get(&self.sort_key));
        let orders: Vec<SortOrder> = split_list(params.get(&self.order_key))
            .iter()
            .map(|o| o.parse().unwrap_or_default())
            .collect();

        let mut sort = SortSpec::new();
        for (idx, field) in fields.into_iter().enumerate() {
            let order = match orders.as_slice() {
                [single] => *single,
                many => many.get(idx).copied().unwrap_or_default(),
            };
            sort.push(field, order);
        }
        sort
    }
}

/// List values, or comma separated single values, trimmed and without blanks
fn split_list(value: Option<&ParamValue>) -> Vec<String> {
    value
        .map(|v| {
            v.iter()
                .flat_map(|item| item.split(','))
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use type_mapping::FieldType;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::builder("users u")
            .column("name", "u.name", FieldType::String)
            .column("age", "u.age", FieldType::Int)
            .column("user_type", "u.type", FieldType::String)
            .column("deleted_at", "u.deleted_at", FieldType::DateTime)
            .aggregate("total", "SUM(u.amount)", FieldType::Float)
            .build()
            .unwrap()
    }

    fn resolver() -> ParamResolver {
        ParamResolver::from_config(&ParamsConfig::default()).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_basic_resolution() {
        let params = SearchParams::new()
            .with("name", "John")
            .with("age_gt", "30")
            .with("page", "2")
            .with("size", "10");

        let resolved = resolver().resolve(&schema(), &params).unwrap();

        assert_eq!(
            resolved.filters,
            vec![
                FieldParam::new("name", Operator::Equal, strings(&["John"]), false).unwrap(),
                FieldParam::new("age", Operator::GreaterThan, strings(&["30"]), false).unwrap(),
            ]
        );
        assert_eq!(resolved.paging, PagingSpec::new(10, 10));
        assert!(resolved.sort.is_empty());
    }

    #[test]
    fn test_explicit_operator_and_ignore_case() {
        let params = SearchParams::new()
            .with("name_op", "lk")
            .with("name", "%oh%")
            .with("name_ic", "true");

        let resolved = resolver().resolve(&schema(), &params).unwrap();
        assert_eq!(
            resolved.filters,
            vec![FieldParam::new("name", Operator::Like, strings(&["%oh%"]), true).unwrap()]
        );
    }

    #[test]
    fn test_indexed_values_and_between() {
        let params = SearchParams::new()
            .with("age_1", "40")
            .with("age_0", "20")
            .with("age_op", "bt");

        let resolved = resolver().resolve(&schema(), &params).unwrap();
        assert_eq!(
            resolved.filters,
            vec![FieldParam::new("age", Operator::Between, strings(&["20", "40"]), false).unwrap()]
        );
    }

    #[test]
    fn test_each_operator_suffix_is_its_own_filter() {
        let params = SearchParams::new()
            .with("age_ge", "18")
            .with("name", "Ann")
            .with("age_le", "65")
            .with("total_gt", "10")
            .with("total_lt", "100");
        let resolved = resolver().resolve(&schema(), &params).unwrap();

        assert_eq!(
            resolved.filters,
            vec![
                FieldParam::new("age", Operator::GreaterEqual, strings(&["18"]), false).unwrap(),
                FieldParam::new("name", Operator::Equal, strings(&["Ann"]), false).unwrap(),
                FieldParam::new("age", Operator::LessEqual, strings(&["65"]), false).unwrap(),
                FieldParam::new("total", Operator::GreaterThan, strings(&["10"]), false).unwrap(),
                FieldParam::new("total", Operator::LessThan, strings(&["100"]), false).unwrap(),
            ]
        );
    }

    #[test]
    fn test_ignore_case_applies_to_every_filter_on_the_field() {
        let params = SearchParams::new()
            .with("name_ne", "bob")
            .with("name_ic", "1")
            .with("name_op", "lk")
            .with("name", "a%");
        let resolved = resolver().resolve(&schema(), &params).unwrap();

        assert_eq!(
            resolved.filters,
            vec![
                FieldParam::new("name", Operator::NotEqual, strings(&["bob"]), true).unwrap(),
                FieldParam::new("name", Operator::Like, strings(&["a%"]), true).unwrap(),
            ]
        );
    }

    #[test]
    fn test_list_value_defaults_to_in() {
        let params = SearchParams::new().with("age", vec!["1", "2", "3"]);
        let resolved = resolver().resolve(&schema(), &params).unwrap();
        assert_eq!(resolved.filters[0].operator(), Operator::In);
        assert_eq!(resolved.filters[0].values(), ["1", "2", "3"]);
    }

    #[test]
    fn test_field_names_containing_separator() {
        let params = SearchParams::new()
            .with("user_type_ne", "guest")
            .with("deleted_at_op", "nn");
        let resolved = resolver().resolve(&schema(), &params).unwrap();

        assert_eq!(resolved.filters.len(), 2);
        assert_eq!(resolved.filters[0].field(), "user_type");
        assert_eq!(resolved.filters[0].operator(), Operator::NotEqual);
        assert_eq!(resolved.filters[0].values(), ["guest"]);
        assert_eq!(resolved.filters[1].field(), "deleted_at");
        assert_eq!(resolved.filters[1].operator(), Operator::NotNull);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let params = SearchParams::new()
            .with("password", "x")
            .with("age_zz", "1")
            .with("nope_gt", "2")
            .with("name", "Ann");
        let resolved = resolver().resolve(&schema(), &params).unwrap();

        assert_eq!(resolved.filters.len(), 1);
        assert_eq!(resolved.filters[0].field(), "name");
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let params = SearchParams::new().with("name", "  ").with("age_gt", "");
        let resolved = resolver().resolve(&schema(), &params).unwrap();
        assert!(resolved.filters.is_empty());
    }

    #[test]
    fn test_null_check_without_value() {
        let params = SearchParams::new().with("deleted_at_op", "nl");
        let resolved = resolver().resolve(&schema(), &params).unwrap();
        assert_eq!(
            resolved.filters,
            vec![FieldParam::new("deleted_at", Operator::IsNull, vec![], false).unwrap()]
        );
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let params = SearchParams::new()
            .with("age", "3")
            .with("age_op", "approx");
        assert!(matches!(
            resolver().resolve(&schema(), &params),
            Err(SearchError::InvalidParam(_))
        ));
    }

    #[test]
    fn test_arity_mismatch_is_rejected() {
        let params = SearchParams::new().with("age_bt", "3");
        assert!(matches!(
            resolver().resolve(&schema(), &params),
            Err(SearchError::InvalidParam(_))
        ));

        let params = SearchParams::new()
            .with("age", vec!["1", "2"])
            .with("age_op", "gt");
        assert!(matches!(
            resolver().resolve(&schema(), &params),
            Err(SearchError::InvalidParam(_))
        ));
    }

    #[test]
    fn test_filter_order_follows_first_seen_key() {
        let params = SearchParams::new()
            .with("age_op", "ge")
            .with("name", "A")
            .with("age", "18");
        let resolved = resolver().resolve(&schema(), &params).unwrap();

        let fields: Vec<&str> = resolved.filters.iter().map(FieldParam::field).collect();
        assert_eq!(fields, vec!["age", "name"]);
    }

    #[test]
    fn test_sort_resolution() {
        let params = SearchParams::new()
            .with("sort", "age, name")
            .with("order", vec!["desc", "asc"]);
        let resolved = resolver().resolve(&schema(), &params).unwrap();
        assert_eq!(
            resolved.sort,
            SortSpec::new()
                .by("age", SortOrder::Desc)
                .by("name", SortOrder::Asc)
        );

        let params = SearchParams::new()
            .with("sort", "age,name")
            .with("order", "DESC");
        let resolved = resolver().resolve(&schema(), &params).unwrap();
        assert_eq!(
            resolved.sort,
            SortSpec::new()
                .by("age", SortOrder::Desc)
                .by("name", SortOrder::Desc)
        );

        let params = SearchParams::new()
            .with("sort", "age")
            .with("order", "sideways");
        let resolved = resolver().resolve(&schema(), &params).unwrap();
        assert_eq!(resolved.sort, SortSpec::new().by("age", SortOrder::Asc));
    }

    #[test]
    fn test_size_limit_filter_from_config() {
        let config = ParamsConfig {
            max_param_count: 1,
            ..ParamsConfig::default()
        };
        let resolver = ParamResolver::from_config(&config).unwrap();
        let params = SearchParams::new().with("name", "a").with("age", "1");
        assert!(matches!(
            resolver.resolve(&schema(), &params),
            Err(SearchError::InvalidParam(_))
        ));
    }

    #[test]
    fn test_custom_filter_can_rewrite_params() {
        struct ForceAdult;
        impl ParamFilter for ForceAdult {
            fn filter(
                &self,
                _schema: &SchemaDescriptor,
                mut params: SearchParams,
            ) -> Result<SearchParams, SearchError> {
                params.insert("age_ge", "18");
                Ok(params)
            }
        }

        let resolver = resolver().with_filter(ForceAdult);
        let resolved = resolver.resolve(&schema(), &SearchParams::new()).unwrap();
        assert_eq!(
            resolved.filters,
            vec![FieldParam::new("age", Operator::GreaterEqual, strings(&["18"]), false).unwrap()]
        );
    }

    #[test]
    fn test_custom_separator() {
        let config = ParamsConfig {
            separator: "-".to_string(),
            ..ParamsConfig::default()
        };
        let resolver = ParamResolver::from_config(&config).unwrap();
        let params = SearchParams::new().with("age-op", "lt").with("age", "9");
        let resolved = resolver.resolve(&schema(), &params).unwrap();
        assert_eq!(resolved.filters[0].operator(), Operator::LessThan);
    }

    #[test]
    fn test_unsupported_pagination_type() {
        let mut config = ParamsConfig::default();
        config.pagination.pagination_type = "cursor".to_string();
        assert!(matches!(
            ParamResolver::from_config(&config),
            Err(SearchError::Config(_))
        ));
    }
}
