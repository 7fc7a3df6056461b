use regex::Regex;
use thiserror::Error;

use super::model::CellValue;

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Ge,
    Le,
    Lt,
    Gt,
    Ne,
    Eq,
    Contains,
    DateStartsWith,
}

/// Operator spellings in precedence order: the first token found in a clause wins.
/// Word operators carry their trailing space.
const OPERATORS: &[(FilterOp, &[&str])] = &[
    (FilterOp::Ge, &["ge ", ">="]),
    (FilterOp::Le, &["le ", "<="]),
    (FilterOp::Lt, &["lt ", "<"]),
    (FilterOp::Gt, &["gt ", ">"]),
    (FilterOp::Ne, &["ne ", "!="]),
    (FilterOp::Eq, &["eq ", "="]),
    (FilterOp::Contains, &["contains "]),
    (FilterOp::DateStartsWith, &["datestartswith "]),
];

impl FilterOp {
    pub fn name(self) -> &'static str {
        match self {
            FilterOp::Ge => "ge",
            FilterOp::Le => "le",
            FilterOp::Lt => "lt",
            FilterOp::Gt => "gt",
            FilterOp::Ne => "ne",
            FilterOp::Eq => "eq",
            FilterOp::Contains => "contains",
            FilterOp::DateStartsWith => "datestartswith",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("filter on '{0}' has no value")]
    EmptyValue(String),
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("'{op}' needs a text column, '{column}' is numeric")]
    NotText { column: String, op: &'static str },
    #[error("invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

/// Literal on the right-hand side of a clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

/// One `{column} op value` term of a filter query.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub column: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// Parse one clause. `Ok(None)` when no operator occurs in it.
pub fn split_filter_part(part: &str) -> Result<Option<FilterClause>, FilterError> {
    for (op, spellings) in OPERATORS {
        for spelling in *spellings {
            let Some((name_part, value_part)) = part.split_once(spelling) else {
                continue;
            };

            let column = column_name(name_part);
            let value_part = value_part.trim();
            if value_part.is_empty() {
                return Err(FilterError::EmptyValue(column));
            }

            return Ok(Some(FilterClause {
                column,
                op: *op,
                value: parse_value(value_part),
            }));
        }
    }
    Ok(None)
}

/// Text between the first `{` and the last `}`; the trimmed text when unbraced.
fn column_name(name_part: &str) -> String {
    match (name_part.find('{'), name_part.rfind('}')) {
        (Some(start), Some(end)) if start < end => name_part[start + 1..end].to_string(),
        // Unbraced names are trimmed rather than sliced at fixed offsets.
        _ => name_part.trim().to_string(),
    }
}

fn parse_value(value_part: &str) -> FilterValue {
    // A lone quote character has no closing partner and stays plain text.
    let mut chars = value_part.chars();
    if let (Some(first), Some(last)) = (chars.next(), chars.next_back()) {
        if first == last && matches!(first, '\'' | '"' | '`') {
            let inner = &value_part[1..value_part.len() - 1];
            return FilterValue::Text(inner.replace(&format!("\\{first}"), &first.to_string()));
        }
    }
    match value_part.parse::<f64>() {
        Ok(n) => FilterValue::Number(n),
        Err(_) => FilterValue::Text(value_part.to_string()),
    }
}

/// Split a query on `" && "` and parse each clause. Parts without an operator are dropped.
pub fn parse_query(query: &str) -> Result<Vec<FilterClause>, FilterError> {
    let mut clauses = Vec::new();
    for part in query.split(" && ") {
        if let Some(clause) = split_filter_part(part)? {
            clauses.push(clause);
        }
    }
    Ok(clauses)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// A clause ready to be evaluated against cells of its column.
pub struct CompiledClause {
    clause: FilterClause,
    pattern: Option<Regex>,
}

impl FilterClause {
    pub fn compile(self) -> Result<CompiledClause, FilterError> {
        let pattern = match (&self.op, &self.value) {
            (FilterOp::Contains, value) => {
                let text = match value {
                    FilterValue::Text(s) => s.clone(),
                    FilterValue::Number(n) => CellValue::Number(*n).to_string(),
                };
                let re = Regex::new(&text).map_err(|e| FilterError::Pattern {
                    pattern: text.clone(),
                    message: e.to_string(),
                })?;
                Some(re)
            }
            _ => None,
        };
        Ok(CompiledClause {
            clause: self,
            pattern,
        })
    }
}

impl CompiledClause {
    /// Whether `cell` satisfies the clause.
    ///
    /// Comparisons follow dataframe semantics: a missing cell or a number/text
    /// mismatch only satisfies `ne`.
    pub fn matches(&self, cell: &CellValue) -> Result<bool, FilterError> {
        let op = self.clause.op;
        match op {
            FilterOp::Contains | FilterOp::DateStartsWith => {
                let text = match cell {
                    CellValue::Text(s) => s,
                    CellValue::Null => return Ok(false),
                    CellValue::Number(_) => {
                        return Err(FilterError::NotText {
                            column: self.clause.column.clone(),
                            op: op.name(),
                        });
                    }
                };
                Ok(match &self.pattern {
                    Some(re) => re.is_match(text),
                    None => match &self.clause.value {
                        FilterValue::Text(prefix) => text.starts_with(prefix.as_str()),
                        FilterValue::Number(n) => {
                            text.starts_with(&CellValue::Number(*n).to_string())
                        }
                    },
                })
            }
            _ => {
                let ordering = match (cell, &self.clause.value) {
                    (CellValue::Number(a), FilterValue::Number(b)) => a.partial_cmp(b),
                    (CellValue::Text(a), FilterValue::Text(b)) => Some(a.as_str().cmp(b.as_str())),
                    _ => None,
                };
                let Some(ordering) = ordering else {
                    return Ok(op == FilterOp::Ne);
                };
                Ok(match op {
                    FilterOp::Ge => ordering.is_ge(),
                    FilterOp::Le => ordering.is_le(),
                    FilterOp::Lt => ordering.is_lt(),
                    FilterOp::Gt => ordering.is_gt(),
                    FilterOp::Ne => ordering.is_ne(),
                    _ => ordering.is_eq(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(part: &str) -> FilterClause {
        split_filter_part(part).unwrap().unwrap()
    }

    fn eval(part: &str, cell: CellValue) -> bool {
        clause(part).compile().unwrap().matches(&cell).unwrap()
    }

    #[test]
    fn parses_symbolic_and_word_operators() {
        let c = clause("{Confirmed} >= 100");
        assert_eq!(c.column, "Confirmed");
        assert_eq!(c.op, FilterOp::Ge);
        assert_eq!(c.value, FilterValue::Number(100.0));

        assert_eq!(clause("{Dead} lt 5").op, FilterOp::Lt);
        assert_eq!(clause("{Dead} != 5").op, FilterOp::Ne);
        assert_eq!(clause("{Dead} = 5").op, FilterOp::Eq);
        assert_eq!(clause("{Dead} > 5").op, FilterOp::Gt);
    }

    #[test]
    fn first_matching_operator_wins() {
        // `<=` is checked before `<` and `=`.
        assert_eq!(clause("{Dead} <= 5").op, FilterOp::Le);
        // `ge ` appears inside the word and is found before `contains `.
        let c = clause("{Country/Region} contains Orange Walk");
        assert_eq!(c.op, FilterOp::Ge);
        assert_eq!(c.column, "Country/Region");
    }

    #[test]
    fn word_operators_keep_their_value() {
        let c = clause("{Country/Region} contains Italy");
        assert_eq!(c.op, FilterOp::Contains);
        assert_eq!(c.value, FilterValue::Text("Italy".into()));

        let c = clause("{Date} datestartswith 2020-03");
        assert_eq!(c.op, FilterOp::DateStartsWith);
        assert_eq!(c.value, FilterValue::Text("2020-03".into()));
    }

    #[test]
    fn quoted_values_stay_text_and_unescape() {
        let c = clause(r#"{Country/Region} eq "42""#);
        assert_eq!(c.value, FilterValue::Text("42".into()));

        let c = clause(r"{Country/Region} eq 'Cote d\'Ivoire'");
        assert_eq!(c.value, FilterValue::Text("Cote d'Ivoire".into()));

        let c = clause("{Country/Region} eq `US`");
        assert_eq!(c.value, FilterValue::Text("US".into()));

        let c = clause("{Country/Region} eq '");
        assert_eq!(c.value, FilterValue::Text("'".into()));
    }

    #[test]
    fn column_name_uses_outer_braces() {
        assert_eq!(clause("{{odd}} = 1").column, "{odd}");
        assert_eq!(clause("Dead = 1").column, "Dead");
        assert_eq!(clause("  Dead   ne 1").column, "Dead");
    }

    #[test]
    fn no_operator_means_no_clause() {
        assert_eq!(split_filter_part("").unwrap(), None);
        assert_eq!(split_filter_part("{Dead}").unwrap(), None);
        assert!(parse_query("").unwrap().is_empty());
    }

    #[test]
    fn empty_value_is_an_error() {
        assert_eq!(
            split_filter_part("{Dead} >=   "),
            Err(FilterError::EmptyValue("Dead".into()))
        );
    }

    #[test]
    fn query_splits_on_double_ampersand() {
        let clauses = parse_query("{Confirmed} > 10 && {Country/Region} contains land").unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].column, "Confirmed");
        assert_eq!(clauses[1].op, FilterOp::Contains);
    }

    #[test]
    fn numeric_comparisons() {
        assert!(eval("{Confirmed} >= 10", CellValue::Number(10.0)));
        assert!(!eval("{Confirmed} > 10", CellValue::Number(10.0)));
        assert!(eval("{Confirmed} lt 10", CellValue::Number(9.5)));
        assert!(eval("{Confirmed} eq 10", CellValue::Number(10.0)));
        assert!(eval("{Confirmed} ne 10", CellValue::Number(11.0)));
    }

    #[test]
    fn text_comparisons_are_lexicographic() {
        assert!(eval("{Country/Region} = Peru", CellValue::Text("Peru".into())));
        assert!(eval("{Country/Region} < Peru", CellValue::Text("Chad".into())));
        assert!(!eval("{Country/Region} > Peru", CellValue::Text("Chad".into())));
    }

    #[test]
    fn null_and_mismatch_only_satisfy_ne() {
        assert!(!eval("{Dead/Confirmed} = 0", CellValue::Null));
        assert!(!eval("{Dead/Confirmed} < 1", CellValue::Null));
        assert!(eval("{Dead/Confirmed} != 0", CellValue::Null));
        assert!(!eval("{Confirmed} = abc", CellValue::Number(1.0)));
        assert!(eval("{Confirmed} != abc", CellValue::Number(1.0)));
    }

    #[test]
    fn contains_is_a_regex_search() {
        assert!(eval("{Country/Region} contains ^Ma", CellValue::Text("Malta".into())));
        assert!(!eval("{Country/Region} contains ^Ma", CellValue::Text("Oman".into())));
        assert!(eval("{Country/Region} contains an", CellValue::Text("Oman".into())));
        assert!(!eval("{Country/Region} contains an", CellValue::Null));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = clause("{Country/Region} contains (").compile().err();
        assert!(matches!(err, Some(FilterError::Pattern { .. })));
    }

    #[test]
    fn datestartswith_is_a_prefix_test() {
        assert!(eval("{Date} datestartswith 2020", CellValue::Text("2020-04-01".into())));
        assert!(!eval("{Date} datestartswith 2021", CellValue::Text("2020-04-01".into())));
    }

    #[test]
    fn text_operators_reject_numeric_cells() {
        let compiled = clause("{Confirmed} contains 1").compile().unwrap();
        assert_eq!(
            compiled.matches(&CellValue::Number(1.0)),
            Err(FilterError::NotText {
                column: "Confirmed".into(),
                op: "contains",
            })
        );
    }
}
