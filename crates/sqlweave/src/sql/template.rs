//! Compiling `:1`-style numbered templates into statement buffers.

use super::builder::SqlBuilder;
use crate::error::{SqlError, SqlResult};
use crate::value::Arg;
use regex::Regex;
use std::sync::OnceLock;

/// Supplies names and values for [`SqlBuilder::from_numbered_parameters`].
///
/// Implementations usually wrap request or report parameters whose names are
/// `"1"`, `"2"`, ... and appear in templates as `:1`, `:2`, ...
pub trait ParamSource {
    /// All parameter names that may occur in a template.
    fn param_names(&self) -> Vec<String>;

    /// The value for `name`.
    ///
    /// `multi` is `true` when the parameter follows `IN (`; return a list
    /// argument to fill the list. `date_as_string` mirrors
    /// [`date_as_string_needed`](ParamSource::date_as_string_needed) for this occurrence.
    fn value(&self, name: &str, multi: bool, date_as_string: bool) -> SqlResult<Arg>;

    /// Whether the parameter after `preceding` is a date that must be rendered
    /// through [`date_format`](ParamSource::date_format) instead of a bare `?`.
    fn date_as_string_needed(&self, preceding: &str) -> bool {
        let _ = preceding;
        false
    }

    /// SQL text replacing the parameter when a date is passed as a string,
    /// e.g. `to_date(?, 'YYYY-MM-DD')`. Must contain exactly one `?`.
    fn date_format(&self) -> &str {
        "?"
    }
}

fn in_list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bin\s*\(\s*$").expect("invalid built-in IN-list regex"))
}

impl SqlBuilder {
    /// Compile a template with `:name` parameters into a builder.
    ///
    /// Each occurrence of `:name` outside single-quoted literals becomes `?` and
    /// adds one argument, so a parameter used twice is bound twice. Names that
    /// are not in [`ParamSource::param_names`] are left untouched (`:11` is not
    /// `:1` followed by `1`).
    ///
    /// ```ignore
    /// let q = SqlBuilder::from_numbered_parameters(
    ///     "select n from t where i = :2 or k = ':2' or j in (:1)",
    ///     &params,
    /// )?;
    /// // select n from t where i = ? or k = ':2' or j in (?)
    /// ```
    pub fn from_numbered_parameters(template: &str, params: &impl ParamSource) -> SqlResult<Self> {
        let names = params.param_names();
        if names.is_empty() {
            return Ok(Self::new(template));
        }

        let pattern = names
            .iter()
            .map(|n| format!(r":{}\b", regex::escape(n)))
            .collect::<Vec<_>>()
            .join("|");
        let marker = Regex::new(&pattern)
            .map_err(|e| SqlError::invalid_argument(format!("invalid parameter names: {e}")))?;

        let mut sql = String::with_capacity(template.len());
        let mut args = Vec::new();
        for (i, segment) in template.split('\'').enumerate() {
            if i > 0 {
                sql.push('\'');
            }
            // Odd segments are inside a string literal.
            if i % 2 == 1 {
                sql.push_str(segment);
                continue;
            }

            let mut last = 0;
            for m in marker.find_iter(segment) {
                let preceding = &segment[..m.start()];
                let multi = in_list_re().is_match(preceding);
                let date_as_string = params.date_as_string_needed(preceding);

                sql.push_str(&segment[last..m.start()]);
                sql.push_str(if date_as_string {
                    params.date_format()
                } else {
                    "?"
                });
                args.push(params.value(&m.as_str()[1..], multi, date_as_string)?);
                last = m.end();
            }
            sql.push_str(&segment[last..]);
        }

        Ok(Self::with_args(sql, args))
    }
}
