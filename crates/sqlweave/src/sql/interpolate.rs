//! Rendering: collection expansion and binding substitution.

use super::builder::SqlBuilder;
use crate::binding::Bindings;
use crate::error::{SqlError, SqlResult};
use crate::options::StatementOptions;
use crate::value::{Arg, Value};
use regex::Regex;
use std::borrow::Cow;
use std::fmt::Write as _;

/// What a rendering pass does and whether it changes the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Substitute bindings into the text, then forget them. Arguments are untouched.
    ApplyBindings,
    /// Expand collections and substitute bindings; the result becomes the
    /// builder's text and flattened argument list.
    ExpandAndApply,
    /// Expand and substitute without modifying the builder.
    ExpandAndSql,
    /// Like [`ExpandAndSql`](RenderMode::ExpandAndSql), with `; args=[...]` appended.
    ExpandAndString,
}

impl RenderMode {
    fn expands(self) -> bool {
        !matches!(self, Self::ApplyBindings)
    }

    fn commits(self) -> bool {
        matches!(self, Self::ApplyBindings | Self::ExpandAndApply)
    }
}

/// Output of one rendering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub sql: String,
    /// Flattened arguments, one per `?`. Empty for [`RenderMode::ApplyBindings`].
    pub args: Vec<Value>,
}

/// A statement ready for execution: final SQL, one value per `?`, and options.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub sql: String,
    pub args: Vec<Value>,
    pub options: StatementOptions,
}

impl SqlBuilder {
    /// Run one rendering pass. Committing modes update the builder only on success.
    pub fn interpolate(&mut self, mode: RenderMode) -> SqlResult<Rendered> {
        let rendered = self.render(mode)?;
        if mode.commits() {
            self.text.clone_from(&rendered.sql);
            self.bindings.clear();
            self.lent = false;

            if mode == RenderMode::ExpandAndApply {
                self.args = rendered.args.iter().cloned().map(Arg::Value).collect();

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    target: "sqlweave.sql",
                    sql = %self.text,
                    args = rendered.args.len(),
                    "expanded statement"
                );
            } else {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "sqlweave.sql", sql = %self.text, "applied bindings");
            }
        }
        Ok(rendered)
    }

    pub(crate) fn render(&self, mode: RenderMode) -> SqlResult<Rendered> {
        let (text, args) = if mode.expands() && !self.args.is_empty() {
            let (text, args) = expand_collections(&self.text, &self.args)?;
            (Cow::Owned(text), args)
        } else {
            (Cow::Borrowed(self.text.as_str()), Vec::new())
        };

        let mut sql = substitute_bindings(&text, &self.bindings)?;
        if mode == RenderMode::ExpandAndString {
            push_args(&mut sql, &args);
        }
        Ok(Rendered { sql, args })
    }

    /// Substitute all bindings into the text and forget them.
    ///
    /// Afterwards the builder can be appended to a parent that binds the same
    /// names. Calling it again is a no-op.
    pub fn apply_bindings(&mut self) -> SqlResult<&mut Self> {
        self.interpolate(RenderMode::ApplyBindings)?;
        Ok(self)
    }

    /// Produce the executable statement.
    ///
    /// The builder's text and arguments are replaced with the expanded forms, so
    /// preparing the same builder twice yields the same statement.
    pub fn prepare(&mut self) -> SqlResult<Prepared> {
        let Rendered { sql, args } = self.interpolate(RenderMode::ExpandAndApply)?;
        Ok(Prepared {
            sql,
            args,
            options: self.options,
        })
    }

    /// The final SQL text, without modifying the builder.
    pub fn to_sql(&self) -> SqlResult<String> {
        Ok(self.render(RenderMode::ExpandAndSql)?.sql)
    }

    /// The final SQL text followed by `; args=[...]`, masking sensitive values.
    pub fn to_debug_string(&self) -> SqlResult<String> {
        Ok(self.render(RenderMode::ExpandAndString)?.sql)
    }
}

/// Replace each `?` matched by a collection argument with one placeholder per
/// element and flatten the arguments.
///
/// `?` characters are matched to arguments left to right, including any inside
/// string literals. Placeholders without an argument are kept; arguments
/// without a placeholder are dropped.
pub(crate) fn expand_collections(text: &str, args: &[Arg]) -> SqlResult<(String, Vec<Value>)> {
    let mut sql = String::with_capacity(text.len() + args.len() * 2);
    let mut flat = Vec::with_capacity(args.len());
    let mut rest = text;
    let mut pending = args.iter();

    while let Some(pos) = rest.find('?') {
        let Some(arg) = pending.next() else {
            break;
        };
        sql.push_str(&rest[..=pos]);
        rest = &rest[pos + 1..];
        match arg {
            Arg::Value(v) => flat.push(v.clone()),
            Arg::List(values) => {
                if values.is_empty() {
                    return Err(SqlError::EmptyCollection);
                }
                for _ in 1..values.len() {
                    sql.push_str(",?");
                }
                flat.extend(values.iter().cloned());
            }
        }
    }
    sql.push_str(rest);

    #[cfg(feature = "tracing")]
    {
        let dropped = pending.len();
        if dropped > 0 {
            tracing::debug!(
                target: "sqlweave.sql",
                dropped,
                "more arguments than placeholders; extra arguments ignored"
            );
        }
    }
    Ok((sql, flat))
}

/// Replace every `${name}` / `:{name}` whose name is bound with the quoted
/// binding value. Placeholders with unknown names are left alone.
pub(crate) fn substitute_bindings(text: &str, bindings: &Bindings) -> SqlResult<String> {
    if bindings.is_empty() {
        return Ok(text.to_string());
    }

    // Quote everything up front so that a bad identifier fails even when its
    // placeholder is missing from the text.
    let mut names = Vec::with_capacity(bindings.len());
    let mut replacements = Vec::with_capacity(bindings.len());
    for (name, binding) in bindings.iter() {
        names.push(regex::escape(name));
        replacements.push((name, binding.quoted()?));
    }

    let pattern = format!(r"[:$]\{{({})\}}", names.join("|"));
    let re = Regex::new(&pattern)
        .map_err(|e| SqlError::invalid_argument(format!("invalid binding pattern: {e}")))?;

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some((_, quoted)) = replacements.iter().find(|(n, _)| *n == name.as_str()) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(quoted);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn push_args(sql: &mut String, args: &[Value]) {
    sql.push_str("; args=[");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        let _ = write!(sql, "{arg}");
    }
    sql.push(']');
}
