use crate::binding::{Binding, Bindings, duplicate_name};
use crate::error::SqlResult;
use crate::options::StatementOptions;
use crate::value::Arg;
use std::fmt;

/// A mutable SQL statement buffer: text, positional arguments and named bindings.
///
/// Fragments are joined with a single space. Every `?` in the text is matched,
/// in order, with one [`Arg`]; collection arguments expand to one placeholder
/// per element when the statement is rendered. `${name}` / `:{name}`
/// placeholders are replaced with quoted identifiers registered via
/// [`bind`](SqlBuilder::bind).
///
/// ```ignore
/// use sqlweave::{sql, SqlBuilder};
///
/// let mut q = sql!("select ${cols} from ${table} where id in (?)", vec![3, 1, 4]);
/// q.bind_list("cols", ["id", "name"])?.bind("table", "users")?;
/// q.append_args("and status = ?", sqlweave::args!["active"]);
///
/// assert_eq!(
///     q.to_string(),
///     "select id, name from users where id in (?,?,?) and status = ?; args=[3, 1, 4, active]"
/// );
/// # Ok::<(), sqlweave::SqlError>(())
/// ```
#[must_use]
#[derive(Default)]
pub struct SqlBuilder {
    pub(crate) text: String,
    pub(crate) args: Vec<Arg>,
    pub(crate) bindings: Bindings,
    pub(crate) options: StatementOptions,
    // `false` only until the first fragment has been written.
    delimited: bool,
    // Set while bindings of this builder live on in a builder it was appended to.
    pub(crate) lent: bool,
}

impl SqlBuilder {
    /// Create a builder from an initial SQL fragment.
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            text: fragment.into(),
            delimited: true,
            ..Self::default()
        }
    }

    /// Create a builder from an initial fragment and its arguments.
    ///
    /// The number of `?` in `fragment` should match the number of `args`.
    pub fn with_args(fragment: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        let mut builder = Self::new(fragment);
        builder.args.extend(args);
        builder
    }

    /// Create an independent copy of `other`: text, arguments, bindings and options.
    ///
    /// Used to derive variants of a shared template, e.g. binding a different
    /// table name into each copy. Copying does not reserve `other`.
    pub fn from_builder(other: &SqlBuilder) -> Self {
        Self {
            text: other.text.clone(),
            args: other.args.clone(),
            bindings: other.bindings.clone(),
            options: other.options,
            delimited: true,
            lent: false,
        }
    }

    /// The current statement text, before any expansion or substitution.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The declared arguments, in placeholder order.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn options(&self) -> StatementOptions {
        self.options
    }

    /// `true` if there is neither text nor an argument.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.args.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    fn push_fragment(&mut self, fragment: &str) {
        if self.delimited {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
        self.delimited = true;
    }

    /// Append a SQL fragment, separated from the current text by one space.
    pub fn append(&mut self, fragment: &str) -> &mut Self {
        self.push_fragment(fragment);
        self
    }

    /// Append a parameterized fragment.
    pub fn append_args(&mut self, fragment: &str, args: impl IntoIterator<Item = Arg>) -> &mut Self {
        self.push_fragment(fragment);
        self.args.extend(args);
        self
    }

    /// Add one argument without touching the text.
    pub fn arg(&mut self, value: impl Into<Arg>) -> &mut Self {
        self.args.push(value.into());
        self
    }

    /// Append another builder: its text, a copy of its arguments and its bindings.
    ///
    /// Fails without modifying either builder if both bind the same name.
    ///
    /// A builder whose bindings were appended somewhere stays reserved: appending
    /// it again fails until [`apply_bindings`](SqlBuilder::apply_bindings) has
    /// resolved its names into its text.
    ///
    /// ```ignore
    /// let mut filter = sql!("${col} > ?", 5);
    /// filter.bind("col", "age")?;
    ///
    /// let mut a = sql("select * from users where");
    /// a.append_sql(&mut filter)?;
    /// let mut b = sql("select * from admins where");
    /// assert!(b.append_sql(&mut filter).is_err());
    /// b.append_sql(filter.apply_bindings()?)?;
    /// # Ok::<(), sqlweave::SqlError>(())
    /// ```
    pub fn append_sql(&mut self, other: &mut SqlBuilder) -> SqlResult<&mut Self> {
        if other.lent {
            if let Some(name) = other.bindings.names().next() {
                return Err(duplicate_name(name));
            }
        }
        self.bindings.merge(&other.bindings)?;
        other.lent = !other.bindings.is_empty();
        self.args.extend(other.args.iter().cloned());
        self.push_fragment(&other.text);
        Ok(self)
    }

    /// Wrap the current text as `before (<text>)`.
    ///
    /// ```ignore
    /// sql!("select id from users where age > ?", 30).wrap("select count(*) from");
    /// // select count(*) from (select id from users where age > ?)
    /// ```
    pub fn wrap(&mut self, before: &str) -> &mut Self {
        self.wrap_with(&format!("{before} ("), ")")
    }

    /// Surround the current text with `before` and `after`, without adding spaces.
    pub fn wrap_with(&mut self, before: &str, after: &str) -> &mut Self {
        self.text.insert_str(0, before);
        self.text.push_str(after);
        self
    }

    /// Bind `name` to a table, view or column name.
    ///
    /// The value is validated (and quoted if needed) when the statement is
    /// rendered. Fails if `name` is not `\w+` or is already bound.
    pub fn bind(&mut self, name: &str, value: impl Into<String>) -> SqlResult<&mut Self> {
        self.bindings.insert(name, Binding::Single(value.into()))?;
        Ok(self)
    }

    /// Bind `name` to a list of identifiers, rendered comma-separated.
    pub fn bind_list<I, S>(&mut self, name: &str, values: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.bindings.insert(name, Binding::Multi(values))?;
        Ok(self)
    }

    /// Bind several single-valued names at once. Nothing is bound if any name fails.
    pub fn bind_map<I, K, V>(&mut self, bindings: I) -> SqlResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.bindings.insert_all(
            bindings
                .into_iter()
                .map(|(k, v)| (k, Binding::Single(v.into()))),
        )?;
        Ok(self)
    }

    // ==================== Options ====================

    /// Request a scroll-insensitive cursor instead of a forward-only one.
    pub fn random_access(&mut self) -> &mut Self {
        self.options = self.options.random_access();
        self
    }

    pub fn with_fetch_size(&mut self, fetch_size: u32) -> &mut Self {
        self.options = self.options.with_fetch_size(fetch_size);
        self
    }

    pub fn with_max_rows(&mut self, max_rows: u64) -> &mut Self {
        self.options = self.options.with_max_rows(max_rows);
        self
    }

    pub fn with_options(&mut self, options: StatementOptions) -> &mut Self {
        self.options = options;
        self
    }
}

impl fmt::Display for SqlBuilder {
    /// The debug rendering: expanded SQL followed by `; args=[...]`.
    ///
    /// If the statement cannot be rendered (empty collection, bad identifier)
    /// the raw text and arguments are printed together with the error.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_debug_string() {
            Ok(s) => f.write_str(&s),
            Err(err) => {
                write!(f, "{}; args=[", self.text)?;
                for (i, arg) in self.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]; error={err}")
            }
        }
    }
}

impl Clone for SqlBuilder {
    /// Copies everything except the reservation left by [`append_sql`](SqlBuilder::append_sql).
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            args: self.args.clone(),
            bindings: self.bindings.clone(),
            options: self.options,
            delimited: self.delimited,
            lent: false,
        }
    }
}

impl fmt::Debug for SqlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlBuilder")
            .field("text", &self.text)
            .field("args", &self.args)
            .field("bindings", &self.bindings)
            .field("options", &self.options)
            .finish()
    }
}
