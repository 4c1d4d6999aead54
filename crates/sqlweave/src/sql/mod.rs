//! Composable parameterized SQL.
//!
//! A [`SqlBuilder`] collects SQL text with positional `?` placeholders, the
//! arguments for them and named identifier bindings. Rendering expands
//! collection arguments (`in (?)` with three values becomes `in (?,?,?)`) and
//! substitutes `${name}` / `:{name}` with validated, quoted identifiers.
//!
//! # Example
//!
//! ```ignore
//! use sqlweave::{args, sql};
//!
//! let mut q = sql!("select id, name from ${table} where 1=1");
//! q.bind("table", "users")?;
//! if !ids.is_empty() {
//!     q.append_args("and id in (?)", args![ids]);
//! }
//! q.append("order by name");
//!
//! let names = q.fetch_list(&client, |row| Ok(Some(row.try_get::<_, String>(1)?))).await?;
//! ```

mod builder;
mod exec;
mod interpolate;
mod template;


pub use builder::SqlBuilder;
pub use interpolate::{Prepared, RenderMode, Rendered};
pub use template::ParamSource;

/// Start building a SQL statement.
pub fn sql(fragment: impl Into<String>) -> SqlBuilder {
    SqlBuilder::new(fragment)
}

/// Collect heterogeneous values into a `Vec<Arg>`.
///
/// ```ignore
/// let args = args![5, "text", vec![1, 2, 3], mask("secret")];
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {{
        let args: ::std::vec::Vec<$crate::Arg> = ::std::vec![$($crate::Arg::from($arg)),*];
        args
    }};
}

/// Create a [`SqlBuilder`] from a fragment and its arguments.
///
/// ```ignore
/// let q = sql!("select a from foo where a in (?) and b = ?", vec![3, 1, 4], "x");
/// ```
#[macro_export]
macro_rules! sql {
    ($fragment:expr $(, $arg:expr)* $(,)?) => {
        $crate::SqlBuilder::with_args($fragment, $crate::args![$($arg),*])
    };
}
