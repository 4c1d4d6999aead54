//! # sqlweave
//!
//! Composable, injection-safe parameterized SQL.
//!
//! ## Features
//!
//! - **Positional arguments**: every `?` gets exactly one value; values never end up in the SQL text
//! - **Collection expansion**: a list argument expands `in (?)` to `in (?,?,?)` at render time
//! - **Identifier bindings**: `${name}` / `:{name}` are replaced with validated, quoted table or column names
//! - **Composition**: append builders to each other; bindings and arguments travel along
//! - **Masked values**: sensitive arguments are logged as an MD5 digest
//! - **Numbered templates**: compile `:1`, `:2` style templates into builders
//! - **Postgres execution**: run statements on a `tokio_postgres` client or transaction
//!
//! ```ignore
//! use sqlweave::{mask, sql};
//!
//! let mut q = sql!("select ${cols} from ${table} where id in (?)", vec![3, 1, 4]);
//! q.bind_list("cols", ["id", "email"])?.bind("table", "users")?;
//! q.append_args("and token = ?", sqlweave::args![mask(token)]);
//!
//! // select id, email from users where id in (?,?,?) and token = ?; args=[3, 1, 4, __masked__:...]
//! tracing::info!("{q}");
//!
//! let rows = q.fetch_all(&client).await?;
//! ```

pub mod binding;
pub mod client;
pub mod error;
pub mod ident;
pub mod options;
pub mod sql;
pub mod value;

pub use binding::{Binding, Bindings};
pub use client::Executor;
pub use error::{SqlError, SqlResult};
pub use ident::{QuoteMode, quote_name, quote_name_with};
pub use options::{ScrollMode, StatementOptions};
pub use sql::{ParamSource, Prepared, RenderMode, Rendered, SqlBuilder, sql};
pub use value::{Arg, LongString, Masked, Value, mask};
