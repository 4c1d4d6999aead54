//! Per-statement execution options.

/// How the execution layer should open the result cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    /// Rows can only be read once, front to back (default).
    #[default]
    ForwardOnly,
    /// Rows can be revisited; the cursor does not see concurrent changes.
    ScrollInsensitive,
}

/// Options carried by a statement buffer and handed to the executor.
///
/// By default the cursor is forward-only, the driver picks the fetch size and
/// all rows are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatementOptions {
    pub scroll: ScrollMode,
    /// Rows fetched per round trip. `None` leaves it to the driver.
    pub fetch_size: Option<u32>,
    /// Maximum number of rows returned. `None` and `Some(0)` mean no limit.
    pub max_rows: Option<u64>,
}

impl StatementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a scroll-insensitive cursor.
    pub fn random_access(mut self) -> Self {
        self.scroll = ScrollMode::ScrollInsensitive;
        self
    }

    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    /// Return at most `max_rows` rows. `0` removes the limit.
    pub fn with_max_rows(mut self, max_rows: u64) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// The effective row limit, if any.
    pub fn row_limit(&self) -> Option<usize> {
        match self.max_rows {
            None | Some(0) => None,
            Some(max) => Some(usize::try_from(max).unwrap_or(usize::MAX)),
        }
    }
}
