use rustc_hash::FxHashSet;

/// Environment variable listing the tables whose rows are traced while
/// resolving, comma-separated. `*` selects every table.
pub const DEBUG_TABLES_ENV: &str = "VGATE_DEBUG_TABLES";

/// Decides which tables get per-row debug tracing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugTableFilter {
    all: bool,
    tables: FxHashSet<String>,
}

impl DebugTableFilter {
    /// A filter that matches nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            all: true,
            tables: FxHashSet::default(),
        }
    }

    pub fn from_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all: false,
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list; blank entries are ignored.
    pub fn parse(value: &str) -> Self {
        let mut filter = Self::none();
        for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry == "*" {
                filter.all = true;
            } else {
                filter.tables.insert(entry.to_string());
            }
        }
        filter
    }

    /// Read [`DEBUG_TABLES_ENV`]; unset means no table is traced.
    pub fn from_env() -> Self {
        std::env::var(DEBUG_TABLES_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    pub fn matches(&self, table: &str) -> bool {
        self.all || self.tables.contains(table)
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.tables.is_empty()
    }
}
