//! Column Registry for the States Dataset
//!
//! Single source of truth for what is queryable: the fixed correspondence
//! between public field names (what callers pass in `sort_by`), storage
//! column identifiers (what appears in SQL), and the source-feed header
//! spellings the ingestion pipeline accepts. The DDL, select list, and
//! insert statement are all generated from this one table, so the registry,
//! the stored schema, and the ingestion target cannot drift apart.
//!
//! Storage identifiers are plain lowercase snake_case and are never quoted.

// ============================================================================
// STORAGE IDENTIFIERS
// ============================================================================

/// Storage column names. These are the only identifiers that ever appear as
/// raw text inside a SQL statement.
pub mod col {
    pub const STATE_NAME: &str = "state_name";
    pub const POPULATION: &str = "population";
    pub const INCOME: &str = "income";
    pub const ILLITERACY: &str = "illiteracy";
    pub const LIFE_EXP: &str = "life_exp";
    pub const MURDER: &str = "murder";
    pub const HS_GRAD: &str = "hs_grad";
    pub const FROST: &str = "frost";
    pub const AREA: &str = "area";
}

/// Table holding one row per state.
pub const TABLE: &str = "states";

/// Sort key applied when a query does not name one.
pub const DEFAULT_SORT_KEY: &str = "name";

// ============================================================================
// COLUMN DEFINITIONS
// ============================================================================

/// SQL value class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
}

impl ColumnKind {
    /// Postgres type used when creating the table.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "DOUBLE PRECISION",
        }
    }
}

/// One entry of the public-name / storage-identifier correspondence.
///
/// `source_aliases` lists feed header spellings that differ from the public
/// name (the public name itself always matches). The upstream CSV feed uses
/// R-style headers (`rownames`, `Life Exp`, `HS Grad`); the JSON feed has
/// used `state` and dotted variants at different points in its history, so
/// all known spellings are kept here rather than patched inline in the
/// pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    /// Externally visible field name, also the serialized record key.
    pub public_name: &'static str,
    /// Storage column identifier.
    pub column: &'static str,
    pub kind: ColumnKind,
    /// Whether the column carries a UNIQUE constraint.
    pub unique: bool,
    /// Accepted source header spellings beyond the public name.
    pub source_aliases: &'static [&'static str],
}

impl ColumnDef {
    /// True when `key` names this column in a source row. Matching is ASCII
    /// case-insensitive over the public name and every alias.
    pub fn matches_source_key(&self, key: &str) -> bool {
        let key = key.trim();
        self.public_name.eq_ignore_ascii_case(key)
            || self.source_aliases.iter().any(|a| a.eq_ignore_ascii_case(key))
    }
}

/// The nine data columns, in the order they are stored, selected, and
/// enumerated to callers.
pub const STATE_COLUMNS: [ColumnDef; 9] = [
    ColumnDef {
        public_name: "name",
        column: col::STATE_NAME,
        kind: ColumnKind::Text,
        unique: true,
        source_aliases: &["rownames", "state", "state_name"],
    },
    ColumnDef {
        public_name: "population",
        column: col::POPULATION,
        kind: ColumnKind::Integer,
        unique: false,
        source_aliases: &[],
    },
    ColumnDef {
        public_name: "income",
        column: col::INCOME,
        kind: ColumnKind::Integer,
        unique: false,
        source_aliases: &[],
    },
    ColumnDef {
        public_name: "illiteracy",
        column: col::ILLITERACY,
        kind: ColumnKind::Real,
        unique: false,
        source_aliases: &[],
    },
    ColumnDef {
        public_name: "life_exp",
        column: col::LIFE_EXP,
        kind: ColumnKind::Real,
        unique: false,
        source_aliases: &["life exp", "life.exp"],
    },
    ColumnDef {
        public_name: "murder",
        column: col::MURDER,
        kind: ColumnKind::Real,
        unique: false,
        source_aliases: &[],
    },
    ColumnDef {
        public_name: "hs_grad",
        column: col::HS_GRAD,
        kind: ColumnKind::Real,
        unique: false,
        source_aliases: &["hs grad", "hs.grad"],
    },
    ColumnDef {
        public_name: "frost",
        column: col::FROST,
        kind: ColumnKind::Integer,
        unique: false,
        source_aliases: &[],
    },
    ColumnDef {
        public_name: "area",
        column: col::AREA,
        kind: ColumnKind::Integer,
        unique: false,
        source_aliases: &[],
    },
];

// ============================================================================
// REGISTRY
// ============================================================================

/// Lookup view over a column table. Constructed once at startup and passed
/// into the query builder; pure lookups, no side effects.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRegistry {
    defs: &'static [ColumnDef],
}

impl ColumnRegistry {
    /// Registry over [`STATE_COLUMNS`].
    pub const fn new() -> Self {
        Self {
            defs: &STATE_COLUMNS,
        }
    }

    /// Registry over a caller-supplied table. Used by tests that need a
    /// registry diverging from the real schema.
    pub const fn with_defs(defs: &'static [ColumnDef]) -> Self {
        Self { defs }
    }

    /// Resolve a public field name (ASCII case-insensitive) to its storage
    /// identifier.
    pub fn resolve(&self, public_key: &str) -> Option<&'static str> {
        self.defs
            .iter()
            .find(|d| d.public_name.eq_ignore_ascii_case(public_key))
            .map(|d| d.column)
    }

    /// Public field names in declaration order. This is the enumeration
    /// callers see when they pass an unknown sort key.
    pub fn public_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.iter().map(|d| d.public_name)
    }

    /// The full column table backing this registry.
    pub fn defs(&self) -> &'static [ColumnDef] {
        self.defs
    }
}

impl Default for ColumnRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SCHEMA & STATEMENT GENERATION
// ============================================================================

/// DDL for the states table. `id` is a surrogate key; every data column is
/// NOT NULL because a refresh only ever writes fully populated rows.
pub fn create_table_sql() -> String {
    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    id BIGSERIAL PRIMARY KEY",
        TABLE
    );
    for def in &STATE_COLUMNS {
        sql.push_str(",\n    ");
        sql.push_str(def.column);
        sql.push(' ');
        sql.push_str(def.kind.sql_type());
        sql.push_str(" NOT NULL");
        if def.unique {
            sql.push_str(" UNIQUE");
        }
    }
    sql.push_str("\n)");
    sql
}

/// Comma-separated storage columns in registry order.
pub fn select_list() -> String {
    STATE_COLUMNS
        .iter()
        .map(|d| d.column)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parameterized insert statement covering all nine data columns.
pub fn insert_sql() -> String {
    let placeholders = (1..=STATE_COLUMNS.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        TABLE,
        select_list(),
        placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn public_names_and_columns_are_unique() {
        let names: HashSet<_> = STATE_COLUMNS.iter().map(|d| d.public_name).collect();
        let columns: HashSet<_> = STATE_COLUMNS.iter().map(|d| d.column).collect();
        assert_eq!(names.len(), STATE_COLUMNS.len());
        assert_eq!(columns.len(), STATE_COLUMNS.len());
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let registry = ColumnRegistry::new();
        assert_eq!(registry.resolve("life_exp"), Some(col::LIFE_EXP));
        assert_eq!(registry.resolve("LIFE_EXP"), Some(col::LIFE_EXP));
        assert_eq!(registry.resolve("Name"), Some(col::STATE_NAME));
        assert_eq!(registry.resolve("AREA"), Some(col::AREA));
    }

    #[test]
    fn resolve_rejects_unknown_keys() {
        let registry = ColumnRegistry::new();
        assert_eq!(registry.resolve("lifespan"), None);
        assert_eq!(registry.resolve(""), None);
        assert_eq!(registry.resolve("state_name; DROP TABLE states"), None);
        // Storage identifiers that are not public names stay internal.
        assert_eq!(registry.resolve("state_name"), None);
    }

    #[test]
    fn default_sort_key_is_registered() {
        let registry = ColumnRegistry::new();
        assert_eq!(registry.resolve(DEFAULT_SORT_KEY), Some(col::STATE_NAME));
    }

    #[test]
    fn public_names_enumerate_in_declared_order() {
        let registry = ColumnRegistry::new();
        let names: Vec<_> = registry.public_names().collect();
        assert_eq!(
            names,
            vec![
                "name",
                "population",
                "income",
                "illiteracy",
                "life_exp",
                "murder",
                "hs_grad",
                "frost",
                "area"
            ]
        );
    }

    #[test]
    fn source_matching_accepts_feed_header_spellings() {
        let by_public = |name: &str| {
            STATE_COLUMNS
                .iter()
                .find(|d| d.public_name == name)
                .expect("column exists")
        };

        // R-dataset CSV headers.
        assert!(by_public("name").matches_source_key("rownames"));
        assert!(by_public("population").matches_source_key("Population"));
        assert!(by_public("life_exp").matches_source_key("Life Exp"));
        assert!(by_public("hs_grad").matches_source_key("HS Grad"));
        assert!(by_public("frost").matches_source_key("Frost"));

        // Dotted R variable names.
        assert!(by_public("life_exp").matches_source_key("Life.Exp"));
        assert!(by_public("hs_grad").matches_source_key("HS.Grad"));

        // JSON feed spellings.
        assert!(by_public("name").matches_source_key("state"));
        assert!(by_public("name").matches_source_key("name"));

        assert!(!by_public("murder").matches_source_key("homicide"));
    }

    #[test]
    fn ddl_covers_every_storage_column() {
        let ddl = create_table_sql();
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS states"));
        for def in &STATE_COLUMNS {
            assert!(ddl.contains(def.column), "DDL missing {}", def.column);
        }
        assert!(ddl.contains("state_name TEXT NOT NULL UNIQUE"));
        assert!(ddl.contains("life_exp DOUBLE PRECISION NOT NULL"));
        assert!(ddl.contains("population INTEGER NOT NULL"));
    }

    #[test]
    fn insert_statement_binds_one_parameter_per_column() {
        let sql = insert_sql();
        assert!(sql.starts_with("INSERT INTO states ("));
        for i in 1..=STATE_COLUMNS.len() {
            assert!(sql.contains(&format!("${}", i)));
        }
        assert!(!sql.contains("$10"));
    }

    #[test]
    fn select_list_follows_registry_order() {
        assert_eq!(
            select_list(),
            "state_name, population, income, illiteracy, life_exp, murder, hs_grad, frost, area"
        );
    }
}
