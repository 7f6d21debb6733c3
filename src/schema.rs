//! Table definitions of the GTFS objects and their creation
//!
//! Two generations of the schema coexist, see [SchemaVariant]. Every object describes its table once,
//! and the [TableDefinition] renders the SQL of the requested generation.
use crate::objects::*;
use crate::Error;
use itertools::Itertools;
use rusqlite::{Connection, ErrorCode};

/// Generation of the database schema
#[derive(Derivative, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[derivative(Default)]
pub enum SchemaVariant {
    /// Historical column list: type literals of the older reference schema (`VARCHAR(255)`, `decimal(9,6)`,
    /// `tinyint(1)`, `TIME`…), NOT NULL only on primary keys, no foreign keys and no uniqueness on composite keys
    Legacy,
    /// Natural SQLite types, NOT NULL on every mandatory field, foreign keys, unique composite keys
    /// and the derived columns `stops.routes` and `stop_times.is_last_stop`
    #[derivative(Default)]
    Current,
}

/// Allows to parameterize the tables that are created
#[derive(Derivative, Debug, Clone, PartialEq, Eq)]
#[derivative(Default)]
pub struct SchemaConfig {
    /// Generation of the schema
    pub variant: SchemaVariant,
    /// Declares `agency_id` of [Route] and [FareAttribute] as a reference to [Agency]
    ///
    /// Feeds with a single agency often leave `agency_id` empty, so it is not enforced by default.
    /// It only has an effect with [SchemaVariant::Current].
    pub agency_references: bool,
}

/// A column of a [TableDefinition]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// GTFS name of the column
    pub name: &'static str,
    sql_type: &'static str,
    /// `None` when the column did not exist in the legacy schema
    legacy_type: Option<&'static str>,
    not_null: bool,
    default: Option<&'static str>,
}

impl ColumnDefinition {
    /// A column present in both generations
    pub fn new(name: &'static str, sql_type: &'static str, legacy_type: &'static str) -> Self {
        ColumnDefinition {
            name,
            sql_type,
            legacy_type: Some(legacy_type),
            not_null: false,
            default: None,
        }
    }

    /// A column that only exists in [SchemaVariant::Current]
    pub fn current_only(name: &'static str, sql_type: &'static str) -> Self {
        ColumnDefinition {
            name,
            sql_type,
            legacy_type: None,
            not_null: false,
            default: None,
        }
    }

    /// Mandatory field. The legacy schema only keeps NOT NULL on primary keys
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// SQL literal used when the column is not given
    pub fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    /// SQL type of the column in the given schema, `None` if the column does not exist
    pub fn sql_type(&self, variant: SchemaVariant) -> Option<&'static str> {
        match variant {
            SchemaVariant::Current => Some(self.sql_type),
            SchemaVariant::Legacy => self.legacy_type,
        }
    }
}

/// A foreign key of a [TableDefinition]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Column of the referencing table
    pub column: &'static str,
    /// Referenced table
    pub table: &'static str,
    /// Referenced column
    pub foreign_column: &'static str,
}

/// A secondary index of a [TableDefinition]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Indexed columns
    pub columns: Vec<&'static str>,
    /// Only enforced by [SchemaVariant::Current], the legacy schema creates a plain index
    pub unique: bool,
}

/// Describes the table of a GTFS object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    /// Name of the table
    pub name: &'static str,
    columns: Vec<ColumnDefinition>,
    primary_key: Vec<&'static str>,
    legacy_primary_key: bool,
    references: Vec<Reference>,
    indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    /// An empty table
    pub fn new(name: &'static str) -> Self {
        TableDefinition {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
            legacy_primary_key: false,
            references: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Appends a column. Columns are created in the order they are added
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Primary key in both generations
    pub fn primary_key(mut self, columns: &[&'static str]) -> Self {
        self.primary_key = columns.to_vec();
        self.legacy_primary_key = true;
        self
    }

    /// Primary key only declared by [SchemaVariant::Current]
    pub fn current_primary_key(mut self, columns: &[&'static str]) -> Self {
        self.primary_key = columns.to_vec();
        self.legacy_primary_key = false;
        self
    }

    /// Foreign key, only declared by [SchemaVariant::Current]
    pub fn reference(
        mut self,
        column: &'static str,
        table: &'static str,
        foreign_column: &'static str,
    ) -> Self {
        self.references.push(Reference {
            column,
            table,
            foreign_column,
        });
        self
    }

    /// Lookup index
    pub fn index(mut self, columns: &[&'static str]) -> Self {
        self.indexes.push(IndexDefinition {
            columns: columns.to_vec(),
            unique: false,
        });
        self
    }

    /// Unique index, only unique with [SchemaVariant::Current]
    pub fn unique_index(mut self, columns: &[&'static str]) -> Self {
        self.indexes.push(IndexDefinition {
            columns: columns.to_vec(),
            unique: true,
        });
        self
    }

    /// Columns existing in the given generation
    pub fn columns(&self, variant: SchemaVariant) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns
            .iter()
            .filter(move |c| c.sql_type(variant).is_some())
    }

    /// Names of the columns existing in the given generation, in creation order
    pub fn column_names(&self, variant: SchemaVariant) -> Vec<&'static str> {
        self.columns(variant).map(|c| c.name).collect()
    }

    /// Does the column exist in the given generation
    pub fn has_column(&self, variant: SchemaVariant, name: &str) -> bool {
        self.columns(variant).any(|c| c.name == name)
    }

    fn primary_key_for(&self, variant: SchemaVariant) -> &[&'static str] {
        match variant {
            SchemaVariant::Current => &self.primary_key,
            SchemaVariant::Legacy if self.legacy_primary_key => &self.primary_key,
            SchemaVariant::Legacy => &[],
        }
    }

    /// `CREATE TABLE` statement of the given generation
    pub fn create_sql(&self, variant: SchemaVariant) -> String {
        let primary_key = self.primary_key_for(variant);
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .filter_map(|c| {
                let sql_type = c.sql_type(variant)?;
                let not_null = match variant {
                    SchemaVariant::Current => c.not_null,
                    SchemaVariant::Legacy => false,
                } || primary_key.contains(&c.name);
                let mut line = format!("{} {}", c.name, sql_type);
                if not_null {
                    line.push_str(" NOT NULL");
                }
                if let Some(default) = c.default {
                    line.push_str(" DEFAULT ");
                    line.push_str(default);
                }
                Some(line)
            })
            .collect();

        if !primary_key.is_empty() {
            lines.push(format!("PRIMARY KEY ({})", primary_key.iter().join(", ")));
        }
        if variant == SchemaVariant::Current {
            lines.extend(self.references.iter().map(|r| {
                format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    r.column, r.table, r.foreign_column
                )
            }));
        }

        format!("CREATE TABLE {} (\n    {}\n)", self.name, lines.join(",\n    "))
    }

    /// `CREATE INDEX` statements of the given generation
    pub fn index_sql(&self, variant: SchemaVariant) -> Vec<String> {
        self.indexes
            .iter()
            .map(|index| {
                let unique = index.unique && variant == SchemaVariant::Current;
                format!(
                    "CREATE {}INDEX {}_{} ON {} ({})",
                    if unique { "UNIQUE " } else { "" },
                    self.name,
                    index.columns.iter().join("_"),
                    self.name,
                    index.columns.iter().join(", ")
                )
            })
            .collect()
    }

    /// Drops the table if it exists, then creates it and its indexes
    ///
    /// All the rows of a previous table are lost: this is the only way to change the schema.
    pub fn create(&self, conn: &Connection, variant: SchemaVariant) -> Result<(), Error> {
        self.drop_if_exists(conn)?;

        let schema_error = |source: rusqlite::Error| Error::Schema {
            table: self.name.to_owned(),
            source,
        };
        conn.execute_batch(&self.create_sql(variant))
            .map_err(schema_error)?;
        for sql in self.index_sql(variant) {
            conn.execute_batch(&sql).map_err(schema_error)?;
        }
        log::debug!("created table {} ({:?} schema)", self.name, variant);
        Ok(())
    }

    pub(crate) fn drop_if_exists(&self, conn: &Connection) -> Result<(), Error> {
        match conn.execute_batch(&format!("DROP TABLE {}", self.name)) {
            Ok(()) => {
                log::debug!("dropped table {}", self.name);
                Ok(())
            }
            Err(e) if is_missing_table(&e) => {
                log::info!("table {} does not exist, nothing to drop", self.name);
                Ok(())
            }
            Err(source) => Err(Error::Schema {
                table: self.name.to_owned(),
                source,
            }),
        }
    }
}

fn is_missing_table(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(failure, Some(message)) => {
            failure.code == ErrorCode::Unknown && message.starts_with("no such table")
        }
        _ => false,
    }
}

/// A GTFS object stored in its own table
pub trait Schema {
    /// Name of the table
    const TABLE_NAME: &'static str;

    /// Describes the table for the given configuration
    fn table_definition(config: &SchemaConfig) -> TableDefinition;

    /// Drops and recreates the table of the object
    fn create_table(conn: &Connection, config: &SchemaConfig) -> Result<(), Error> {
        Self::table_definition(config).create(conn, config.variant)
    }
}

impl Schema for Agency {
    const TABLE_NAME: &'static str = "agency";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("agency_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("agency_name", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("agency_url", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("agency_timezone", "TEXT", "VARCHAR(50)").not_null())
            .column(ColumnDefinition::new("agency_lang", "TEXT", "VARCHAR(2)"))
            .column(ColumnDefinition::new("agency_phone", "TEXT", "VARCHAR(50)"))
            .column(ColumnDefinition::new("agency_fare_url", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("agency_email", "TEXT", "VARCHAR(255)"))
            .primary_key(&["agency_id"])
    }
}

impl Schema for Calendar {
    const TABLE_NAME: &'static str = "calendar";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        let mut table = TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("service_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("start_date", "TEXT", "DATE").not_null())
            .column(ColumnDefinition::new("end_date", "TEXT", "DATE").not_null());
        for day in &[
            "monday",
            "tuesday",
            "wednesday",
            "thursday",
            "friday",
            "saturday",
            "sunday",
        ] {
            table = table.column(ColumnDefinition::new(*day, "INTEGER", "tinyint(1)").not_null());
        }
        table.primary_key(&["service_id"])
    }
}

impl Schema for CalendarDate {
    const TABLE_NAME: &'static str = "calendar_dates";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("service_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("date", "TEXT", "DATE").not_null())
            .column(ColumnDefinition::new("exception_type", "INTEGER", "tinyint(2)").not_null())
            .index(&["service_id"])
    }
}

impl Schema for Route {
    const TABLE_NAME: &'static str = "routes";

    fn table_definition(config: &SchemaConfig) -> TableDefinition {
        let table = TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("route_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("route_type", "INTEGER", "tinyint(2)").not_null())
            .column(ColumnDefinition::new("agency_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("route_short_name", "TEXT", "VARCHAR(50)"))
            .column(ColumnDefinition::new("route_long_name", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("route_desc", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("route_url", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("route_color", "TEXT", "VARCHAR(6)"))
            .column(ColumnDefinition::new("route_text_color", "TEXT", "VARCHAR(6)"))
            .column(ColumnDefinition::new("route_sort_order", "INTEGER", "int(11)"))
            .column(ColumnDefinition::new("continuous_pickup", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("continuous_drop_off", "INTEGER", "tinyint(1)"))
            .primary_key(&["route_id"])
            .index(&["agency_id"]);
        if config.agency_references {
            table.reference("agency_id", Agency::TABLE_NAME, "agency_id")
        } else {
            table
        }
    }
}

impl Schema for Direction {
    const TABLE_NAME: &'static str = "directions";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("direction_id", "INTEGER", "tinyint(1)").not_null())
            .column(ColumnDefinition::new("route_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("direction", "TEXT", "VARCHAR(20)").not_null())
            .column(ColumnDefinition::new("direction_name", "TEXT", "VARCHAR(255)"))
            .current_primary_key(&["direction_id", "route_id"])
            .reference("route_id", Route::TABLE_NAME, "route_id")
            .index(&["route_id"])
    }
}

impl Schema for FareAttribute {
    const TABLE_NAME: &'static str = "fare_attributes";

    fn table_definition(config: &SchemaConfig) -> TableDefinition {
        let table = TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("fare_id", "TEXT", "VARCHAR(255)").not_null())
            .column(
                ColumnDefinition::new("price", "REAL", "decimal(10,2)")
                    .not_null()
                    .default_value("0.0"),
            )
            .column(ColumnDefinition::new("currency_type", "TEXT", "VARCHAR(3)").not_null())
            .column(ColumnDefinition::new("payment_method", "INTEGER", "tinyint(1)").not_null())
            .column(ColumnDefinition::new("transfers", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("agency_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("transfer_duration", "INTEGER", "int(11)"))
            .primary_key(&["fare_id"]);
        if config.agency_references {
            table.reference("agency_id", Agency::TABLE_NAME, "agency_id")
        } else {
            table
        }
    }
}

impl Schema for FareRule {
    const TABLE_NAME: &'static str = "fare_rules";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("fare_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("route_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("origin_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("destination_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("contains_id", "TEXT", "VARCHAR(255)"))
            .reference("fare_id", FareAttribute::TABLE_NAME, "fare_id")
            .reference("route_id", Route::TABLE_NAME, "route_id")
            .index(&["fare_id"])
    }
}

impl Schema for Shape {
    const TABLE_NAME: &'static str = "shapes";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("shape_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("shape_pt_lat", "REAL", "decimal(9,6)").not_null())
            .column(ColumnDefinition::new("shape_pt_lon", "REAL", "decimal(9,6)").not_null())
            .column(ColumnDefinition::new("shape_pt_sequence", "INTEGER", "int(11)").not_null())
            .column(ColumnDefinition::new("shape_dist_traveled", "REAL", "float"))
            .index(&["shape_id"])
    }
}

impl Schema for Stop {
    const TABLE_NAME: &'static str = "stops";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("stop_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("stop_code", "TEXT", "VARCHAR(50)"))
            .column(ColumnDefinition::new("stop_name", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("stop_desc", "TEXT", "VARCHAR(255)"))
            .column(
                ColumnDefinition::new("stop_lat", "REAL", "decimal(9,6)")
                    .not_null()
                    .default_value("0"),
            )
            .column(
                ColumnDefinition::new("stop_lon", "REAL", "decimal(9,6)")
                    .not_null()
                    .default_value("0"),
            )
            .column(ColumnDefinition::new("zone_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("location_type", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("parent_station", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("stop_timezone", "TEXT", "VARCHAR(50)"))
            .column(ColumnDefinition::new("wheelchair_boarding", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("level_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("platform_code", "TEXT", "VARCHAR(50)"))
            .column(ColumnDefinition::current_only("routes", "TEXT"))
            .primary_key(&["stop_id"])
            .index(&["parent_station"])
    }
}

impl Schema for StopTime {
    const TABLE_NAME: &'static str = "stop_times";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("trip_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("arrival_time", "TEXT", "TIME").not_null())
            .column(ColumnDefinition::new("departure_time", "TEXT", "TIME").not_null())
            .column(ColumnDefinition::new("stop_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("stop_sequence", "INTEGER", "int(11)").not_null())
            .column(ColumnDefinition::new("stop_headsign", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("pickup_type", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("drop_off_type", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("continuous_pickup", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("continuous_drop_off", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("shape_dist_traveled", "REAL", "float"))
            .column(ColumnDefinition::new("timepoint", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::current_only("is_last_stop", "INTEGER"))
            .reference("trip_id", Trip::TABLE_NAME, "trip_id")
            .reference("stop_id", Stop::TABLE_NAME, "stop_id")
            .unique_index(&["trip_id", "stop_sequence"])
            .index(&["stop_id"])
    }
}

impl Schema for Trip {
    const TABLE_NAME: &'static str = "trips";

    fn table_definition(_config: &SchemaConfig) -> TableDefinition {
        TableDefinition::new(Self::TABLE_NAME)
            .column(ColumnDefinition::new("trip_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("route_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("service_id", "TEXT", "VARCHAR(255)").not_null())
            .column(ColumnDefinition::new("trip_headsign", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("trip_short_name", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("direction_id", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("block_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("shape_id", "TEXT", "VARCHAR(255)"))
            .column(ColumnDefinition::new("wheelchair_accessible", "INTEGER", "tinyint(1)"))
            .column(ColumnDefinition::new("bikes_allowed", "INTEGER", "tinyint(1)"))
            .primary_key(&["trip_id"])
            .reference("route_id", Route::TABLE_NAME, "route_id")
            .reference("service_id", Calendar::TABLE_NAME, "service_id")
            .index(&["route_id"])
            .index(&["service_id"])
            .index(&["shape_id"])
    }
}

#[test]
fn test_current_create_sql() {
    let sql = StopTime::table_definition(&SchemaConfig::default()).create_sql(SchemaVariant::Current);
    assert!(sql.starts_with("CREATE TABLE stop_times (\n    trip_id TEXT NOT NULL,"));
    assert!(sql.contains("arrival_time TEXT NOT NULL"));
    assert!(sql.contains("is_last_stop INTEGER"));
    assert!(sql.contains("FOREIGN KEY (trip_id) REFERENCES trips (trip_id)"));
    assert!(sql.contains("FOREIGN KEY (stop_id) REFERENCES stops (stop_id)"));
    assert!(!sql.contains("PRIMARY KEY"));
}

#[test]
fn test_legacy_create_sql() {
    let sql = StopTime::table_definition(&SchemaConfig::default()).create_sql(SchemaVariant::Legacy);
    assert!(sql.contains("arrival_time TIME,"));
    assert!(sql.contains("stop_sequence int(11),"));
    assert!(!sql.contains("is_last_stop"));
    assert!(!sql.contains("NOT NULL"));
    assert!(!sql.contains("FOREIGN KEY"));

    let stops = Stop::table_definition(&SchemaConfig::default()).create_sql(SchemaVariant::Legacy);
    assert!(stops.contains("stop_id VARCHAR(255) NOT NULL"));
    assert!(stops.contains("stop_lat decimal(9,6) DEFAULT 0"));
    assert!(stops.contains("PRIMARY KEY (stop_id)"));
}

#[test]
fn test_index_sql() {
    let table = StopTime::table_definition(&SchemaConfig::default());
    assert_eq!(
        vec![
            "CREATE UNIQUE INDEX stop_times_trip_id_stop_sequence ON stop_times (trip_id, stop_sequence)",
            "CREATE INDEX stop_times_stop_id ON stop_times (stop_id)",
        ],
        table.index_sql(SchemaVariant::Current)
    );
    assert_eq!(
        "CREATE INDEX stop_times_trip_id_stop_sequence ON stop_times (trip_id, stop_sequence)",
        table.index_sql(SchemaVariant::Legacy)[0]
    );
}

#[test]
fn test_composite_primary_key_is_current_only() {
    let table = Direction::table_definition(&SchemaConfig::default());
    assert!(table
        .create_sql(SchemaVariant::Current)
        .contains("PRIMARY KEY (direction_id, route_id)"));
    assert!(!table
        .create_sql(SchemaVariant::Legacy)
        .contains("PRIMARY KEY"));
}

#[test]
fn test_agency_references() {
    let default = Route::table_definition(&SchemaConfig::default());
    assert!(!default
        .create_sql(SchemaVariant::Current)
        .contains("REFERENCES agency"));

    let config = SchemaConfig {
        agency_references: true,
        ..SchemaConfig::default()
    };
    let table = Route::table_definition(&config);
    assert!(table
        .create_sql(SchemaVariant::Current)
        .contains("FOREIGN KEY (agency_id) REFERENCES agency (agency_id)"));
    assert!(!table.create_sql(SchemaVariant::Legacy).contains("REFERENCES"));
}

#[test]
fn test_column_names() {
    let table = Stop::table_definition(&SchemaConfig::default());
    assert_eq!(14, table.column_names(SchemaVariant::Current).len());
    assert_eq!(13, table.column_names(SchemaVariant::Legacy).len());
    assert!(table.has_column(SchemaVariant::Current, "routes"));
    assert!(!table.has_column(SchemaVariant::Legacy, "routes"));
}
