use crate::objects::*;
use crate::record::{self, Record};
use crate::schema::{Schema, SchemaConfig, SchemaVariant, TableDefinition};
use crate::Error;
use rusqlite::types::Value;
use rusqlite::{Connection, ToSql, Transaction};
use std::path::Path;
use std::time::Duration;

/// Allows to parameterize how the database is opened
///
/// ```
///let db = gtfs_model::DatabaseBuilder::default()
///    .variant(gtfs_model::SchemaVariant::Legacy)
///    .open_in_memory()?;
///assert_eq!(gtfs_model::SchemaVariant::Legacy, db.config().variant);
/// # Ok::<(), gtfs_model::Error>(())
///```
#[derive(Derivative, Debug, Clone)]
#[derivative(Default)]
pub struct DatabaseBuilder {
    /// Generation of the tables created by [Database::create_table]
    pub variant: SchemaVariant,
    /// See [SchemaConfig::agency_references]
    pub agency_references: bool,
    /// How long a statement waits for a lock held by another connection
    #[derivative(Default(value = "Duration::from_secs(5)"))]
    pub busy_timeout: Duration,
}

impl DatabaseBuilder {
    /// Chooses the generation of the schema
    ///
    /// Returns Self and can be chained
    pub fn variant(&mut self, variant: SchemaVariant) -> &mut Self {
        self.variant = variant;
        self
    }

    /// Declares the `agency_id` columns as references to the agency table
    ///
    /// Returns Self and can be chained
    pub fn with_agency_references(&mut self) -> &mut Self {
        self.agency_references = true;
        self
    }

    /// Returns Self and can be chained
    pub fn busy_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.busy_timeout = timeout;
        self
    }

    /// Opens, or creates, the database file at the given path
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<Database, Error> {
        log::info!("opening database {}", path.as_ref().display());
        self.init(Connection::open(path)?)
    }

    /// Opens a database that only lives as long as the returned [Database]
    pub fn open_in_memory(&self) -> Result<Database, Error> {
        self.init(Connection::open_in_memory()?)
    }

    fn init(&self, conn: Connection) -> Result<Database, Error> {
        conn.busy_timeout(self.busy_timeout)?;
        let foreign_keys = self.variant == SchemaVariant::Current;
        conn.pragma_update(None, "foreign_keys", foreign_keys)?;
        log::debug!(
            "{:?} schema, foreign keys {}",
            self.variant,
            if foreign_keys { "on" } else { "off" }
        );
        Ok(Database {
            conn,
            config: SchemaConfig {
                variant: self.variant,
                agency_references: self.agency_references,
            },
        })
    }
}

/// Tables in an order where every table comes after the ones it references
fn all_tables(config: &SchemaConfig) -> Vec<TableDefinition> {
    vec![
        Agency::table_definition(config),
        Calendar::table_definition(config),
        CalendarDate::table_definition(config),
        Route::table_definition(config),
        Direction::table_definition(config),
        FareAttribute::table_definition(config),
        FareRule::table_definition(config),
        Stop::table_definition(config),
        Trip::table_definition(config),
        StopTime::table_definition(config),
        Shape::table_definition(config),
    ]
}

/// A GTFS store backed by a single SQLite connection
///
/// Calls are blocking. The connection is not shared, writes from several threads must be serialized by the caller.
pub struct Database {
    conn: Connection,
    config: SchemaConfig,
}

impl Database {
    /// Path used when the caller has no preference
    pub const DEFAULT_PATH: &'static str = "./gtfs.sqlite";

    /// Opens the database at the given path with the default [DatabaseBuilder]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        DatabaseBuilder::default().open(path)
    }

    /// Opens an in-memory database with the default [DatabaseBuilder]
    pub fn open_in_memory() -> Result<Self, Error> {
        DatabaseBuilder::default().open_in_memory()
    }

    /// Schema the tables are created and read with
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// The underlying connection, for queries not covered by this crate
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Operations on the records, outside of any explicit transaction
    pub fn session(&self) -> Session<'_> {
        Session::new(&self.conn, &self.config)
    }

    /// Rebuilds the database file, reclaiming the space of deleted rows
    pub fn vacuum(&self) -> Result<(), Error> {
        self.conn.execute_batch("VACUUM")?;
        log::info!("database vacuumed");
        Ok(())
    }

    /// Rebuilds all the indexes
    ///
    /// Fails with [Error::TransactionInProgress] if a transaction is open on the connection.
    pub fn reindex(&self) -> Result<(), Error> {
        if !self.conn.is_autocommit() {
            return Err(Error::TransactionInProgress);
        }
        self.conn.execute_batch("REINDEX")?;
        log::info!("database reindexed");
        Ok(())
    }

    /// Drops the table of `T` if it exists and creates it again, empty
    pub fn create_table<T: Schema>(&self) -> Result<(), Error> {
        T::create_table(&self.conn, &self.config)
    }

    /// Drops and creates all the tables in a single transaction
    pub fn create_all_tables(&mut self) -> Result<(), Error> {
        let tables = all_tables(&self.config);
        let variant = self.config.variant;
        let tx = self.conn.transaction()?;
        // Referencing tables go first so that no foreign key blocks a drop
        for table in tables.iter().rev() {
            table.drop_if_exists(&tx)?;
        }
        for table in &tables {
            table.create(&tx, variant)?;
        }
        tx.commit()?;
        log::info!("created {} tables", tables.len());
        Ok(())
    }

    /// Starts a transaction, rolled back when dropped without being committed
    ///
    /// Use [Session::new] with [Database::config] to work with records inside it.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, Error> {
        Ok(self.conn.transaction()?)
    }

    /// Runs `f` in a transaction, committed if `f` returns `Ok` and rolled back otherwise
    ///
    /// On failure the error of `f` is returned, even if the rollback fails too.
    pub fn in_transaction<R, F>(&mut self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&Session) -> Result<R, Error>,
    {
        let tx = self.conn.transaction()?;
        let result = f(&Session::new(&tx, &self.config));
        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                log::debug!("rolling back transaction: {}", e);
                if let Err(rollback) = tx.rollback() {
                    log::warn!("impossible to roll back transaction: {}", rollback);
                }
                Err(e)
            }
        }
    }

    /// Does a table with this name exist
    pub fn table_exists(&self, name: &str) -> Result<bool, Error> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Names of the columns of a table, in creation order. Empty if the table does not exist
    pub fn column_names(&self, table: &str) -> Result<Vec<String>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let names = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// See [Session::insert]
    pub fn insert<T: Record>(&self, record: &T) -> Result<(), Error> {
        self.session().insert(record)
    }

    /// See [Session::insert_all]
    pub fn insert_all<'r, T, I>(&self, records: I) -> Result<usize, Error>
    where
        T: Record + 'r,
        I: IntoIterator<Item = &'r T>,
    {
        self.session().insert_all(records)
    }

    /// See [Session::update]
    pub fn update<T: Record>(&self, record: &T) -> Result<usize, Error> {
        self.session().update(record)
    }

    /// See [Session::delete]
    pub fn delete<T: Record>(&self, record: &T) -> Result<usize, Error> {
        self.session().delete(record)
    }

    /// See [Session::fetch]
    pub fn fetch<T: Record>(&self, key: &[Value]) -> Result<Option<T>, Error> {
        self.session().fetch(key)
    }

    /// See [Session::get]
    pub fn get<T: Record + Id>(&self, id: &str) -> Result<Option<T>, Error> {
        self.session().get(id)
    }

    /// See [Session::fetch_all]
    pub fn fetch_all<T: Record>(&self) -> Result<Vec<T>, Error> {
        self.session().fetch_all()
    }

    /// See [Session::fetch_where]
    pub fn fetch_where<T: Record, V: ToSql>(&self, column: &str, value: V) -> Result<Vec<T>, Error> {
        self.session().fetch_where(column, value)
    }

    /// See [Session::count]
    pub fn count<T: Record>(&self) -> Result<usize, Error> {
        self.session().count::<T>()
    }
}

/// Record operations on a connection or on an open [Transaction]
#[derive(Clone, Copy)]
pub struct Session<'a> {
    conn: &'a Connection,
    config: &'a SchemaConfig,
}

impl<'a> Session<'a> {
    /// A [Transaction] dereferences to a [Connection] and can be given here
    pub fn new(conn: &'a Connection, config: &'a SchemaConfig) -> Self {
        Session { conn, config }
    }

    /// The connection, or transaction, the session works on
    pub fn connection(&self) -> &Connection {
        self.conn
    }

    /// Inserts a new row
    pub fn insert<T: Record>(&self, record: &T) -> Result<(), Error> {
        record::insert(self.conn, self.config, record)
    }

    /// Inserts all the records, returns how many were inserted
    pub fn insert_all<'r, T, I>(&self, records: I) -> Result<usize, Error>
    where
        T: Record + 'r,
        I: IntoIterator<Item = &'r T>,
    {
        record::insert_all(self.conn, self.config, records)
    }

    /// Replaces the row with the same key, returns the number of changed rows
    pub fn update<T: Record>(&self, record: &T) -> Result<usize, Error> {
        record::update(self.conn, self.config, record)
    }

    /// Removes the row with the same key, returns the number of deleted rows
    pub fn delete<T: Record>(&self, record: &T) -> Result<usize, Error> {
        record::delete(self.conn, record)
    }

    /// Reads a row by its key, see [Record::KEY_COLUMNS]
    pub fn fetch<T: Record>(&self, key: &[Value]) -> Result<Option<T>, Error> {
        record::fetch(self.conn, key)
    }

    /// Reads an object by its identifier
    ///
    /// For a [Shape], whose points share the identifier, the first inserted point is returned.
    pub fn get<T: Record + Id>(&self, id: &str) -> Result<Option<T>, Error> {
        let column = T::KEY_COLUMNS[0];
        Ok(self.fetch_where(column, id)?.into_iter().next())
    }

    /// Reads every row of the table of `T`
    pub fn fetch_all<T: Record>(&self) -> Result<Vec<T>, Error> {
        record::fetch_all(self.conn)
    }

    /// Reads the rows where `column` equals `value`
    ///
    /// Fails with [Error::UnknownColumn] if the table has no such column
    pub fn fetch_where<T: Record, V: ToSql>(&self, column: &str, value: V) -> Result<Vec<T>, Error> {
        record::fetch_where(self.conn, self.config, column, value)
    }

    /// Number of rows
    pub fn count<T: Record>(&self) -> Result<usize, Error> {
        record::count::<T>(self.conn)
    }
}
