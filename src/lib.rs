/*! The [General Transit Feed Specification](https://gtfs.org/) (GTFS) is a commonly used model to represent public transit data.

This crate brings typed structures of the static part of this model and stores them in an embedded [SQLite](https://sqlite.org) database.

To get started, see [Database].

## What is stored

Each GTFS file (`agency.txt`, `routes.txt`, `stop_times.txt`…) is a table named after the file, with the GTFS column names.
A [Database] creates the tables, and inserts, updates, deletes and reads the objects.

```
use gtfs_model::{Agency, Database};

let mut db = Database::open_in_memory()?;
db.create_all_tables()?;
db.insert(&Agency {
    id: "VTA".to_owned(),
    name: "VTA".to_owned(),
    url: "http://www.vta.org".to_owned(),
    timezone: "America/Los_Angeles".to_owned(),
    lang: Some("en".to_owned()),
    phone: None,
    fare_url: None,
    email: None,
})?;
let agency: Option<Agency> = db.get("VTA")?;
assert_eq!("http://www.vta.org", agency.unwrap().url);
# Ok::<(), gtfs_model::Error>(())
```

## Design decisions

### Two schema generations

The tables can be created with the historical column list ([SchemaVariant::Legacy]) or with the current one ([SchemaVariant::Current], the default).
The current one adds constraints (NOT NULL, foreign keys, unique composite keys) and a couple of derived columns.
Changing the schema of a table means dropping it: all its rows are lost.

### Use of Enum

Many values are integers that are actually enumerations of certain values. We always use Rust enums, like [LocationType] to represent them, and not the integer value.
They are stored as their GTFS code, an unknown code is an [Error::Decode] when reading.

### Times and dates

Times are the number of seconds since the start of the service day, they can exceed 24 hours (`25:30:00`).
Dates are stored as `yyyy-MM-dd` and read from GTFS files as `yyyyMMdd`.

### Renaming

We kept some names even if they can be confusing (a [Calendar] will be referenced by `service_id`), but we strip the object type (`route_short_name` is [Route::short_name]).

*/
#![warn(missing_docs)]

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

mod database;
mod enums;
pub mod error;
pub(crate) mod objects;
pub mod record;
pub mod schema;
mod serde_helpers;

#[cfg(test)]
mod tests;

pub use database::{Database, DatabaseBuilder, Session};
pub use error::Error;
pub use objects::*;
pub use record::Record;
pub use schema::{Schema, SchemaConfig, SchemaVariant};
pub use serde_helpers::{format_date, format_time, parse_date, parse_time, DateFormat};
