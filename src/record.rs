//! Mapping between the GTFS objects and the rows of their table
//!
//! The operations take any [Connection], they can be used on a [rusqlite::Transaction] as well.
use crate::objects::*;
use crate::schema::{Schema, SchemaConfig};
use crate::serde_helpers::{format_date, format_time, parse_date, parse_time, DateFormat};
use crate::Error;
use chrono::NaiveDate;
use itertools::Itertools;
use rusqlite::types::{FromSql, Value};
use rusqlite::{params_from_iter, Connection, Row, ToSql};

/// A GTFS object that can be written to and read from its table
pub trait Record: Schema + Sized {
    /// Columns identifying a row, used by [update], [delete] and [fetch]
    const KEY_COLUMNS: &'static [&'static str];

    /// Every column of the current schema and the value to store
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Decodes a row selected with all the columns of the table
    fn from_row(row: &Row) -> Result<Self, Error>;

    /// Values of the [Record::KEY_COLUMNS], in the same order
    fn key(&self) -> Vec<Value> {
        let mut values = self.values();
        Self::KEY_COLUMNS
            .iter()
            .map(|column| {
                values
                    .iter()
                    .position(|(name, _)| name == column)
                    .map(|i| values.swap_remove(i).1)
                    .unwrap_or(Value::Null)
            })
            .collect()
    }
}

fn nullable<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}

fn text(value: &str) -> Value {
    Value::Text(value.to_owned())
}

fn optional_text(value: &Option<String>) -> Value {
    nullable(value.clone())
}

fn date(value: &NaiveDate) -> Value {
    Value::Text(format_date(DateFormat::Dashed, value))
}

fn time(value: u32) -> Value {
    Value::Text(format_time(value))
}

fn get_date(row: &Row, column: &str) -> Result<NaiveDate, Error> {
    let value: String = row.get(column)?;
    parse_date(DateFormat::Dashed, &value)
}

fn get_time(row: &Row, column: &str) -> Result<u32, Error> {
    let value: String = row.get(column)?;
    parse_time(&value)
}

// Columns added by the current schema are missing from legacy tables
fn optional_column<T: FromSql>(row: &Row, column: &str) -> Result<Option<T>, Error> {
    match row.get(column) {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Record for Agency {
    const KEY_COLUMNS: &'static [&'static str] = &["agency_id"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("agency_id", text(&self.id)),
            ("agency_name", text(&self.name)),
            ("agency_url", text(&self.url)),
            ("agency_timezone", text(&self.timezone)),
            ("agency_lang", optional_text(&self.lang)),
            ("agency_phone", optional_text(&self.phone)),
            ("agency_fare_url", optional_text(&self.fare_url)),
            ("agency_email", optional_text(&self.email)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Agency {
            id: row.get("agency_id")?,
            name: row.get("agency_name")?,
            url: row.get("agency_url")?,
            timezone: row.get("agency_timezone")?,
            lang: row.get("agency_lang")?,
            phone: row.get("agency_phone")?,
            fare_url: row.get("agency_fare_url")?,
            email: row.get("agency_email")?,
        })
    }
}

impl Record for Calendar {
    const KEY_COLUMNS: &'static [&'static str] = &["service_id"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("service_id", text(&self.id)),
            ("start_date", date(&self.start_date)),
            ("end_date", date(&self.end_date)),
            ("monday", self.monday.into()),
            ("tuesday", self.tuesday.into()),
            ("wednesday", self.wednesday.into()),
            ("thursday", self.thursday.into()),
            ("friday", self.friday.into()),
            ("saturday", self.saturday.into()),
            ("sunday", self.sunday.into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Calendar {
            id: row.get("service_id")?,
            start_date: get_date(row, "start_date")?,
            end_date: get_date(row, "end_date")?,
            monday: row.get("monday")?,
            tuesday: row.get("tuesday")?,
            wednesday: row.get("wednesday")?,
            thursday: row.get("thursday")?,
            friday: row.get("friday")?,
            saturday: row.get("saturday")?,
            sunday: row.get("sunday")?,
        })
    }
}

impl Record for CalendarDate {
    const KEY_COLUMNS: &'static [&'static str] = &["service_id", "date"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("service_id", text(&self.service_id)),
            ("date", date(&self.date)),
            ("exception_type", self.exception_type.into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(CalendarDate {
            service_id: row.get("service_id")?,
            date: get_date(row, "date")?,
            exception_type: row.get("exception_type")?,
        })
    }
}

impl Record for Route {
    const KEY_COLUMNS: &'static [&'static str] = &["route_id"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("route_id", text(&self.id)),
            ("route_type", self.route_type.into()),
            ("agency_id", optional_text(&self.agency_id)),
            ("route_short_name", optional_text(&self.short_name)),
            ("route_long_name", optional_text(&self.long_name)),
            ("route_desc", optional_text(&self.desc)),
            ("route_url", optional_text(&self.url)),
            ("route_color", optional_text(&self.color)),
            ("route_text_color", optional_text(&self.text_color)),
            ("route_sort_order", nullable(self.sort_order)),
            ("continuous_pickup", nullable(self.continuous_pickup)),
            ("continuous_drop_off", nullable(self.continuous_drop_off)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Route {
            id: row.get("route_id")?,
            route_type: row.get("route_type")?,
            agency_id: row.get("agency_id")?,
            short_name: row.get("route_short_name")?,
            long_name: row.get("route_long_name")?,
            desc: row.get("route_desc")?,
            url: row.get("route_url")?,
            color: row.get("route_color")?,
            text_color: row.get("route_text_color")?,
            sort_order: row.get("route_sort_order")?,
            continuous_pickup: row.get("continuous_pickup")?,
            continuous_drop_off: row.get("continuous_drop_off")?,
        })
    }
}

impl Record for Direction {
    const KEY_COLUMNS: &'static [&'static str] = &["direction_id", "route_id"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("direction_id", self.id.into()),
            ("route_id", text(&self.route_id)),
            ("direction", self.direction.into()),
            ("direction_name", optional_text(&self.name)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Direction {
            id: row.get("direction_id")?,
            route_id: row.get("route_id")?,
            direction: row.get("direction")?,
            name: row.get("direction_name")?,
        })
    }
}

impl Record for FareAttribute {
    const KEY_COLUMNS: &'static [&'static str] = &["fare_id"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("fare_id", text(&self.id)),
            ("price", f64::from(self.price).into()),
            ("currency_type", text(&self.currency)),
            ("payment_method", self.payment_method.into()),
            ("transfers", self.transfers.into()),
            ("agency_id", optional_text(&self.agency_id)),
            ("transfer_duration", nullable(self.transfer_duration)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        let price: f64 = row.get("price")?;
        Ok(FareAttribute {
            id: row.get("fare_id")?,
            price: price as f32,
            currency: row.get("currency_type")?,
            payment_method: row.get("payment_method")?,
            transfers: row
                .get::<_, Option<Transfers>>("transfers")?
                .unwrap_or_default(),
            agency_id: row.get("agency_id")?,
            transfer_duration: row.get("transfer_duration")?,
        })
    }
}

impl Record for FareRule {
    const KEY_COLUMNS: &'static [&'static str] = &[
        "fare_id",
        "route_id",
        "origin_id",
        "destination_id",
        "contains_id",
    ];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("fare_id", text(&self.fare_id)),
            ("route_id", optional_text(&self.route_id)),
            ("origin_id", optional_text(&self.origin_id)),
            ("destination_id", optional_text(&self.destination_id)),
            ("contains_id", optional_text(&self.contains_id)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(FareRule {
            fare_id: row.get("fare_id")?,
            route_id: row.get("route_id")?,
            origin_id: row.get("origin_id")?,
            destination_id: row.get("destination_id")?,
            contains_id: row.get("contains_id")?,
        })
    }
}

impl Record for Shape {
    const KEY_COLUMNS: &'static [&'static str] = &["shape_id", "shape_pt_sequence"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("shape_id", text(&self.id)),
            ("shape_pt_lat", self.latitude.into()),
            ("shape_pt_lon", self.longitude.into()),
            ("shape_pt_sequence", self.sequence.into()),
            ("shape_dist_traveled", nullable(self.dist_traveled)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Shape {
            id: row.get("shape_id")?,
            latitude: row.get("shape_pt_lat")?,
            longitude: row.get("shape_pt_lon")?,
            sequence: row.get("shape_pt_sequence")?,
            dist_traveled: row.get("shape_dist_traveled")?,
        })
    }
}

impl Record for Stop {
    const KEY_COLUMNS: &'static [&'static str] = &["stop_id"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("stop_id", text(&self.id)),
            ("stop_code", optional_text(&self.code)),
            ("stop_name", optional_text(&self.name)),
            ("stop_desc", optional_text(&self.description)),
            ("stop_lat", self.latitude.into()),
            ("stop_lon", self.longitude.into()),
            ("zone_id", optional_text(&self.zone_id)),
            ("location_type", self.location_type.into()),
            ("parent_station", optional_text(&self.parent_station)),
            ("stop_timezone", optional_text(&self.timezone)),
            ("wheelchair_boarding", self.wheelchair_boarding.into()),
            ("level_id", optional_text(&self.level_id)),
            ("platform_code", optional_text(&self.platform_code)),
            ("routes", optional_text(&self.routes)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Stop {
            id: row.get("stop_id")?,
            code: row.get("stop_code")?,
            name: row.get("stop_name")?,
            description: row.get("stop_desc")?,
            latitude: row.get("stop_lat")?,
            longitude: row.get("stop_lon")?,
            zone_id: row.get("zone_id")?,
            location_type: row
                .get::<_, Option<LocationType>>("location_type")?
                .unwrap_or_default(),
            parent_station: row.get("parent_station")?,
            timezone: row.get("stop_timezone")?,
            wheelchair_boarding: row
                .get::<_, Option<WheelchairBoarding>>("wheelchair_boarding")?
                .unwrap_or_default(),
            level_id: row.get("level_id")?,
            platform_code: row.get("platform_code")?,
            routes: optional_column(row, "routes")?,
        })
    }
}

impl Record for StopTime {
    const KEY_COLUMNS: &'static [&'static str] = &["trip_id", "stop_sequence"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("trip_id", text(&self.trip_id)),
            ("arrival_time", time(self.arrival_time)),
            ("departure_time", time(self.departure_time)),
            ("stop_id", text(&self.stop_id)),
            ("stop_sequence", self.stop_sequence.into()),
            ("stop_headsign", optional_text(&self.stop_headsign)),
            ("pickup_type", nullable(self.pickup_type)),
            ("drop_off_type", nullable(self.drop_off_type)),
            ("continuous_pickup", nullable(self.continuous_pickup)),
            ("continuous_drop_off", nullable(self.continuous_drop_off)),
            ("shape_dist_traveled", nullable(self.shape_dist_traveled)),
            ("timepoint", nullable(self.timepoint)),
            ("is_last_stop", nullable(self.is_last_stop)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(StopTime {
            trip_id: row.get("trip_id")?,
            arrival_time: get_time(row, "arrival_time")?,
            departure_time: get_time(row, "departure_time")?,
            stop_id: row.get("stop_id")?,
            stop_sequence: row.get("stop_sequence")?,
            stop_headsign: row.get("stop_headsign")?,
            pickup_type: row.get("pickup_type")?,
            drop_off_type: row.get("drop_off_type")?,
            continuous_pickup: row.get("continuous_pickup")?,
            continuous_drop_off: row.get("continuous_drop_off")?,
            shape_dist_traveled: row.get("shape_dist_traveled")?,
            timepoint: row.get("timepoint")?,
            is_last_stop: optional_column(row, "is_last_stop")?,
        })
    }
}

impl Record for Trip {
    const KEY_COLUMNS: &'static [&'static str] = &["trip_id"];

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("trip_id", text(&self.id)),
            ("route_id", text(&self.route_id)),
            ("service_id", text(&self.service_id)),
            ("trip_headsign", optional_text(&self.trip_headsign)),
            ("trip_short_name", optional_text(&self.trip_short_name)),
            ("direction_id", nullable(self.direction_id)),
            ("block_id", optional_text(&self.block_id)),
            ("shape_id", optional_text(&self.shape_id)),
            ("wheelchair_accessible", nullable(self.wheelchair_accessible)),
            ("bikes_allowed", nullable(self.bikes_allowed)),
        ]
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Trip {
            id: row.get("trip_id")?,
            route_id: row.get("route_id")?,
            service_id: row.get("service_id")?,
            trip_headsign: row.get("trip_headsign")?,
            trip_short_name: row.get("trip_short_name")?,
            direction_id: row.get("direction_id")?,
            block_id: row.get("block_id")?,
            shape_id: row.get("shape_id")?,
            wheelchair_accessible: row.get("wheelchair_accessible")?,
            bikes_allowed: row.get("bikes_allowed")?,
        })
    }
}

// Values of the columns existing in the configured schema
fn stored_values<T: Record>(record: &T, config: &SchemaConfig) -> Vec<(&'static str, Value)> {
    let table = T::table_definition(config);
    record
        .values()
        .into_iter()
        .filter(|(column, _)| table.has_column(config.variant, column))
        .collect()
}

// `IS` so that NULL parts of a key match
fn key_clause(columns: &[&str], first_param: usize) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} IS ?{}", column, first_param + i))
        .join(" AND ")
}

fn query<T: Record>(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<T>, Error> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(params))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(T::from_row(row)?);
    }
    Ok(records)
}

/// Inserts a new row
pub fn insert<T: Record>(conn: &Connection, config: &SchemaConfig, record: &T) -> Result<(), Error> {
    let (columns, values): (Vec<_>, Vec<_>) = stored_values(record, config).into_iter().unzip();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE_NAME,
        columns.iter().join(", "),
        (1..=columns.len()).map(|i| format!("?{}", i)).join(", ")
    );
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Inserts every record with the same prepared statement
///
/// Rows inserted before a failure are kept, unless the call happens inside a transaction that is rolled back.
pub fn insert_all<'r, T, I>(conn: &Connection, config: &SchemaConfig, records: I) -> Result<usize, Error>
where
    T: Record + 'r,
    I: IntoIterator<Item = &'r T>,
{
    let table = T::table_definition(config);
    let columns = table.column_names(config.variant);
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE_NAME,
        columns.iter().join(", "),
        (1..=columns.len()).map(|i| format!("?{}", i)).join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = 0;
    for record in records {
        let mut values = record.values();
        let params = columns.iter().map(|column| {
            values
                .iter()
                .position(|(name, _)| name == column)
                .map(|i| values.swap_remove(i).1)
                .unwrap_or(Value::Null)
        });
        stmt.execute(params_from_iter(params.collect::<Vec<_>>()))?;
        inserted += 1;
    }
    log::debug!("inserted {} rows in {}", inserted, T::TABLE_NAME);
    Ok(inserted)
}

/// Updates the row having the same key as the record, returns the number of changed rows
///
/// When every column belongs to the key, nothing can change and the number of matching rows is returned.
pub fn update<T: Record>(conn: &Connection, config: &SchemaConfig, record: &T) -> Result<usize, Error> {
    let (columns, values): (Vec<_>, Vec<_>) = stored_values(record, config)
        .into_iter()
        .filter(|(column, _)| !T::KEY_COLUMNS.contains(column))
        .unzip();
    // Every column is part of the key: the row already holds these values
    if columns.is_empty() {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            T::TABLE_NAME,
            key_clause(T::KEY_COLUMNS, 1)
        );
        let matching: i64 =
            conn.query_row(&sql, params_from_iter(record.key()), |row| row.get(0))?;
        return Ok(matching as usize);
    }
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        T::TABLE_NAME,
        columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .join(", "),
        key_clause(T::KEY_COLUMNS, columns.len() + 1)
    );
    let params = values.into_iter().chain(record.key());
    Ok(conn.execute(&sql, params_from_iter(params))?)
}

/// Deletes the row having the same key as the record, returns the number of deleted rows
pub fn delete<T: Record>(conn: &Connection, record: &T) -> Result<usize, Error> {
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        T::TABLE_NAME,
        key_clause(T::KEY_COLUMNS, 1)
    );
    Ok(conn.execute(&sql, params_from_iter(record.key()))?)
}

/// Reads the row matching the key, given in the order of [Record::KEY_COLUMNS]
///
/// Dates must be given as `yyyy-MM-dd` text and times as `HH:MM:SS` text, as they are stored.
pub fn fetch<T: Record>(conn: &Connection, key: &[Value]) -> Result<Option<T>, Error> {
    let sql = format!(
        "SELECT * FROM {} WHERE {} LIMIT 1",
        T::TABLE_NAME,
        key_clause(T::KEY_COLUMNS, 1)
    );
    Ok(query(conn, &sql, key)?.into_iter().next())
}

/// Reads all the rows, in insertion order
pub fn fetch_all<T: Record>(conn: &Connection) -> Result<Vec<T>, Error> {
    query(conn, &format!("SELECT * FROM {} ORDER BY rowid", T::TABLE_NAME), &[])
}

/// Reads the rows where the column equals the value, in insertion order
pub fn fetch_where<T: Record, V: ToSql>(
    conn: &Connection,
    config: &SchemaConfig,
    column: &str,
    value: V,
) -> Result<Vec<T>, Error> {
    if !T::table_definition(config).has_column(config.variant, column) {
        return Err(Error::UnknownColumn {
            table: T::TABLE_NAME,
            column: column.to_owned(),
        });
    }
    let sql = format!(
        "SELECT * FROM {} WHERE {} = ?1 ORDER BY rowid",
        T::TABLE_NAME,
        column
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([value])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(T::from_row(row)?);
    }
    Ok(records)
}

/// Number of rows of the table
pub fn count<T: Record>(conn: &Connection) -> Result<usize, Error> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", T::TABLE_NAME),
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

#[test]
fn test_key_clause() {
    assert_eq!(
        "trip_id IS ?3 AND stop_sequence IS ?4",
        key_clause(StopTime::KEY_COLUMNS, 3)
    );
}

#[test]
fn test_record_key() {
    let date = CalendarDate {
        service_id: "weekdays".to_owned(),
        date: NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(),
        exception_type: Exception::Removed,
    };
    assert_eq!(
        vec![text("weekdays"), text("2024-07-14")],
        date.key()
    );

    let rule = FareRule {
        fare_id: "f1".to_owned(),
        route_id: None,
        origin_id: Some("z1".to_owned()),
        destination_id: None,
        contains_id: None,
    };
    assert_eq!(
        vec![text("f1"), Value::Null, text("z1"), Value::Null, Value::Null],
        rule.key()
    );
}

#[test]
fn test_every_value_has_a_column() {
    use crate::schema::SchemaVariant;

    let config = SchemaConfig::default();
    let stop_time = StopTime {
        trip_id: "t".to_owned(),
        arrival_time: 0,
        departure_time: 0,
        stop_id: "s".to_owned(),
        stop_sequence: 1,
        stop_headsign: None,
        pickup_type: None,
        drop_off_type: None,
        continuous_pickup: None,
        continuous_drop_off: None,
        shape_dist_traveled: None,
        timepoint: None,
        is_last_stop: Some(true),
    };
    let columns: Vec<_> = stop_time.values().into_iter().map(|(c, _)| c).collect();
    assert_eq!(
        StopTime::table_definition(&config).column_names(SchemaVariant::Current),
        columns
    );

    let legacy = SchemaConfig {
        variant: SchemaVariant::Legacy,
        ..SchemaConfig::default()
    };
    assert!(stored_values(&stop_time, &legacy)
        .iter()
        .all(|(c, _)| *c != "is_last_stop"));
}
