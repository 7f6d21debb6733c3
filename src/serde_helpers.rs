use crate::Error;
use chrono::NaiveDate;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::Serializer;
use std::fmt;

/// Textual representations of a calendar date
///
/// Dates carry no time of day and no timezone: they are always read as proleptic Gregorian dates,
/// whatever the timezone of the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `yyyyMMdd`, as written in `calendar.txt` and `calendar_dates.txt`
    Compact,
    /// `yyyy-MM-dd`, as stored in the database
    Dashed,
}

impl DateFormat {
    fn pattern(self) -> &'static str {
        match self {
            DateFormat::Compact => "%Y%m%d",
            DateFormat::Dashed => "%Y-%m-%d",
        }
    }

    fn len(self) -> usize {
        match self {
            DateFormat::Compact => 8,
            DateFormat::Dashed => 10,
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DateFormat::Compact => write!(f, "yyyyMMdd"),
            DateFormat::Dashed => write!(f, "yyyy-MM-dd"),
        }
    }
}

/// Parses a date written in the given format
pub fn parse_date(format: DateFormat, s: &str) -> Result<NaiveDate, Error> {
    let mk_err = || Error::InvalidDate {
        value: s.to_owned(),
        format,
    };
    // chrono accepts signed and shorter years, GTFS dates are always fixed width
    if s.len() != format.len() || !s.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        return Err(mk_err());
    }
    NaiveDate::parse_from_str(s, format.pattern()).map_err(|_| mk_err())
}

/// Writes a date in the given format
pub fn format_date(format: DateFormat, date: &NaiveDate) -> String {
    date.format(format.pattern()).to_string()
}

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    parse_date(DateFormat::Compact, s).map_err(de::Error::custom)
}

pub fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_date(DateFormat::Compact, date))
}

fn parse_time_impl(h: &str, m: &str, s: &str) -> Result<(u32, u32, u32), std::num::ParseIntError> {
    let hours: u32 = h.parse()?;
    let minutes: u32 = m.parse()?;
    let seconds: u32 = s.parse()?;
    Ok((hours, minutes, seconds))
}

/// Parses a `HH:MM:SS` time into the number of seconds since the start of the service day
///
/// Hours are not bounded to 23: `25:30:00` is 1:30 the next day and is kept as such.
pub fn parse_time(s: &str) -> Result<u32, Error> {
    let mk_err = || Error::InvalidTime(s.to_owned());

    if s.len() < 7 {
        return Err(mk_err());
    }
    let mut parts = s.split(':');

    let hour = parts.next().ok_or_else(mk_err)?;
    let min = parts.next().ok_or_else(mk_err)?;
    let sec = parts.next().ok_or_else(mk_err)?;
    if parts.next().is_some() {
        return Err(mk_err());
    }

    if hour.is_empty() || min.len() != 2 || sec.len() != 2 {
        return Err(mk_err());
    }
    // `parse` would accept a leading `+`
    if !s.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return Err(mk_err());
    }

    let (hours, minutes, seconds) = parse_time_impl(hour, min, sec).map_err(|_| mk_err())?;
    if minutes >= 60 || seconds >= 60 {
        return Err(mk_err());
    }
    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or_else(mk_err)
}

/// Writes a number of seconds since the start of the service day as `HH:MM:SS`
pub fn format_time(time: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time / 3600,
        time % 3600 / 60,
        time % 60
    )
}

pub fn deserialize_time<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    parse_time(s).map_err(de::Error::custom)
}

pub fn serialize_time<S>(time: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(format_time(*time).as_str())
}

pub fn de_with_empty_default<'de, T, D>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(de).map(|opt| opt.unwrap_or_default())
}

#[test]
fn test_serialize_time() {
    #[derive(Serialize, Deserialize)]
    struct Test {
        #[serde(
            deserialize_with = "deserialize_time",
            serialize_with = "serialize_time"
        )]
        time: u32,
    }
    let data_in = "time\n01:01:01\n";
    let parsed: Test = csv::Reader::from_reader(data_in.as_bytes())
        .deserialize()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(3600 + 60 + 1, parsed.time);

    let data_in_long_ride = "time\n172:35:42\n";
    let parsed_long_ride: Test = csv::Reader::from_reader(data_in_long_ride.as_bytes())
        .deserialize()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!((172 * 3600) + (35 * 60) + 42, parsed_long_ride.time);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(parsed).unwrap();
    let data_out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!(data_in, data_out);
}

#[test]
fn test_time_round_trip_over_two_service_days() {
    for hours in 0..48 {
        for &(minutes, seconds) in &[(0u32, 0u32), (30, 45), (59, 59)] {
            let s = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);
            let parsed = parse_time(&s).expect("valid time");
            assert_eq!(hours * 3600 + minutes * 60 + seconds, parsed);
            assert_eq!(s, format_time(parsed));
        }
    }
}

#[test]
fn test_parse_time_after_midnight() {
    assert_eq!(Some(25 * 3600 + 30 * 60), parse_time("25:30:00").ok());
    assert_eq!("25:30:00", format_time(25 * 3600 + 30 * 60));
    // GTFS allows a single digit hour
    assert_eq!(Some(5 * 3600 + 3 * 60), parse_time("5:03:00").ok());
}

#[test]
fn test_parse_invalid_time() {
    for s in &[
        "12:60:00", "12:30:60", "invalid", "12:30", "12-30-00", "12:30:00:00", "aa:30:00",
        "12:3:000", ":30:00:", "+1:30:00",
    ] {
        match parse_time(s) {
            Err(Error::InvalidTime(v)) => assert_eq!(*s, v),
            other => panic!("{} should not be a valid time, got {:?}", s, other),
        }
    }
}

#[test]
fn test_parse_dates() {
    let leap = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
    assert_eq!(leap, parse_date(DateFormat::Compact, "20200229").unwrap());
    assert_eq!(leap, parse_date(DateFormat::Dashed, "2020-02-29").unwrap());
    assert_eq!("20200229", format_date(DateFormat::Compact, &leap));
    assert_eq!("2020-02-29", format_date(DateFormat::Dashed, &leap));

    for s in &["2024-01-01", "20241301", "20240132", "20230229", "invalid", "+2024011"] {
        assert!(parse_date(DateFormat::Compact, s).is_err(), "{}", s);
    }
    for s in &["20240101", "2024-13-01", "2024-01-32", "invalid", "2024-1-011"] {
        assert!(parse_date(DateFormat::Dashed, s).is_err(), "{}", s);
    }
}
