use crate::objects::*;
use crate::{Database, DatabaseBuilder, Error, Record, Session, SchemaVariant};
use chrono::NaiveDate;
use rusqlite::types::Value;
use std::collections::HashSet;
use std::path::PathBuf;

fn current_db() -> Database {
    let mut db = Database::open_in_memory().expect("impossible to open database");
    db.create_all_tables().expect("impossible to create tables");
    db
}

fn legacy_db() -> Database {
    let mut db = DatabaseBuilder::default()
        .variant(SchemaVariant::Legacy)
        .open_in_memory()
        .expect("impossible to open database");
    db.create_all_tables().expect("impossible to create tables");
    db
}

fn temp_db_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "gtfs-model-{}-{}.sqlite",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn agency(id: &str) -> Agency {
    Agency {
        id: id.to_owned(),
        name: "Santa Clara Valley Transportation Authority".to_owned(),
        url: "https://www.vta.org".to_owned(),
        timezone: "America/Los_Angeles".to_owned(),
        lang: None,
        phone: None,
        fare_url: None,
        email: None,
    }
}

fn route(id: &str, agency_id: Option<&str>, short_name: &str) -> Route {
    Route {
        id: id.to_owned(),
        route_type: RouteType::Bus,
        agency_id: agency_id.map(str::to_owned),
        short_name: Some(short_name.to_owned()),
        long_name: None,
        desc: None,
        url: None,
        color: None,
        text_color: None,
        sort_order: None,
        continuous_pickup: None,
        continuous_drop_off: None,
    }
}

fn weekdays(id: &str) -> Calendar {
    Calendar {
        id: id.to_owned(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        monday: Availability::Available,
        tuesday: Availability::Available,
        wednesday: Availability::Available,
        thursday: Availability::Available,
        friday: Availability::Available,
        saturday: Availability::Unavailable,
        sunday: Availability::Unavailable,
    }
}

fn stop(id: &str) -> Stop {
    Stop {
        id: id.to_owned(),
        code: None,
        name: None,
        description: None,
        latitude: 37.3352,
        longitude: -121.8811,
        zone_id: None,
        location_type: LocationType::default(),
        parent_station: None,
        timezone: None,
        wheelchair_boarding: WheelchairBoarding::default(),
        level_id: None,
        platform_code: None,
        routes: None,
    }
}

fn trip(id: &str, route_id: &str, service_id: &str) -> Trip {
    Trip {
        id: id.to_owned(),
        route_id: route_id.to_owned(),
        service_id: service_id.to_owned(),
        trip_headsign: None,
        trip_short_name: None,
        direction_id: None,
        block_id: None,
        shape_id: None,
        wheelchair_accessible: None,
        bikes_allowed: None,
    }
}

fn stop_time(trip_id: &str, stop_id: &str, stop_sequence: u32, time: u32) -> StopTime {
    StopTime {
        trip_id: trip_id.to_owned(),
        arrival_time: time,
        departure_time: time,
        stop_id: stop_id.to_owned(),
        stop_sequence,
        stop_headsign: None,
        pickup_type: None,
        drop_off_type: None,
        continuous_pickup: None,
        continuous_drop_off: None,
        shape_dist_traveled: None,
        timepoint: None,
        is_last_stop: None,
    }
}

fn fare(id: &str) -> FareAttribute {
    FareAttribute {
        id: id.to_owned(),
        price: 2.5,
        currency: "USD".to_owned(),
        payment_method: PaymentMethod::Aboard,
        transfers: Transfers::default(),
        agency_id: None,
        transfer_duration: None,
    }
}

// Parents of every referencing row inserted by the round trip tests
fn insert_parents(session: &Session) {
    session.insert(&agency("VTA")).unwrap();
    session.insert(&weekdays("weekdays")).unwrap();
    session.insert(&route("R22", Some("VTA"), "22")).unwrap();
    session.insert(&fare("local")).unwrap();
    session.insert(&stop("S1")).unwrap();
    session.insert(&trip("T1", "R22", "weekdays")).unwrap();
}

fn assert_round_trip<T>(session: &Session, record: T)
where
    T: Record + PartialEq + std::fmt::Debug,
{
    session.insert(&record).unwrap();
    let fetched: Option<T> = session.fetch(&record.key()).unwrap();
    assert_eq!(Some(record), fetched);
}

fn minimal_records(session: &Session) {
    assert_round_trip(
        session,
        CalendarDate {
            service_id: "weekdays".to_owned(),
            date: date(2024, 7, 4),
            exception_type: Exception::Removed,
        },
    );
    assert_round_trip(
        session,
        Direction {
            id: 0,
            route_id: "R22".to_owned(),
            direction: DirectionType::East,
            name: None,
        },
    );
    assert_round_trip(
        session,
        FareRule {
            fare_id: "local".to_owned(),
            route_id: None,
            origin_id: None,
            destination_id: None,
            contains_id: None,
        },
    );
    assert_round_trip(
        session,
        Shape {
            id: "SH1".to_owned(),
            latitude: 37.443012,
            longitude: -122.164863,
            sequence: 1,
            dist_traveled: None,
        },
    );
    assert_round_trip(session, stop_time("T1", "S1", 1, 8 * 3600));
    assert_round_trip(session, agency("OTHER"));
    assert_round_trip(session, route("R0", None, "0"));
    assert_round_trip(session, stop("S0"));
    assert_round_trip(session, trip("T0", "R22", "weekdays"));
    assert_round_trip(session, fare("free"));
    assert_round_trip(session, weekdays("other"));
}

#[test]
fn round_trip_without_optional_fields() {
    for db in &[current_db(), legacy_db()] {
        let session = db.session();
        insert_parents(&session);
        minimal_records(&session);
    }
}

#[test]
fn round_trip_with_every_field() {
    let db = current_db();
    let session = db.session();
    insert_parents(&session);

    assert_round_trip(
        &session,
        Agency {
            id: "CT".to_owned(),
            name: "Caltrain".to_owned(),
            url: "https://www.caltrain.com".to_owned(),
            timezone: "America/Los_Angeles".to_owned(),
            lang: Some("en".to_owned()),
            phone: Some("1-800-660-4287".to_owned()),
            fare_url: Some("https://www.caltrain.com/fares".to_owned()),
            email: Some("info@caltrain.com".to_owned()),
        },
    );
    assert_round_trip(
        &session,
        Route {
            id: "BLUE".to_owned(),
            route_type: RouteType::Tramway,
            agency_id: Some("VTA".to_owned()),
            short_name: Some("Blue".to_owned()),
            long_name: Some("Baypointe - Santa Teresa".to_owned()),
            desc: Some("Light rail".to_owned()),
            url: Some("https://www.vta.org/blue".to_owned()),
            color: Some("0000ff".to_owned()),
            text_color: Some("FFFFFF".to_owned()),
            sort_order: Some(3),
            continuous_pickup: Some(ContinuationType::NotContinuous),
            continuous_drop_off: Some(ContinuationType::CoordinateWithDriver),
        },
    );
    assert_round_trip(
        &session,
        Direction {
            id: 1,
            route_id: "R22".to_owned(),
            direction: DirectionType::BLoop,
            name: Some("Westbound".to_owned()),
        },
    );
    assert_round_trip(
        &session,
        FareAttribute {
            id: "express".to_owned(),
            price: 5.75,
            currency: "USD".to_owned(),
            payment_method: PaymentMethod::PreBoarding,
            transfers: Transfers::TwoTransfers,
            agency_id: Some("VTA".to_owned()),
            transfer_duration: Some(5400),
        },
    );
    assert_round_trip(
        &session,
        FareRule {
            fare_id: "local".to_owned(),
            route_id: Some("R22".to_owned()),
            origin_id: Some("1".to_owned()),
            destination_id: Some("2".to_owned()),
            contains_id: Some("3".to_owned()),
        },
    );
    assert_round_trip(
        &session,
        Shape {
            id: "SH1".to_owned(),
            latitude: 0.0,
            longitude: -122.164863,
            sequence: 7,
            dist_traveled: Some(31.2),
        },
    );
    assert_round_trip(
        &session,
        Stop {
            id: "S9".to_owned(),
            code: Some("60009".to_owned()),
            name: Some("Diridon".to_owned()),
            description: Some("San Jose Diridon station".to_owned()),
            latitude: 37.329239,
            longitude: -121.902461,
            zone_id: Some("2".to_owned()),
            location_type: LocationType::BoardingArea,
            parent_station: Some("S1".to_owned()),
            timezone: Some("America/Los_Angeles".to_owned()),
            wheelchair_boarding: WheelchairBoarding::NotAccessible,
            level_id: Some("L0".to_owned()),
            platform_code: Some("4".to_owned()),
            routes: Some("R22,BLUE".to_owned()),
        },
    );
    assert_round_trip(
        &session,
        Trip {
            id: "T9".to_owned(),
            route_id: "R22".to_owned(),
            service_id: "weekdays".to_owned(),
            trip_headsign: Some("Eastridge".to_owned()),
            trip_short_name: Some("22E".to_owned()),
            direction_id: Some(1),
            block_id: Some("B1".to_owned()),
            shape_id: Some("SH1".to_owned()),
            wheelchair_accessible: Some(WheelchairAccessibility::Accessible),
            bikes_allowed: Some(BikesAllowed::NotAllowed),
        },
    );
    assert_round_trip(
        &session,
        StopTime {
            trip_id: "T1".to_owned(),
            arrival_time: 25 * 3600 + 30 * 60,
            departure_time: 25 * 3600 + 31 * 60,
            stop_id: "S1".to_owned(),
            stop_sequence: 9,
            stop_headsign: Some("Eastridge".to_owned()),
            pickup_type: Some(PickupDropOffType::ArrangeByPhone),
            drop_off_type: Some(PickupDropOffType::NotAvailable),
            continuous_pickup: Some(ContinuationType::Continuous),
            continuous_drop_off: Some(ContinuationType::ArrangeByPhone),
            shape_dist_traveled: Some(12.5),
            timepoint: Some(TimepointType::Exact),
            is_last_stop: Some(true),
        },
    );
}

#[test]
fn legacy_schema_forgets_derived_columns() {
    let db = legacy_db();
    let mut stop = stop("S1");
    stop.routes = Some("R22".to_owned());
    db.insert(&stop).unwrap();
    let mut stop_time = stop_time("T1", "S1", 1, 0);
    stop_time.is_last_stop = Some(false);
    db.insert(&stop_time).unwrap();

    assert_eq!(None, db.get::<Stop>("S1").unwrap().unwrap().routes);
    let stop_times: Vec<StopTime> = db.fetch_all().unwrap();
    assert_eq!(None, stop_times[0].is_last_stop);
}

#[test]
fn vta_agency() {
    let db = current_db();
    let vta = Agency {
        id: "VTA".to_owned(),
        name: "Santa Clara Valley Transportation Authority".to_owned(),
        url: "https://www.vta.org".to_owned(),
        timezone: "America/Los_Angeles".to_owned(),
        lang: Some("en".to_owned()),
        phone: Some("408-321-2300".to_owned()),
        fare_url: Some("https://www.vta.org/fares".to_owned()),
        email: Some("customer.service@vta.org".to_owned()),
    };
    db.insert(&vta).unwrap();

    let fetched = db.get::<Agency>("VTA").unwrap().expect("VTA should be stored");
    assert_eq!("Santa Clara Valley Transportation Authority", fetched.name);
    assert_eq!(Some("408-321-2300".to_owned()), fetched.phone);
    assert_eq!(Some("customer.service@vta.org".to_owned()), fetched.email);
    assert_eq!(vta, fetched);
    assert_eq!(
        "VTA: Santa Clara Valley Transportation Authority, https://www.vta.org",
        format!("{}", fetched)
    );
    assert!(db.get::<Agency>("BART").unwrap().is_none());
}

#[test]
fn weekday_calendar() {
    let db = current_db();
    db.insert(&weekdays("weekdays")).unwrap();
    let calendar = db.get::<Calendar>("weekdays").unwrap().unwrap();

    assert!(calendar.monday.is_available());
    assert!(calendar.friday.is_available());
    assert_eq!(Availability::Unavailable, calendar.saturday);
    assert_eq!(Availability::Unavailable, calendar.sunday);
    // 2024-01-01 is a monday
    assert!(calendar.valid_weekday(date(2024, 1, 1)));
    assert!(calendar.valid_weekday(date(2024, 1, 5)));
    assert!(!calendar.valid_weekday(date(2024, 1, 6)));
    assert!(!calendar.valid_weekday(date(2024, 1, 7)));
}

#[test]
fn routes_by_agency() {
    let db = current_db();
    db.insert(&agency("VTA")).unwrap();
    db.insert(&agency("CT")).unwrap();
    db.insert(&route("R1", Some("VTA"), "22")).unwrap();
    db.insert(&route("R2", Some("VTA"), "23")).unwrap();
    db.insert(&route("R3", Some("CT"), "Local")).unwrap();

    let routes: Vec<Route> = db.fetch_where("agency_id", "VTA").unwrap();
    assert_eq!(2, routes.len());
    let short_names: Vec<_> = routes.iter().filter_map(|r| r.short_name.as_deref()).collect();
    assert!(short_names.contains(&"22"));
    assert!(short_names.contains(&"23"));
}

#[test]
fn fetch_where_unknown_column() {
    let db = legacy_db();
    match db.fetch_where::<Stop, _>("routes", "R22") {
        Err(Error::UnknownColumn { table, column }) => {
            assert_eq!("stops", table);
            assert_eq!("routes", column);
        }
        other => panic!("expected an unknown column, got {:?}", other),
    }
    assert!(db.fetch_where::<Stop, _>("stop_id; DROP TABLE stops", "S1").is_err());
    assert!(db.table_exists("stops").unwrap());
}

#[test]
fn aborted_transaction() {
    let mut db = current_db();
    let result = db.in_transaction(|session| {
        session.insert(&agency("VTA"))?;
        assert_eq!(1, session.count::<Agency>()?);
        Err::<(), _>(Error::InvalidTime("abort".to_owned()))
    });
    assert!(result.is_err());
    assert_eq!(0, db.count::<Agency>().unwrap());

    {
        let config = db.config().clone();
        let tx = db.transaction().unwrap();
        Session::new(&tx, &config).insert(&agency("VTA")).unwrap();
        // dropped without commit
    }
    assert_eq!(0, db.count::<Agency>().unwrap());

    let inserted = db
        .in_transaction(|session| session.insert_all(&[agency("VTA"), agency("CT")]))
        .unwrap();
    assert_eq!(2, inserted);
    assert_eq!(2, db.count::<Agency>().unwrap());
}

#[test]
fn failed_rollback_keeps_the_original_error() {
    let mut db = current_db();
    let result = db.in_transaction(|session| {
        session.insert(&agency("VTA"))?;
        // the transaction is already over when the closure returns
        session.connection().execute_batch("ROLLBACK")?;
        Err::<(), _>(Error::InvalidTime("abort".to_owned()))
    });
    match result {
        Err(Error::InvalidTime(value)) => assert_eq!("abort", value),
        other => panic!("expected the closure error, got {:?}", other),
    }
    assert_eq!(0, db.count::<Agency>().unwrap());
}

#[test]
fn recreate_table_drops_rows() {
    let db = current_db();
    db.insert(&agency("VTA")).unwrap();
    db.insert(&agency("CT")).unwrap();
    assert_eq!(2, db.count::<Agency>().unwrap());

    db.create_table::<Agency>().unwrap();
    assert_eq!(0, db.count::<Agency>().unwrap());
    assert!(db.table_exists("agency").unwrap());
}

#[test]
fn create_missing_table() {
    let db = Database::open_in_memory().unwrap();
    assert!(!db.table_exists("stop_times").unwrap());
    db.create_table::<StopTime>().unwrap();
    assert!(db.table_exists("stop_times").unwrap());
    assert_eq!(0, db.count::<StopTime>().unwrap());
}

#[test]
fn recreate_all_populated_tables() {
    let mut db = current_db();
    insert_parents(&db.session());
    db.insert(&stop_time("T1", "S1", 1, 0)).unwrap();

    db.create_all_tables().unwrap();
    assert_eq!(0, db.count::<StopTime>().unwrap());
    assert_eq!(0, db.count::<Trip>().unwrap());
    assert_eq!(0, db.count::<Agency>().unwrap());
}

#[test]
fn duplicate_stop_time() {
    let db = current_db();
    insert_parents(&db.session());
    db.insert(&stop_time("T1", "S1", 1, 0)).unwrap();
    match db.insert(&stop_time("T1", "S1", 1, 60)) {
        Err(Error::ConstraintViolation(_)) => {}
        other => panic!("expected a constraint violation, got {:?}", other),
    }
    assert_eq!(1, db.count::<StopTime>().unwrap());

    let legacy = legacy_db();
    legacy.insert(&stop_time("T1", "S1", 1, 0)).unwrap();
    legacy.insert(&stop_time("T1", "S1", 1, 60)).unwrap();
    assert_eq!(2, legacy.count::<StopTime>().unwrap());
}

#[test]
fn duplicate_direction() {
    let east = Direction {
        id: 0,
        route_id: "R22".to_owned(),
        direction: DirectionType::East,
        name: None,
    };
    let mut west = east.clone();
    west.direction = DirectionType::West;

    let db = current_db();
    insert_parents(&db.session());
    db.insert(&east).unwrap();
    match db.insert(&west) {
        Err(Error::ConstraintViolation(_)) => {}
        other => panic!("expected a constraint violation, got {:?}", other),
    }
    assert_eq!(vec![east.clone()], db.fetch_all::<Direction>().unwrap());

    let legacy = legacy_db();
    legacy.insert(&east).unwrap();
    legacy.insert(&west).unwrap();
    assert_eq!(2, legacy.count::<Direction>().unwrap());
}

#[test]
fn foreign_keys() {
    let db = current_db();
    db.insert(&weekdays("weekdays")).unwrap();
    match db.insert(&trip("T1", "unknown", "weekdays")) {
        Err(Error::ConstraintViolation(_)) => {}
        other => panic!("expected a constraint violation, got {:?}", other),
    }

    // feeds with a single agency often omit it
    db.insert(&route("R1", Some("unknown"), "1")).unwrap();
    db.insert(&trip("T1", "R1", "weekdays")).unwrap();

    let legacy = legacy_db();
    legacy.insert(&trip("T1", "unknown", "unknown")).unwrap();
    assert_eq!(1, legacy.count::<Trip>().unwrap());
}

#[test]
fn agency_references() {
    let mut db = DatabaseBuilder::default()
        .with_agency_references()
        .open_in_memory()
        .unwrap();
    db.create_all_tables().unwrap();
    assert!(db.insert(&route("R1", Some("VTA"), "1")).is_err());

    db.insert(&agency("VTA")).unwrap();
    db.insert(&route("R1", Some("VTA"), "1")).unwrap();
    db.insert(&route("R2", None, "2")).unwrap();
    assert_eq!(2, db.count::<Route>().unwrap());
}

#[test]
fn unknown_codes() {
    let db = current_db();
    db.connection()
        .execute(
            "INSERT INTO routes (route_id, route_type) VALUES ('R1', 9)",
            [],
        )
        .unwrap();
    match db.get::<Route>("R1") {
        Err(Error::Decode { kind, code }) => {
            assert_eq!("route type", kind);
            assert_eq!("9", code);
        }
        other => panic!("expected a decode error, got {:?}", other),
    }

    db.connection()
        .execute_batch(
            "INSERT INTO routes (route_id, route_type) VALUES ('R2', 3);
             INSERT INTO directions (direction_id, route_id, direction) VALUES (0, 'R2', 'Up');",
        )
        .unwrap();
    assert!(matches!(
        db.fetch_all::<Direction>(),
        Err(Error::Decode { kind: "direction", .. })
    ));
}

#[test]
fn misspelled_outbound_direction() {
    let db = legacy_db();
    db.connection()
        .execute(
            "INSERT INTO directions (direction_id, route_id, direction) VALUES (1, 'R1', 'Outbount')",
            [],
        )
        .unwrap();
    let directions: Vec<Direction> = db.fetch_all().unwrap();
    assert_eq!(DirectionType::Outbound, directions[0].direction);

    db.update(&directions[0]).unwrap();
    let label: String = db
        .connection()
        .query_row("SELECT direction FROM directions", [], |row| row.get(0))
        .unwrap();
    assert_eq!("Outbound", label);
}

#[test]
fn null_defaults() {
    let db = current_db();
    db.connection()
        .execute_batch(
            "INSERT INTO stops (stop_id) VALUES ('S1');
             INSERT INTO fare_attributes (fare_id, currency_type, payment_method) VALUES ('F1', 'USD', 0);",
        )
        .unwrap();

    let stop = db.get::<Stop>("S1").unwrap().unwrap();
    assert_eq!(LocationType::StopPoint, stop.location_type);
    assert_eq!(WheelchairBoarding::NoInformation, stop.wheelchair_boarding);
    assert_eq!(0.0, stop.latitude);

    let fare = db.get::<FareAttribute>("F1").unwrap().unwrap();
    assert_eq!(Transfers::Unlimited, fare.transfers);
    assert_eq!(0.0, fare.price);
}

#[test]
fn stored_encodings() {
    let db = current_db();
    insert_parents(&db.session());
    db.insert(&stop_time("T1", "S1", 1, 25 * 3600 + 30 * 60)).unwrap();
    db.insert(&CalendarDate {
        service_id: "weekdays".to_owned(),
        date: date(2024, 7, 4),
        exception_type: Exception::Removed,
    })
    .unwrap();

    let conn = db.connection();
    let arrival: String = conn
        .query_row("SELECT arrival_time FROM stop_times", [], |row| row.get(0))
        .unwrap();
    assert_eq!("25:30:00", arrival);
    let (exception_date, exception_type): (String, i64) = conn
        .query_row("SELECT date, exception_type FROM calendar_dates", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!("2024-07-04", exception_date);
    assert_eq!(2, exception_type);
    let transfers: Option<i64> = conn
        .query_row("SELECT transfers FROM fare_attributes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(Some(-1), transfers);
}

#[test]
fn invalid_stored_values() {
    let db = legacy_db();
    db.connection()
        .execute_batch(
            "INSERT INTO stop_times (trip_id, arrival_time, departure_time, stop_id, stop_sequence)
             VALUES ('T1', '8h00', '08:00:00', 'S1', 1);
             INSERT INTO calendar_dates (service_id, date, exception_type) VALUES ('S', '2024/07/04', 1);",
        )
        .unwrap();
    match db.fetch_all::<StopTime>() {
        Err(Error::InvalidTime(value)) => assert_eq!("8h00", value),
        other => panic!("expected an invalid time, got {:?}", other),
    }
    assert!(matches!(
        db.fetch_all::<CalendarDate>(),
        Err(Error::InvalidDate { .. })
    ));
}

#[test]
fn update_and_delete() {
    let db = current_db();
    db.insert(&agency("VTA")).unwrap();

    let mut vta = agency("VTA");
    vta.name = "VTA".to_owned();
    vta.phone = Some("408-321-2300".to_owned());
    assert_eq!(1, db.update(&vta).unwrap());
    assert_eq!(Some(vta.clone()), db.get::<Agency>("VTA").unwrap());
    assert_eq!(0, db.update(&agency("BART")).unwrap());

    assert_eq!(1, db.delete(&vta).unwrap());
    assert_eq!(0, db.delete(&vta).unwrap());
    assert_eq!(0, db.count::<Agency>().unwrap());
}

#[test]
fn composite_keys() {
    let db = current_db();
    insert_parents(&db.session());
    db.insert(&fare("express")).unwrap();

    let zones = FareRule {
        fare_id: "express".to_owned(),
        route_id: None,
        origin_id: Some("1".to_owned()),
        destination_id: Some("2".to_owned()),
        contains_id: None,
    };
    let by_route = FareRule {
        fare_id: "local".to_owned(),
        route_id: Some("R22".to_owned()),
        origin_id: None,
        destination_id: None,
        contains_id: None,
    };
    db.insert_all(&[zones.clone(), by_route.clone()]).unwrap();
    assert_eq!(1, db.delete(&zones).unwrap());
    assert_eq!(vec![by_route], db.fetch_all::<FareRule>().unwrap());

    let first = stop_time("T1", "S1", 1, 8 * 3600);
    let mut second = stop_time("T1", "S1", 2, 8 * 3600 + 300);
    db.insert_all(&[first.clone(), second.clone()]).unwrap();
    second.departure_time += 60;
    second.is_last_stop = Some(true);
    assert_eq!(1, db.update(&second).unwrap());
    assert_eq!(
        vec![first, second],
        db.fetch_where::<StopTime, _>("trip_id", "T1").unwrap()
    );
}

#[test]
fn update_rows_keyed_by_every_column() {
    let db = current_db();
    insert_parents(&db.session());
    let rule = FareRule {
        fare_id: "local".to_owned(),
        route_id: Some("R22".to_owned()),
        origin_id: None,
        destination_id: None,
        contains_id: None,
    };
    assert_eq!(0, db.update(&rule).unwrap());

    db.insert(&rule).unwrap();
    assert_eq!(1, db.update(&rule).unwrap());
    assert_eq!(vec![rule], db.fetch_all::<FareRule>().unwrap());
}

#[test]
fn shape_points() {
    let db = current_db();
    let points: Vec<Shape> = (1..=5)
        .map(|sequence| Shape {
            id: "SH1".to_owned(),
            latitude: 37.0 + f64::from(sequence) / 100.0,
            longitude: -122.0,
            sequence,
            dist_traveled: Some(f64::from(sequence)),
        })
        .collect();
    assert_eq!(5, db.insert_all(&points).unwrap());

    assert_eq!(Some(points[0].clone()), db.get::<Shape>("SH1").unwrap());
    let third: Option<Shape> = db
        .fetch(&[Value::Text("SH1".to_owned()), Value::Integer(3)])
        .unwrap();
    assert_eq!(Some(points[2].clone()), third);
    assert_eq!(5, db.fetch_where::<Shape, _>("shape_id", "SH1").unwrap().len());
}

#[test]
fn bulk_insert() {
    let db = current_db();
    insert_parents(&db.session());
    let stop_times: Vec<StopTime> = (1..=200)
        .map(|i| stop_time("T1", "S1", i, 6 * 3600 + i * 90))
        .collect();
    assert_eq!(200, db.insert_all(&stop_times).unwrap());
    assert_eq!(200, db.count::<StopTime>().unwrap());
    assert_eq!(stop_times, db.fetch_all::<StopTime>().unwrap());
}

#[test]
fn columns_by_variant() {
    let current = current_db();
    let columns = current.column_names("stop_times").unwrap();
    assert_eq!("trip_id", columns[0]);
    assert!(columns.iter().any(|c| c == "is_last_stop"));
    assert!(current
        .column_names("stops")
        .unwrap()
        .iter()
        .any(|c| c == "routes"));

    let legacy = legacy_db();
    assert!(!legacy
        .column_names("stop_times")
        .unwrap()
        .iter()
        .any(|c| c == "is_last_stop"));
    assert!(legacy.column_names("unknown").unwrap().is_empty());

    for table in &[
        "agency",
        "routes",
        "calendar",
        "calendar_dates",
        "directions",
        "fare_attributes",
        "fare_rules",
        "shapes",
        "stops",
        "stop_times",
        "trips",
    ] {
        assert!(legacy.table_exists(table).unwrap(), "{}", table);
    }
}

#[test]
fn vacuum_and_reindex() {
    let path = temp_db_path("maintenance");
    {
        let mut db = Database::open(&path).unwrap();
        db.vacuum().unwrap();
        db.reindex().unwrap();

        db.create_all_tables().unwrap();
        db.vacuum().unwrap();
        db.reindex().unwrap();

        insert_parents(&db.session());
        db.insert_all(
            &(1..=50)
                .map(|i| stop_time("T1", "S1", i, i * 60))
                .collect::<Vec<_>>(),
        )
        .unwrap();
        db.vacuum().unwrap();
        db.reindex().unwrap();
        assert_eq!(50, db.count::<StopTime>().unwrap());

        db.connection().execute_batch("BEGIN").unwrap();
        assert!(matches!(db.reindex(), Err(Error::TransactionInProgress)));
        db.connection().execute_batch("ROLLBACK").unwrap();
        db.reindex().unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(50, db.count::<StopTime>().unwrap());
    drop(db);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn default_path() {
    assert_eq!("./gtfs.sqlite", Database::DEFAULT_PATH);
}

#[test]
fn hash_and_display() {
    let mut stops = HashSet::new();
    stops.insert(stop("S1"));
    stops.insert(stop("S1"));
    let mut other = stop("S1");
    other.latitude = 0.0;
    stops.insert(other.clone());
    other.latitude = -0.0;
    stops.insert(other);
    assert_eq!(2, stops.len());

    let mut unknown = stop("S2");
    unknown.latitude = f64::NAN;
    assert_ne!(unknown, unknown.clone());

    let st = stop_time("T1", "S1", 3, 25 * 3600 + 5);
    assert_eq!("T1: 3, 25:00:05 - 25:00:05", format!("{}", st));
    assert_eq!("22", format!("{}", route("R22", None, "22")));
}

fn read_fixture<T: serde::de::DeserializeOwned>(file: &str) -> Vec<T> {
    csv::Reader::from_path(format!("fixtures/basic/{}", file))
        .expect("impossible to open fixture")
        .deserialize()
        .collect::<Result<_, _>>()
        .expect("impossible to read fixture")
}

#[test]
fn read_fixture_feed() {
    let mut db = current_db();
    let agencies: Vec<Agency> = read_fixture("agency.txt");
    let calendars: Vec<Calendar> = read_fixture("calendar.txt");
    let calendar_dates: Vec<CalendarDate> = read_fixture("calendar_dates.txt");
    let routes: Vec<Route> = read_fixture("routes.txt");
    let stops: Vec<Stop> = read_fixture("stops.txt");
    let trips: Vec<Trip> = read_fixture("trips.txt");
    let stop_times: Vec<StopTime> = read_fixture("stop_times.txt");
    let shapes: Vec<Shape> = read_fixture("shapes.txt");
    let fare_attributes: Vec<FareAttribute> = read_fixture("fare_attributes.txt");
    let fare_rules: Vec<FareRule> = read_fixture("fare_rules.txt");

    db.in_transaction(|session| {
        session.insert_all(&agencies)?;
        session.insert_all(&calendars)?;
        session.insert_all(&calendar_dates)?;
        session.insert_all(&routes)?;
        session.insert_all(&stops)?;
        session.insert_all(&trips)?;
        session.insert_all(&stop_times)?;
        session.insert_all(&shapes)?;
        session.insert_all(&fare_attributes)?;
        session.insert_all(&fare_rules)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(3, db.count::<Route>().unwrap());
    assert_eq!(5, db.count::<StopTime>().unwrap());

    let weekend = db.get::<Calendar>("weekend").unwrap().unwrap();
    assert_eq!(date(2024, 12, 31), weekend.end_date);
    assert!(weekend.valid_weekday(date(2024, 7, 6)));

    let exceptions: Vec<CalendarDate> = db.fetch_where("date", "2024-07-04").unwrap();
    assert_eq!(Exception::Removed, exceptions[0].exception_type);
    assert_eq!(Exception::Added, exceptions[1].exception_type);

    let r22 = db.get::<Route>("R22").unwrap().unwrap();
    assert_eq!(Some("29588c".to_owned()), r22.color);
    assert_eq!(Some(1), r22.sort_order);
    let blue = db.get::<Route>("RBLUE").unwrap().unwrap();
    assert_eq!(RouteType::Tramway, blue.route_type);

    let station = db.get::<Stop>("PS1").unwrap().unwrap();
    assert_eq!(LocationType::StopArea, station.location_type);
    let bay = db.get::<Stop>("S1").unwrap().unwrap();
    assert_eq!(Some("PS1".to_owned()), bay.parent_station);
    assert_eq!(LocationType::StopPoint, bay.location_type);
    assert_eq!(WheelchairBoarding::PartiallyAccessible, bay.wheelchair_boarding);
    assert_eq!(37.443012, bay.latitude);
    let eastridge = db.get::<Stop>("S3").unwrap().unwrap();
    assert_eq!(WheelchairBoarding::NoInformation, eastridge.wheelchair_boarding);

    let t1 = db.get::<Trip>("T1").unwrap().unwrap();
    assert_eq!(Some(BikesAllowed::Allowed), t1.bikes_allowed);
    assert_eq!(None, db.get::<Trip>("T2").unwrap().unwrap().shape_id);

    let t1_stop_times: Vec<StopTime> = db.fetch_where("trip_id", "T1").unwrap();
    assert_eq!(3, t1_stop_times.len());
    assert_eq!(24 * 3600 + 5 * 60 + 30, t1_stop_times[1].arrival_time);
    assert_eq!(25 * 3600 + 30 * 60, t1_stop_times[2].arrival_time);
    assert_eq!(Some(PickupDropOffType::NotAvailable), t1_stop_times[2].pickup_type);
    assert_eq!(Some(TimepointType::Approximate), t1_stop_times[1].timepoint);

    let local = db.get::<FareAttribute>("local").unwrap().unwrap();
    assert_eq!(Transfers::Unlimited, local.transfers);
    assert_eq!(2.5, local.price);
    assert_eq!(Some(5400), local.transfer_duration);
    let express = db.get::<FareAttribute>("express").unwrap().unwrap();
    assert_eq!(Transfers::NoTransfer, express.transfers);
    assert_eq!(PaymentMethod::PreBoarding, express.payment_method);

    let local_rules: Vec<FareRule> = db.fetch_where("fare_id", "local").unwrap();
    assert_eq!(2, local_rules.len());
}
