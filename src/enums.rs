use crate::Error;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::convert::TryFrom;

/// Declares a GTFS enumeration stored as an integer code
///
/// The code table is the only source of truth: it drives `code()`, `TryFrom<i64>`,
/// serde and the SQLite conversions. Unknown codes are always an [Error::Decode].
macro_rules! integer_code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $code:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// All the values, in the order of the GTFS reference
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Integer code of the value in GTFS files and in the database
            pub fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl TryFrom<i64> for $name {
            type Error = Error;

            fn try_from(code: i64) -> Result<Self, Error> {
                match code {
                    $($code => Ok($name::$variant),)+
                    _ => Err(Error::decode($kind, code)),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<$name, D::Error>
            where
                D: Deserializer<'de>,
            {
                let i = i64::deserialize(deserializer)?;
                $name::try_from(i).map_err(de::Error::custom)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_i32(self.code())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::Owned(Value::Integer(self.code().into())))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let i = i64::column_result(value)?;
                $name::try_from(i).map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }

        impl From<$name> for Value {
            fn from(v: $name) -> Value {
                Value::Integer(v.code().into())
            }
        }
    };
}

integer_code_enum! {
    /// Describes the kind of [crate::Route]. See <https://gtfs.org/reference/static/#routestxt> `route_type`
    pub enum RouteType ("route type") {
        /// Tram, Streetcar, Light rail. Any light rail or street level system within a metropolitan area
        Tramway = 0,
        /// Subway, Metro. Any underground rail system within a metropolitan area
        Subway = 1,
        /// Used for intercity or long-distance travel
        Rail = 2,
        /// Used for short- and long-distance bus routes
        Bus = 3,
        /// Used for short- and long-distance boat service
        Ferry = 4,
        /// Used for street-level rail cars where the cable runs beneath the vehicle, e.g., cable car in San Francisco
        CableTram = 5,
        /// Aerial lift, suspended cable car (e.g., gondola lift, aerial tramway)
        AerialLift = 6,
        /// Any rail system designed for steep inclines
        Funicular = 7,
        /// Electric buses that draw power from overhead wires using poles
        Trolleybus = 11,
        /// Railway in which the track consists of a single rail or a beam
        Monorail = 12,
    }
}

integer_code_enum! {
    /// Whether a rider can board or alight anywhere along the vehicle path.
    /// See `continuous_pickup` and `continuous_drop_off` in `routes.txt` and `stop_times.txt`
    pub enum ContinuationType ("continuous pickup/drop off type") {
        /// Continuous stopping pickup or drop off
        Continuous = 0,
        /// No continuous stopping pickup or drop off
        NotContinuous = 1,
        /// Must phone agency to arrange continuous stopping pickup or drop off
        ArrangeByPhone = 2,
        /// Must coordinate with driver to arrange continuous stopping pickup or drop off
        CoordinateWithDriver = 3,
    }
}

integer_code_enum! {
    /// Describes if and how a traveller can board or alight the vehicle. See <https://gtfs.org/reference/static/#stop_timestxt> `pickup_type` and `drop_off_type`
    pub enum PickupDropOffType ("pickup/drop off type") {
        /// Regularly scheduled pickup or drop off
        Regular = 0,
        /// No pickup or drop off available
        NotAvailable = 1,
        /// Must phone agency to arrange pickup or drop off
        ArrangeByPhone = 2,
        /// Must coordinate with driver to arrange pickup or drop off
        CoordinateWithDriver = 3,
    }
}

integer_code_enum! {
    /// Are the arrival and departure times exact or approximate. See `timepoint` in `stop_times.txt`
    pub enum TimepointType ("timepoint") {
        /// Times are considered approximate
        Approximate = 0,
        /// Times are considered exact
        Exact = 1,
    }
}

integer_code_enum! {
    /// Does a [crate::Calendar] service run on a given weekday
    pub enum Availability ("availability") {
        /// Service is not available on that day
        Unavailable = 0,
        /// Service is available on that day
        Available = 1,
    }
}

impl Availability {
    /// True for [Availability::Available]
    pub fn is_available(self) -> bool {
        self == Availability::Available
    }
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }
}

integer_code_enum! {
    /// Defines how a [crate::CalendarDate] modifies its service
    pub enum Exception ("exception type") {
        /// There will be a service on that day
        Added = 1,
        /// There won’t be a service on that day
        Removed = 2,
    }
}

integer_code_enum! {
    /// Defines where a [crate::FareAttribute] can be paid
    pub enum PaymentMethod ("payment method") {
        /// Fare is paid on board
        Aboard = 0,
        /// Fare must be paid before boarding
        PreBoarding = 1,
    }
}

integer_code_enum! {
    /// Defines how many transfers can be done with a [crate::FareAttribute]
    ///
    /// An absent value means unlimited transfers.
    #[derive(Derivative)]
    #[derivative(Default)]
    pub enum Transfers ("transfers") {
        /// No transfer is allowed
        NoTransfer = 0,
        /// Rider can transfer once
        UniqueTransfer = 1,
        /// Rider can transfer twice
        TwoTransfers = 2,
        /// Unlimited transfers are permitted
        #[derivative(Default)]
        Unlimited = -1,
    }
}

integer_code_enum! {
    /// Describes the kind of [crate::Stop]. See <https://gtfs.org/reference/static/#stopstxt> `location_type`
    #[derive(Derivative)]
    #[derivative(Default)]
    pub enum LocationType ("location type") {
        /// Stop (or Platform). A location where passengers board or disembark from a transit vehicle
        #[derivative(Default)]
        StopPoint = 0,
        /// Station. A physical structure or area that contains one or more platform
        StopArea = 1,
        /// A location where passengers can enter or exit a station from the street
        StationEntrance = 2,
        /// A location within a station, not matching any other location type, used to link pathways
        GenericNode = 3,
        /// A specific location on a platform, where passengers can board and/or alight vehicles
        BoardingArea = 4,
    }
}

integer_code_enum! {
    /// Can a wheelchair user board at a [crate::Stop]
    #[derive(Derivative)]
    #[derivative(Default)]
    pub enum WheelchairBoarding ("wheelchair boarding") {
        /// No accessibility information
        #[derivative(Default)]
        NoInformation = 0,
        /// Some vehicles at this stop can be boarded by a rider in a wheelchair
        PartiallyAccessible = 1,
        /// Wheelchair boarding is not possible at this stop
        NotAccessible = 2,
    }
}

integer_code_enum! {
    /// Can the vehicle of a [crate::Trip] accommodate a wheelchair
    pub enum WheelchairAccessibility ("wheelchair accessibility") {
        /// No accessibility information for the trip
        NoInformation = 0,
        /// Vehicle can accommodate at least one rider in a wheelchair
        Accessible = 1,
        /// No riders in wheelchairs can be accommodated on this trip
        NotAccessible = 2,
    }
}

integer_code_enum! {
    /// Are bikes allowed on a [crate::Trip]
    pub enum BikesAllowed ("bikes allowed") {
        /// No bike information for the trip
        NoInformation = 0,
        /// Vehicle can accommodate at least one bicycle
        Allowed = 1,
        /// No bicycles are allowed on this trip
        NotAllowed = 2,
    }
}

/// Cardinal or travel direction of a [crate::Direction], stored as its label
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DirectionType {
    /// `North`
    North,
    /// `South`
    South,
    /// `East`
    East,
    /// `West`
    West,
    /// `Northeast`
    NorthEast,
    /// `Northwest`
    NorthWest,
    /// `Southeast`
    SouthEast,
    /// `Southwest`
    SouthWest,
    /// `Clockwise`
    Clockwise,
    /// `Counterclockwise`
    CounterClockwise,
    /// `Inbound`
    Inbound,
    /// `Outbound`
    Outbound,
    /// `Loop`
    Loop,
    /// `A Loop`
    ALoop,
    /// `B Loop`
    BLoop,
}

impl DirectionType {
    /// All the values
    pub const ALL: &'static [DirectionType] = &[
        DirectionType::North,
        DirectionType::South,
        DirectionType::East,
        DirectionType::West,
        DirectionType::NorthEast,
        DirectionType::NorthWest,
        DirectionType::SouthEast,
        DirectionType::SouthWest,
        DirectionType::Clockwise,
        DirectionType::CounterClockwise,
        DirectionType::Inbound,
        DirectionType::Outbound,
        DirectionType::Loop,
        DirectionType::ALoop,
        DirectionType::BLoop,
    ];

    /// Label of the direction in the files and in the database
    pub fn code(self) -> &'static str {
        match self {
            DirectionType::North => "North",
            DirectionType::South => "South",
            DirectionType::East => "East",
            DirectionType::West => "West",
            DirectionType::NorthEast => "Northeast",
            DirectionType::NorthWest => "Northwest",
            DirectionType::SouthEast => "Southeast",
            DirectionType::SouthWest => "Southwest",
            DirectionType::Clockwise => "Clockwise",
            DirectionType::CounterClockwise => "Counterclockwise",
            DirectionType::Inbound => "Inbound",
            DirectionType::Outbound => "Outbound",
            DirectionType::Loop => "Loop",
            DirectionType::ALoop => "A Loop",
            DirectionType::BLoop => "B Loop",
        }
    }
}

impl TryFrom<&str> for DirectionType {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Error> {
        Ok(match s {
            "North" => DirectionType::North,
            "South" => DirectionType::South,
            "East" => DirectionType::East,
            "West" => DirectionType::West,
            "Northeast" => DirectionType::NorthEast,
            "Northwest" => DirectionType::NorthWest,
            "Southeast" => DirectionType::SouthEast,
            "Southwest" => DirectionType::SouthWest,
            "Clockwise" => DirectionType::Clockwise,
            "Counterclockwise" => DirectionType::CounterClockwise,
            "Inbound" => DirectionType::Inbound,
            // Misspelled label written by older databases
            "Outbound" | "Outbount" => DirectionType::Outbound,
            "Loop" => DirectionType::Loop,
            "A Loop" => DirectionType::ALoop,
            "B Loop" => DirectionType::BLoop,
            s => return Err(Error::decode("direction", s)),
        })
    }
}

impl<'de> Deserialize<'de> for DirectionType {
    fn deserialize<D>(deserializer: D) -> Result<DirectionType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        DirectionType::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

impl Serialize for DirectionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl ToSql for DirectionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for DirectionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        DirectionType::try_from(s).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl From<DirectionType> for Value {
    fn from(v: DirectionType) -> Value {
        Value::Text(v.code().to_owned())
    }
}

#[test]
fn test_integer_codes() {
    let route_codes: Vec<i32> = RouteType::ALL.iter().map(|r| r.code()).collect();
    assert_eq!(vec![0, 1, 2, 3, 4, 5, 6, 7, 11, 12], route_codes);
    assert_eq!(-1, Transfers::Unlimited.code());
    assert_eq!(2, Exception::Removed.code());
    assert_eq!(3, PickupDropOffType::CoordinateWithDriver.code());
    assert_eq!(4, LocationType::BoardingArea.code());
}

#[test]
fn test_every_code_round_trips() {
    fn check<T>(all: &[T], code: impl Fn(T) -> i32)
    where
        T: Copy + PartialEq + std::fmt::Debug + TryFrom<i64, Error = Error>,
    {
        for v in all {
            assert_eq!(*v, T::try_from(i64::from(code(*v))).unwrap());
        }
    }
    check(RouteType::ALL, RouteType::code);
    check(ContinuationType::ALL, ContinuationType::code);
    check(PickupDropOffType::ALL, PickupDropOffType::code);
    check(TimepointType::ALL, TimepointType::code);
    check(Availability::ALL, Availability::code);
    check(Exception::ALL, Exception::code);
    check(PaymentMethod::ALL, PaymentMethod::code);
    check(Transfers::ALL, Transfers::code);
    check(LocationType::ALL, LocationType::code);
    check(WheelchairBoarding::ALL, WheelchairBoarding::code);
    check(WheelchairAccessibility::ALL, WheelchairAccessibility::code);
    check(BikesAllowed::ALL, BikesAllowed::code);

    for d in DirectionType::ALL {
        assert_eq!(*d, DirectionType::try_from(d.code()).unwrap());
    }
    assert_eq!(15, DirectionType::ALL.len());
}

#[test]
fn test_unknown_codes_are_rejected() {
    for code in &[8i64, 9, 10, 13, -1, 100] {
        match RouteType::try_from(*code) {
            Err(Error::Decode { kind, code: c }) => {
                assert_eq!("route type", kind);
                assert_eq!(code.to_string(), c);
            }
            other => panic!("{} should not be a route type, got {:?}", code, other),
        }
    }
    assert!(Transfers::try_from(3i64).is_err());
    assert!(Exception::try_from(0i64).is_err());
    assert!(LocationType::try_from(5i64).is_err());
    assert!(DirectionType::try_from("north").is_err());
    assert!(DirectionType::try_from("").is_err());
}

#[test]
fn test_defaults() {
    assert_eq!(Transfers::Unlimited, Transfers::default());
    assert_eq!(LocationType::StopPoint, LocationType::default());
    assert_eq!(WheelchairBoarding::NoInformation, WheelchairBoarding::default());
}

#[test]
fn test_legacy_outbound_label() {
    assert_eq!(
        DirectionType::Outbound,
        DirectionType::try_from("Outbount").unwrap()
    );
    assert_eq!("Outbound", DirectionType::Outbound.code());
}

#[test]
fn test_serde_codes() {
    assert_eq!("3", serde_json::to_string(&RouteType::Bus).unwrap());
    assert_eq!("-1", serde_json::to_string(&Transfers::Unlimited).unwrap());
    assert_eq!(
        "\"A Loop\"",
        serde_json::to_string(&DirectionType::ALoop).unwrap()
    );
    let t: RouteType = serde_json::from_str("12").unwrap();
    assert_eq!(RouteType::Monorail, t);
    assert!(serde_json::from_str::<RouteType>("9").is_err());
}
