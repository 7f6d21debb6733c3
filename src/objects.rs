pub use crate::enums::*;
use crate::serde_helpers::*;
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Objects that have an identifier implement this trait
///
/// Those identifier are technical and should not be shown to travellers
pub trait Id {
    /// Identifier of the object
    fn id(&self) -> &str;
}

// `0.0 == -0.0`, they must hash the same
fn normalized_bits(f: f64) -> u64 {
    if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

fn hash_f64<H: Hasher>(f: &f64, state: &mut H) {
    normalized_bits(*f).hash(state)
}

fn hash_f32<H: Hasher>(f: &f32, state: &mut H) {
    normalized_bits(f64::from(*f)).hash(state)
}

fn hash_option_f64<H: Hasher>(f: &Option<f64>, state: &mut H) {
    f.map(normalized_bits).hash(state)
}

/// General informations about the agency running the network. See <https://gtfs.org/reference/static/#agencytxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Agency {
    /// Unique technical (not for the traveller) identifier for the agency
    #[serde(rename = "agency_id")]
    pub id: String,
    /// Full name of the transit agency
    #[serde(rename = "agency_name")]
    pub name: String,
    /// Full url of the transit agency
    #[serde(rename = "agency_url")]
    pub url: String,
    /// Timezone where the transit agency is located
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    /// Primary language used by this transit agency
    #[serde(rename = "agency_lang")]
    pub lang: Option<String>,
    /// A voice telephone number for the specified agency
    #[serde(rename = "agency_phone")]
    pub phone: Option<String>,
    /// URL of a web page that allows a rider to purchase tickets or other fare instruments for that agency online
    #[serde(rename = "agency_fare_url")]
    pub fare_url: Option<String>,
    /// Email address actively monitored by the agency’s customer service department
    #[serde(rename = "agency_email")]
    pub email: Option<String>,
}

impl Id for Agency {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}, {}", self.id, self.name, self.url)
    }
}

/// A route is a commercial line (there can be various stop sequences for a same line). See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    /// Unique technical (not for the traveller) identifier for the route
    #[serde(rename = "route_id")]
    pub id: String,
    /// Indicates the type of transportation used on a route
    pub route_type: RouteType,
    /// Agency for the specified route
    pub agency_id: Option<String>,
    /// Short name of a route. This will often be a short, abstract identifier like "32", "100X", or "Green"
    #[serde(rename = "route_short_name")]
    pub short_name: Option<String>,
    /// Full name of a route. This name is generally more descriptive than the [Route::short_name]
    #[serde(rename = "route_long_name")]
    pub long_name: Option<String>,
    /// Description of a route that provides useful, quality information
    #[serde(rename = "route_desc")]
    pub desc: Option<String>,
    /// URL of a web page about the particular route
    #[serde(rename = "route_url")]
    pub url: Option<String>,
    /// Route color designation that matches public facing material, `RRGGBB` without a leading `#`
    #[serde(rename = "route_color")]
    pub color: Option<String>,
    /// Legible color to use for text drawn against a background of [Route::color]
    #[serde(rename = "route_text_color")]
    pub text_color: Option<String>,
    /// Orders the routes in a way which is ideal for presentation to customers
    #[serde(rename = "route_sort_order")]
    pub sort_order: Option<i32>,
    /// Indicates whether a rider can board the transit vehicle anywhere along the vehicle’s travel path
    pub continuous_pickup: Option<ContinuationType>,
    /// Indicates whether a rider can alight from the transit vehicle at any point along the vehicle’s travel path
    pub continuous_drop_off: Option<ContinuationType>,
}

impl Id for Route {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.long_name, &self.short_name) {
            (Some(long_name), _) if !long_name.is_empty() => write!(f, "{}", long_name),
            (_, Some(short_name)) => write!(f, "{}", short_name),
            _ => write!(f, "{}", self.id),
        }
    }
}

/// A calender describes on which days the vehicle runs. See <https://gtfs.org/reference/static/#calendartxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Calendar {
    /// Unique technical identifier (not for the traveller) of this calendar
    #[serde(rename = "service_id")]
    pub id: String,
    /// Start service day for the service interval
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub start_date: NaiveDate,
    /// End service day for the service interval. This service day is included in the interval
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub end_date: NaiveDate,
    /// Does the service run on mondays
    pub monday: Availability,
    /// Does the service run on tuesdays
    pub tuesday: Availability,
    /// Does the service run on wednesdays
    pub wednesday: Availability,
    /// Does the service run on thursdays
    pub thursday: Availability,
    /// Does the service run on fridays
    pub friday: Availability,
    /// Does the service run on saturdays
    pub saturday: Availability,
    /// Does the service run on sundays
    pub sunday: Availability,
}

impl Id for Calendar {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} - {}", self.id, self.start_date, self.end_date)
    }
}

impl Calendar {
    /// Returns true if there is a service running on that day
    pub fn valid_weekday(&self, date: NaiveDate) -> bool {
        match date.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
        .is_available()
    }
}

/// Defines a specific date that can be added or removed from a [Calendar]. See <https://gtfs.org/reference/static/#calendar_datestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct CalendarDate {
    /// Identifier of the service that is modified at this date
    pub service_id: String,
    /// Date where the service will be added or deleted
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub date: NaiveDate,
    /// Is the service added or deleted
    pub exception_type: Exception,
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} - {:?}",
            self.service_id, self.date, self.exception_type
        )
    }
}

/// Names the directions of a [Route]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Direction {
    /// Direction identifier, as used by [Trip::direction_id]
    #[serde(rename = "direction_id")]
    pub id: i32,
    /// Route the direction belongs to
    pub route_id: String,
    /// Travel direction
    pub direction: DirectionType,
    /// Name of the direction shown to travellers
    #[serde(rename = "direction_name")]
    pub name: Option<String>,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} : {} - {}",
            self.route_id,
            self.id,
            self.name.as_deref().unwrap_or_default()
        )
    }
}

/// A [Stop] where a vehicle stops at a specified time. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Derivative, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[derivative(Hash)]
pub struct Stop {
    /// Unique technical identifier (not for the traveller) of the stop
    #[serde(rename = "stop_id")]
    pub id: String,
    /// Short text or a number that identifies the location for riders
    #[serde(rename = "stop_code")]
    pub code: Option<String>,
    /// Name of the location. Use a name that people will understand in the local and tourist vernacular
    #[serde(rename = "stop_name")]
    pub name: Option<String>,
    /// Description of the location that provides useful, quality information
    #[serde(rename = "stop_desc")]
    pub description: Option<String>,
    /// Latitude of the stop
    #[serde(rename = "stop_lat", default)]
    #[derivative(Hash(hash_with = "hash_f64"))]
    pub latitude: f64,
    /// Longitude of the stop
    #[serde(rename = "stop_lon", default)]
    #[derivative(Hash(hash_with = "hash_f64"))]
    pub longitude: f64,
    /// Fare zone for a stop
    pub zone_id: Option<String>,
    /// Type of the location
    #[serde(default, deserialize_with = "de_with_empty_default")]
    pub location_type: LocationType,
    /// Defines hierarchy between the different locations
    pub parent_station: Option<String>,
    /// Timezone of the location
    #[serde(rename = "stop_timezone")]
    pub timezone: Option<String>,
    /// Indicates whether wheelchair boardings are possible from the location
    #[serde(default, deserialize_with = "de_with_empty_default")]
    pub wheelchair_boarding: WheelchairBoarding,
    /// Level of the location
    pub level_id: Option<String>,
    /// Platform identifier for a platform stop (a stop belonging to a station)
    pub platform_code: Option<String>,
    /// Routes serving the stop, computed when the feed is imported
    #[serde(default)]
    pub routes: Option<String>,
}

// NaN coordinates are not supported: they would make the equality non reflexive
impl Eq for Stop {}

impl Id for Stop {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.name.as_deref().unwrap_or_default())
    }
}

/// The moment where a vehicle, running on a [Trip], stops at a [Stop]. See <https://gtfs.org/reference/static/#stop_timestxt>
///
/// Times are given in seconds since the start of the service day and can exceed 24 hours.
#[derive(Derivative, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[derivative(Hash)]
pub struct StopTime {
    /// [Trip] to which this stop time belongs to
    pub trip_id: String,
    /// Arrival time of the stop time
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub arrival_time: u32,
    /// Departure time of the stop time
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub departure_time: u32,
    /// Identifier of the [Stop] where the vehicle stops
    pub stop_id: String,
    /// Order of stops for a particular trip. The values must increase along the trip but do not need to be consecutive
    pub stop_sequence: u32,
    /// Text that appears on signage identifying the trip's destination to riders
    pub stop_headsign: Option<String>,
    /// Indicates pickup method
    pub pickup_type: Option<PickupDropOffType>,
    /// Indicates drop off method
    pub drop_off_type: Option<PickupDropOffType>,
    /// Indicates whether a rider can board the transit vehicle anywhere along the vehicle’s travel path
    pub continuous_pickup: Option<ContinuationType>,
    /// Indicates whether a rider can alight from the transit vehicle at any point along the vehicle’s travel path
    pub continuous_drop_off: Option<ContinuationType>,
    /// Actual distance traveled along the associated shape, from the first stop to the stop specified in this record
    #[derivative(Hash(hash_with = "hash_option_f64"))]
    pub shape_dist_traveled: Option<f64>,
    /// Indicates if arrival and departure times for a stop are strictly adhered to by the vehicle or if they are instead approximate and/or interpolated times
    pub timepoint: Option<TimepointType>,
    /// Is this the last stop of the trip, computed when the feed is imported
    #[serde(default)]
    pub is_last_stop: Option<bool>,
}

// NaN distances are not supported: they would make the equality non reflexive
impl Eq for StopTime {}

impl fmt::Display for StopTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}, {} - {}",
            self.trip_id,
            self.stop_sequence,
            format_time(self.arrival_time),
            format_time(self.departure_time)
        )
    }
}

/// A Trip is a vehicle that follows a sequence of [StopTime] on certain days. See <https://gtfs.org/reference/static/#tripstxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Trip {
    /// Unique technical identifier (not for the traveller) for the Trip
    #[serde(rename = "trip_id")]
    pub id: String,
    /// References the [Route] of the trip
    pub route_id: String,
    /// References the [Calendar] on which this trip runs
    pub service_id: String,
    /// Text that appears on signage identifying the trip's destination to riders
    pub trip_headsign: Option<String>,
    /// Public facing text used to identify the trip to riders, for instance, to identify train numbers for commuter rail trips
    pub trip_short_name: Option<String>,
    /// Indicates the direction of travel for a trip, see [Direction]
    pub direction_id: Option<i32>,
    /// Identifies the block to which the trip belongs. A block consists of a single trip or many sequential trips made using the same vehicle
    pub block_id: Option<String>,
    /// Shape of the trip
    pub shape_id: Option<String>,
    /// Indicates wheelchair accessibility
    pub wheelchair_accessible: Option<WheelchairAccessibility>,
    /// Indicates whether bikes are allowed
    pub bikes_allowed: Option<BikesAllowed>,
}

impl Id for Trip {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A single geographical point decribing the shape of a [Trip]. See <https://gtfs.org/reference/static/#shapestxt>
#[derive(Derivative, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[derivative(Hash)]
pub struct Shape {
    /// Unique technical (not for the traveller) identifier for the Shape
    #[serde(rename = "shape_id")]
    pub id: String,
    /// Latitude of a shape point
    #[serde(rename = "shape_pt_lat", default)]
    #[derivative(Hash(hash_with = "hash_f64"))]
    pub latitude: f64,
    /// Longitude of a shape point
    #[serde(rename = "shape_pt_lon", default)]
    #[derivative(Hash(hash_with = "hash_f64"))]
    pub longitude: f64,
    /// Sequence in which the shape points connect to form the shape. Values increase along the trip but do not need to be consecutive.
    #[serde(rename = "shape_pt_sequence")]
    pub sequence: u32,
    /// Actual distance traveled along the shape from the first shape point to the point specified in this record. Used by trip planners to show the correct portion of the shape on a map
    #[serde(rename = "shape_dist_traveled")]
    #[derivative(Hash(hash_with = "hash_option_f64"))]
    pub dist_traveled: Option<f64>,
}

// NaN coordinates or distances are not supported: they would make the equality non reflexive
impl Eq for Shape {}

impl Id for Shape {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} - {}, {}",
            self.id, self.sequence, self.latitude, self.longitude
        )
    }
}

/// Defines one possible fare. See <https://gtfs.org/reference/static/#fare_attributestxt>
#[derive(Derivative, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[derivative(Hash)]
pub struct FareAttribute {
    /// Unique technical (not for the traveller) identifier for the FareAttribute
    #[serde(rename = "fare_id")]
    pub id: String,
    /// Fare price, in the unit specified by [FareAttribute::currency]
    #[serde(default)]
    #[derivative(Hash(hash_with = "hash_f32"))]
    pub price: f32,
    /// Currency used to pay the fare
    #[serde(rename = "currency_type")]
    pub currency: String,
    /// Indicates when the fare must be paid
    pub payment_method: PaymentMethod,
    /// Indicates the number of transfers permitted on this fare
    #[serde(default, deserialize_with = "de_with_empty_default")]
    pub transfers: Transfers,
    /// Identifies the relevant agency for a fare
    pub agency_id: Option<String>,
    /// Length of time in seconds before a transfer expires
    pub transfer_duration: Option<u32>,
}

// NaN prices are not supported: they would make the equality non reflexive
impl Eq for FareAttribute {}

impl Id for FareAttribute {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for FareAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} - {}", self.id, self.price, self.currency)
    }
}

/// Defines when a [FareAttribute] applies. See <https://gtfs.org/reference/static/#fare_rulestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct FareRule {
    /// Identifies the [FareAttribute] the rule applies to
    pub fare_id: String,
    /// Identifies a [Route] associated with the fare class
    pub route_id: Option<String>,
    /// Identifies an origin zone, see [Stop::zone_id]
    pub origin_id: Option<String>,
    /// Identifies a destination zone, see [Stop::zone_id]
    pub destination_id: Option<String>,
    /// Identifies the zones that a rider will enter while using a given fare class
    pub contains_id: Option<String>,
}

impl fmt::Display for FareRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.fare_id,
            self.route_id.as_deref().unwrap_or_default()
        )
    }
}
