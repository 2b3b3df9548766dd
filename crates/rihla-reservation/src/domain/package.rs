//! Package types and their variant-specific details.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rihla_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The travel-product category of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Hajj pilgrimage package.
    Hajj,
    /// Umrah pilgrimage package.
    Umrah,
    /// Hotel-only booking.
    Hotel,
    /// Flight-only booking.
    Flight,
    /// Leisure trip.
    Leisure,
}

impl PackageType {
    /// Every package type, in catalogue order.
    pub const ALL: [Self; 5] = [
        Self::Hajj,
        Self::Umrah,
        Self::Hotel,
        Self::Flight,
        Self::Leisure,
    ];

    /// Returns the wire name of the package type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hajj => "hajj",
            Self::Umrah => "umrah",
            Self::Hotel => "hotel",
            Self::Flight => "flight",
            Self::Leisure => "leisure",
        }
    }

    /// Variant fields that are always required for this package type.
    ///
    /// Flights additionally require `dateTo` when the trip is round-trip.
    #[must_use]
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Hajj | Self::Umrah => &["forfait", "departureCity"],
            Self::Hotel => &["destination", "dateFrom", "dateTo", "rooms"],
            Self::Flight => &[
                "departureCity",
                "destination",
                "tripDirection",
                "flightClass",
                "dateFrom",
            ],
            Self::Leisure => &["departureCity", "destination", "tripType", "tripDuration"],
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                DomainError::invalid_fields(
                    format!("unknown package type '{}'", s.trim()),
                    ["packageType"],
                )
            })
    }
}

/// Tier label for hajj and umrah packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Forfait {
    /// Entry tier.
    Economic,
    /// Middle tier.
    Standard,
    /// Top tier.
    Premium,
}

impl FromStr for Forfait {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "economic" => Ok(Self::Economic),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            _ => Err(()),
        }
    }
}

/// Whether a flight is one-way or round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripDirection {
    /// Outbound only.
    OneWay,
    /// Outbound and return.
    RoundTrip,
}

impl FromStr for TripDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "one-way" | "oneway" => Ok(Self::OneWay),
            "round-trip" | "roundtrip" => Ok(Self::RoundTrip),
            _ => Err(()),
        }
    }
}

/// Variant fields of a reservation, tagged by package type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "packageType",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum PackageDetails {
    /// Hajj pilgrimage.
    Hajj {
        /// Package tier.
        forfait: Forfait,
        /// City the group departs from.
        departure_city: String,
    },
    /// Umrah pilgrimage.
    Umrah {
        /// Package tier.
        forfait: Forfait,
        /// City the group departs from.
        departure_city: String,
    },
    /// Hotel stay; no departure city.
    Hotel {
        /// Where the hotel is.
        destination: String,
        /// Check-in date.
        date_from: NaiveDate,
        /// Check-out date.
        date_to: NaiveDate,
        /// Number of rooms, at least one.
        rooms: u32,
    },
    /// Flight booking.
    Flight {
        /// Origin city.
        departure_city: String,
        /// Destination city.
        destination: String,
        /// One-way or round-trip.
        trip_direction: TripDirection,
        /// Cabin class label.
        flight_class: String,
        /// Outbound date.
        date_from: NaiveDate,
        /// Return date, present for round trips.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date_to: Option<NaiveDate>,
    },
    /// Leisure trip.
    Leisure {
        /// Origin city.
        departure_city: String,
        /// Destination.
        destination: String,
        /// Kind of trip (e.g. "cultural").
        trip_type: String,
        /// Duration label (e.g. "7 days").
        trip_duration: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_type_parses_known_tags() {
        assert_eq!("Umrah".parse::<PackageType>().unwrap(), PackageType::Umrah);
        assert_eq!(" hotel ".parse::<PackageType>().unwrap(), PackageType::Hotel);
    }

    #[test]
    fn test_unknown_package_type_names_package_type_field() {
        let err = "cruise".parse::<PackageType>().unwrap_err();

        assert_eq!(err.fields().unwrap(), &["packageType".to_owned()]);
    }

    #[test]
    fn test_only_hotel_omits_departure_city_from_required_fields() {
        for package_type in PackageType::ALL {
            let requires_departure = package_type.required_fields().contains(&"departureCity");
            assert_eq!(requires_departure, package_type != PackageType::Hotel);
        }
    }

    #[test]
    fn test_trip_direction_accepts_common_spellings() {
        assert_eq!(
            "round_trip".parse::<TripDirection>(),
            Ok(TripDirection::RoundTrip)
        );
        assert_eq!("One-Way".parse::<TripDirection>(), Ok(TripDirection::OneWay));
        assert!("circle".parse::<TripDirection>().is_err());
    }

    #[test]
    fn test_package_details_serializes_with_package_type_tag() {
        let details = PackageDetails::Hajj {
            forfait: Forfait::Premium,
            departure_city: "Casablanca".into(),
        };

        let json = serde_json::to_value(&details).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "packageType": "hajj",
                "forfait": "premium",
                "departureCity": "Casablanca"
            })
        );
    }
}
