//! Reservation drafts and the validator that turns them into typed records.
//!
//! A draft carries every field as optional text, the way booking forms
//! submit them; numbers and booleans are accepted and kept as text. [`ReservationDraft::validate`] dispatches on the package type
//! and reports every missing or malformed field in a single error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rihla_core::error::DomainError;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use super::documents::{DocumentKind, DocumentUpload};
use super::package::{Forfait, PackageDetails, PackageType, TripDirection};
use super::traveler::{PartySize, TravelerProfile};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Unvalidated reservation input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    /// Package type tag (hajj, umrah, hotel, flight, leisure).
    #[serde(default, deserialize_with = "lenient_text")]
    pub package_type: Option<String>,

    /// Hajj/umrah tier.
    #[serde(default, deserialize_with = "lenient_text")]
    pub forfait: Option<String>,
    /// Departure city (all variants except hotel).
    #[serde(default, deserialize_with = "lenient_text")]
    pub departure_city: Option<String>,
    /// Destination (hotel, flight, leisure).
    #[serde(default, deserialize_with = "lenient_text")]
    pub destination: Option<String>,
    /// Start date, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub date_from: Option<String>,
    /// End date, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub date_to: Option<String>,
    /// Number of hotel rooms.
    #[serde(default, deserialize_with = "lenient_text")]
    pub rooms: Option<String>,
    /// `one-way` or `round-trip`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub trip_direction: Option<String>,
    /// Cabin class label.
    #[serde(default, deserialize_with = "lenient_text")]
    pub flight_class: Option<String>,
    /// Leisure trip type.
    #[serde(default, deserialize_with = "lenient_text")]
    pub trip_type: Option<String>,
    /// Leisure trip duration label.
    #[serde(default, deserialize_with = "lenient_text")]
    pub trip_duration: Option<String>,

    /// Traveler full name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub traveler_name: Option<String>,
    /// Traveler phone.
    #[serde(default, deserialize_with = "lenient_text")]
    pub traveler_phone: Option<String>,
    /// Traveler birth date, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub birth_date: Option<String>,
    /// Passport number.
    #[serde(default, deserialize_with = "lenient_text")]
    pub passport_number: Option<String>,
    /// Passport expiry, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub passport_expiry: Option<String>,
    /// Postal address.
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    /// Emergency contact.
    #[serde(default, deserialize_with = "lenient_text")]
    pub emergency_contact: Option<String>,
    /// Optional medical notes.
    #[serde(default, deserialize_with = "lenient_text")]
    pub medical_notes: Option<String>,

    /// Adults; defaults to 1.
    #[serde(default, deserialize_with = "lenient_text")]
    pub adults: Option<String>,
    /// Children; defaults to 0.
    #[serde(default, deserialize_with = "lenient_text")]
    pub children: Option<String>,

    /// Agency the traveler booked through, if any; parsed as a UUID by
    /// [`ReservationDraft::validate`].
    #[serde(default, deserialize_with = "lenient_text")]
    pub agency_id: Option<String>,

    /// Documents uploaded together with the draft, keyed by slot.
    #[serde(default)]
    pub documents: BTreeMap<String, DocumentUpload>,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReservation {
    /// Variant fields.
    pub package: PackageDetails,
    /// Traveler profile.
    pub traveler: TravelerProfile,
    /// Party size.
    pub party: PartySize,
    /// Agency the traveler booked through.
    pub agency_id: Option<Uuid>,
    /// Initial documents, ordered by slot key.
    pub documents: Vec<(DocumentKind, DocumentUpload)>,
}

/// Accepts a scalar sent as a JSON string, number or boolean and keeps it
/// as text, so that type mistakes surface as validation errors on the field.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(
        Option::<Lenient>::deserialize(deserializer)?.map(|value| match value {
            Lenient::Text(text) => text,
            Lenient::Integer(n) => n.to_string(),
            Lenient::Float(f) => f.to_string(),
            Lenient::Flag(b) => b.to_string(),
        }),
    )
}

/// Collects offending field names while each field is checked, so that a
/// single error can enumerate all of them.
#[derive(Debug, Default)]
struct FieldCheck {
    offending: Vec<&'static str>,
}

impl FieldCheck {
    fn required(&mut self, name: &'static str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Some(v.to_owned()),
            None => {
                self.offending.push(name);
                None
            }
        }
    }

    fn required_parsed<T>(
        &mut self,
        name: &'static str,
        value: Option<&str>,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        let raw = self.required(name, value)?;
        let parsed = parse(&raw);
        if parsed.is_none() {
            self.offending.push(name);
        }
        parsed
    }

    /// Absent is fine (`Some(None)`); present but malformed is an offence.
    fn optional_parsed<T>(
        &mut self,
        name: &'static str,
        value: Option<&str>,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Option<Option<T>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Some(None),
            Some(raw) => match parse(raw) {
                Some(v) => Some(Some(v)),
                None => {
                    self.offending.push(name);
                    None
                }
            },
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|n| *n >= 1)
}

fn parse_count(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok()
}

impl ReservationDraft {
    /// Validates the draft against the required-field table of its package
    /// type plus the traveler fields common to every package.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming `packageType` when the tag is
    /// missing or unknown, otherwise naming every missing or malformed field.
    /// Returns `DomainError::InvalidSlot` if an initial document uses an
    /// unknown slot key.
    pub fn validate(&self) -> Result<ValidatedReservation, DomainError> {
        let package_type = match self
            .package_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(raw) => raw.parse::<PackageType>()?,
            None => {
                return Err(DomainError::invalid_fields(
                    "package type is required",
                    ["packageType"],
                ));
            }
        };

        let mut check = FieldCheck::default();
        let package = self.package_details(package_type, &mut check);
        let traveler = self.traveler_profile(&mut check);
        let party = self.party_size(&mut check);
        let agency_id = check.optional_parsed("agencyId", self.agency_id.as_deref(), |s| {
            Uuid::parse_str(s).ok()
        });

        let (package, traveler, party, agency_id) = match (package, traveler, party, agency_id) {
            (Some(package), Some(traveler), Some(party), Some(agency_id))
                if check.offending.is_empty() =>
            {
                (package, traveler, party, agency_id)
            }
            _ => {
                return Err(DomainError::invalid_fields(
                    format!(
                        "{package_type} reservation has missing or malformed fields \
                         ({package_type} requires {})",
                        package_type.required_fields().join(", ")
                    ),
                    check.offending,
                ));
            }
        };

        let documents = self
            .documents
            .iter()
            .map(|(key, upload)| Ok((key.parse::<DocumentKind>()?, upload.clone())))
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(ValidatedReservation {
            package,
            traveler,
            party,
            agency_id,
            documents,
        })
    }

    fn package_details(
        &self,
        package_type: PackageType,
        check: &mut FieldCheck,
    ) -> Option<PackageDetails> {
        match package_type {
            PackageType::Hajj | PackageType::Umrah => {
                let forfait = check.required_parsed("forfait", self.forfait.as_deref(), |s| {
                    s.parse::<Forfait>().ok()
                });
                let departure_city = check.required("departureCity", self.departure_city.as_deref());
                let (forfait, departure_city) = (forfait?, departure_city?);
                Some(if package_type == PackageType::Hajj {
                    PackageDetails::Hajj {
                        forfait,
                        departure_city,
                    }
                } else {
                    PackageDetails::Umrah {
                        forfait,
                        departure_city,
                    }
                })
            }
            PackageType::Hotel => {
                let destination = check.required("destination", self.destination.as_deref());
                let date_from =
                    check.required_parsed("dateFrom", self.date_from.as_deref(), parse_date);
                let date_to = check.required_parsed("dateTo", self.date_to.as_deref(), parse_date);
                let rooms = check.required_parsed("rooms", self.rooms.as_deref(), parse_positive);
                Some(PackageDetails::Hotel {
                    destination: destination?,
                    date_from: date_from?,
                    date_to: date_to?,
                    rooms: rooms?,
                })
            }
            PackageType::Flight => {
                let departure_city = check.required("departureCity", self.departure_city.as_deref());
                let destination = check.required("destination", self.destination.as_deref());
                let trip_direction =
                    check.required_parsed("tripDirection", self.trip_direction.as_deref(), |s| {
                        s.parse::<TripDirection>().ok()
                    });
                let flight_class = check.required("flightClass", self.flight_class.as_deref());
                let date_from =
                    check.required_parsed("dateFrom", self.date_from.as_deref(), parse_date);
                let date_to = if trip_direction == Some(TripDirection::RoundTrip) {
                    check
                        .required_parsed("dateTo", self.date_to.as_deref(), parse_date)
                        .map(Some)
                } else {
                    check.optional_parsed("dateTo", self.date_to.as_deref(), parse_date)
                };
                Some(PackageDetails::Flight {
                    departure_city: departure_city?,
                    destination: destination?,
                    trip_direction: trip_direction?,
                    flight_class: flight_class?,
                    date_from: date_from?,
                    date_to: date_to?,
                })
            }
            PackageType::Leisure => {
                let departure_city = check.required("departureCity", self.departure_city.as_deref());
                let destination = check.required("destination", self.destination.as_deref());
                let trip_type = check.required("tripType", self.trip_type.as_deref());
                let trip_duration = check.required("tripDuration", self.trip_duration.as_deref());
                Some(PackageDetails::Leisure {
                    departure_city: departure_city?,
                    destination: destination?,
                    trip_type: trip_type?,
                    trip_duration: trip_duration?,
                })
            }
        }
    }

    fn traveler_profile(&self, check: &mut FieldCheck) -> Option<TravelerProfile> {
        let name = check.required("travelerName", self.traveler_name.as_deref());
        let phone = check.required("travelerPhone", self.traveler_phone.as_deref());
        let birth_date = check.required_parsed("birthDate", self.birth_date.as_deref(), parse_date);
        let passport_number = check.required("passportNumber", self.passport_number.as_deref());
        let passport_expiry =
            check.required_parsed("passportExpiry", self.passport_expiry.as_deref(), parse_date);
        let address = check.required("address", self.address.as_deref());
        let emergency_contact =
            check.required("emergencyContact", self.emergency_contact.as_deref());
        let medical_notes = self
            .medical_notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        Some(TravelerProfile {
            name: name?,
            phone: phone?,
            birth_date: birth_date?,
            passport_number: passport_number?,
            passport_expiry: passport_expiry?,
            address: address?,
            emergency_contact: emergency_contact?,
            medical_notes,
        })
    }

    fn party_size(&self, check: &mut FieldCheck) -> Option<PartySize> {
        let defaults = PartySize::default();
        let adults = check.optional_parsed("adults", self.adults.as_deref(), parse_positive);
        let children = check.optional_parsed("children", self.children.as_deref(), parse_count);
        Some(PartySize {
            adults: adults?.unwrap_or(defaults.adults),
            children: children?.unwrap_or(defaults.children),
        })
    }
}
