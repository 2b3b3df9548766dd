//! Traveler profile and party size.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Personal details of the traveler a reservation is made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelerProfile {
    /// Full name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Passport number.
    pub passport_number: String,
    /// Passport expiry date. Not checked against travel dates.
    pub passport_expiry: NaiveDate,
    /// Postal address.
    pub address: String,
    /// Emergency contact (name and/or phone).
    pub emergency_contact: String,
    /// Free-form medical notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_notes: Option<String>,
}

/// Number of travelers covered by a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySize {
    /// Adults, at least one.
    pub adults: u32,
    /// Children.
    pub children: u32,
}

impl Default for PartySize {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
        }
    }
}
