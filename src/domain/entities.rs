//! Domain entities mirrored from the business directory.
//!
//! Records are owned by the external directory and treated as read-only here.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Opening hours for one group of days (weekdays or weekend).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayGroupHours {
    pub days: Vec<String>,
    pub opens: Option<String>,
    pub closes: Option<String>,
}

impl DayGroupHours {
    /// A group is publishable only with at least one day and both time bounds.
    pub fn is_complete(&self) -> bool {
        !self.days.is_empty()
            && self.opens.as_deref().is_some_and(|value| !value.trim().is_empty())
            && self.closes.as_deref().is_some_and(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyHours {
    pub weekday: DayGroupHours,
    pub weekend: DayGroupHours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Alternate slug consulted when the primary slug does not match.
    #[serde(default)]
    pub public_slug: Option<String>,
    #[serde(default)]
    pub public_enabled: bool,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub comuna: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub geo: Option<GeoPoint>,
    #[serde(default)]
    pub hours: WeeklyHours,
    #[serde(default)]
    pub social_links: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl CompanyRecord {
    /// Preferred contact number for structured data.
    pub fn telephone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .or(self.whatsapp.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub company_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in whole Chilean pesos.
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl ServiceRecord {
    pub fn is_active(&self) -> bool {
        self.status == ServiceStatus::Active
    }
}
