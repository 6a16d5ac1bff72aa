//! Travel-domain result types returned by the tool collaborators.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Spending tier used by hotel search and budget estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum BudgetTier {
    Budget,
    MidRange,
    Luxury,
}

impl BudgetTier {
    /// Round-trip airfare per traveler, USD.
    pub fn flight_rate(&self) -> f64 {
        match self {
            BudgetTier::Budget => 400.0,
            BudgetTier::MidRange => 800.0,
            BudgetTier::Luxury => 2500.0,
        }
    }

    /// Hotel rate per night, USD.
    pub fn nightly_rate(&self) -> f64 {
        match self {
            BudgetTier::Budget => 60.0,
            BudgetTier::MidRange => 150.0,
            BudgetTier::Luxury => 450.0,
        }
    }

    /// Food, transit, and activities per traveler per day, USD.
    pub fn daily_rate(&self) -> f64 {
        match self {
            BudgetTier::Budget => 40.0,
            BudgetTier::MidRange => 80.0,
            BudgetTier::Luxury => 200.0,
        }
    }
}

impl Default for BudgetTier {
    fn default() -> Self {
        BudgetTier::MidRange
    }
}

/// One flight offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FlightOption {
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub price_usd: f64,
    pub stops: u32,
}

/// One hotel offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HotelOption {
    pub name: String,
    pub area: String,
    pub rating: f64,
    pub nightly_rate_usd: f64,
    pub amenities: Vec<String>,
}

/// Weather summary for a destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WeatherReport {
    pub destination: String,
    pub conditions: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_kph: f64,
}

/// Result of a currency conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CurrencyConversion {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub converted: f64,
}

/// One point of interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PointOfInterest {
    pub name: String,
    pub category: String,
    pub description: String,
    pub rating: f64,
}

/// Deterministic trip budget estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TripBudget {
    pub duration_days: u32,
    pub travelers: u32,
    pub budget_level: BudgetTier,
    pub flights_usd: f64,
    pub lodging_usd: f64,
    pub daily_expenses_usd: f64,
    pub total_usd: f64,
}
