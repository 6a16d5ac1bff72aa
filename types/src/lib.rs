//! Shared types for the Wayfare travel tool gateway.
//!
//! This crate contains the API and travel-domain types shared between the
//! backend and any clients built against it.

/// Default port for the Wayfare backend server.
pub const DEFAULT_PORT: u16 = 8080;

pub mod api;
pub mod travel;

// Re-export commonly used types
pub use api::{ErrorResponse, MessageAck, ToolCatalogResponse, ToolDescriptor};
pub use travel::{
    BudgetTier, CurrencyConversion, FlightOption, HotelOption, PointOfInterest, TripBudget,
    WeatherReport,
};
