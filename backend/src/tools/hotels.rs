//! Hotel search collaborator.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use wayfare_types::{BudgetTier, HotelOption, ToolDescriptor};

use crate::error::ToolError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelArgs {
    destination: String,
    check_in: String,
    check_out: String,
    budget_level: BudgetTier,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "search_hotels".to_string(),
        description: "Search for hotels in a destination for a stay window".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "destination": {
                    "type": "string",
                    "description": "City to stay in"
                },
                "checkIn": {
                    "type": "string",
                    "description": "Check-in date, YYYY-MM-DD"
                },
                "checkOut": {
                    "type": "string",
                    "description": "Check-out date, YYYY-MM-DD"
                },
                "budgetLevel": {
                    "type": "string",
                    "enum": ["budget", "mid-range", "luxury"],
                    "description": "Spending tier. Default is 'mid-range'.",
                    "default": "mid-range"
                }
            },
            "required": ["destination", "checkIn", "checkOut"]
        }),
    }
}

pub async fn run(
    http: &reqwest::Client,
    api_key: Option<&str>,
    args: Value,
) -> Result<Value, ToolError> {
    let args: HotelArgs =
        serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    let nights = stay_nights(&args)?;

    if let Some(key) = api_key {
        match fetch_upstream(http, key, &args).await {
            Ok(hotels) if !hotels.is_empty() => return Ok(render(&args, nights, hotels, "live")),
            Ok(_) => warn!("Places API returned no hotels, using mock data"),
            Err(e) => warn!("Places API request failed ({}), using mock data", e),
        }
    }

    Ok(render(&args, nights, mock_hotels(&args), "mock"))
}

/// Length of the stay in nights. The window must be at least one night.
fn stay_nights(args: &HotelArgs) -> Result<i64, ToolError> {
    let check_in = NaiveDate::parse_from_str(&args.check_in, "%Y-%m-%d")
        .map_err(|e| ToolError::InvalidArguments(format!("checkIn: {}", e)))?;
    let check_out = NaiveDate::parse_from_str(&args.check_out, "%Y-%m-%d")
        .map_err(|e| ToolError::InvalidArguments(format!("checkOut: {}", e)))?;
    let nights = (check_out - check_in).num_days();
    if nights < 1 {
        return Err(ToolError::InvalidArguments(
            "checkOut must be after checkIn".to_string(),
        ));
    }
    Ok(nights)
}

async fn fetch_upstream(
    http: &reqwest::Client,
    key: &str,
    args: &HotelArgs,
) -> anyhow::Result<Vec<HotelOption>> {
    let body: Value = http
        .get("https://api.foursquare.com/v3/places/search")
        .header("Authorization", key)
        .query(&[
            ("query", "hotel"),
            ("near", &args.destination),
            ("limit", "5"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let nightly = args.budget_level.nightly_rate();
    let mut hotels = Vec::new();
    if let Some(results) = body["results"].as_array() {
        for place in results {
            hotels.push(HotelOption {
                name: place["name"].as_str().unwrap_or("Unknown").to_string(),
                area: place["location"]["locality"]
                    .as_str()
                    .unwrap_or(&args.destination)
                    .to_string(),
                rating: place["rating"].as_f64().unwrap_or(4.0),
                nightly_rate_usd: nightly,
                amenities: vec!["wifi".to_string()],
            });
        }
    }
    Ok(hotels)
}

fn mock_hotels(args: &HotelArgs) -> Vec<HotelOption> {
    let nightly = args.budget_level.nightly_rate();
    let (names, amenities): (&[&str], Vec<&str>) = match args.budget_level {
        BudgetTier::Budget => (
            &["City Hostel Central", "The Backpacker Inn", "Stay&Go Rooms"],
            vec!["wifi", "shared kitchen"],
        ),
        BudgetTier::MidRange => (
            &["Harbor View Hotel", "The Metropolitan", "Garden Court Hotel"],
            vec!["wifi", "breakfast", "gym"],
        ),
        BudgetTier::Luxury => (
            &["The Grand Palace", "Royal Meridian", "Aurora Resort & Spa"],
            vec!["wifi", "breakfast", "spa", "pool", "concierge"],
        ),
    };
    names
        .iter()
        .enumerate()
        .map(|(i, name)| HotelOption {
            name: name.to_string(),
            area: format!("{} center", args.destination),
            rating: 3.8 + 0.4 * i as f64,
            nightly_rate_usd: (nightly * (0.9 + 0.1 * i as f64)).round(),
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
        })
        .collect()
}

fn render(args: &HotelArgs, nights: i64, hotels: Vec<HotelOption>, source: &str) -> Value {
    json!({
        "destination": args.destination,
        "check_in": args.check_in,
        "check_out": args.check_out,
        "nights": nights,
        "budget_level": args.budget_level,
        "source": source,
        "hotels": hotels,
    })
}
