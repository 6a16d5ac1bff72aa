//! Flight search collaborator.
//!
//! Calls the AviationStack API when a key is configured and falls back to
//! deterministic mock offers otherwise (or when the upstream call fails).

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use wayfare_types::{FlightOption, ToolDescriptor};

use crate::error::ToolError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlightArgs {
    origin: String,
    destination: String,
    departure_date: String,
    #[serde(default)]
    return_date: Option<String>,
    travelers: u32,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "search_flights".to_string(),
        description: "Search for flights between two cities on a given date".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "origin": {
                    "type": "string",
                    "description": "Departure city or IATA code"
                },
                "destination": {
                    "type": "string",
                    "description": "Arrival city or IATA code"
                },
                "departureDate": {
                    "type": "string",
                    "description": "Departure date, YYYY-MM-DD"
                },
                "returnDate": {
                    "type": "string",
                    "description": "Optional return date, YYYY-MM-DD"
                },
                "travelers": {
                    "type": "integer",
                    "description": "Number of travelers. Default is 1.",
                    "default": 1
                }
            },
            "required": ["origin", "destination", "departureDate"]
        }),
    }
}

pub async fn run(
    http: &reqwest::Client,
    api_key: Option<&str>,
    args: Value,
) -> Result<Value, ToolError> {
    let args: FlightArgs =
        serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

    let departure = NaiveDate::parse_from_str(&args.departure_date, "%Y-%m-%d")
        .map_err(|e| ToolError::InvalidArguments(format!("departureDate: {}", e)))?;
    if let Some(ref return_date) = args.return_date {
        let ret = NaiveDate::parse_from_str(return_date, "%Y-%m-%d")
            .map_err(|e| ToolError::InvalidArguments(format!("returnDate: {}", e)))?;
        if ret < departure {
            return Err(ToolError::InvalidArguments(
                "returnDate is before departureDate".to_string(),
            ));
        }
    }

    if let Some(key) = api_key {
        match fetch_upstream(http, key, &args).await {
            Ok(options) if !options.is_empty() => return Ok(render(&args, options, "live")),
            Ok(_) => warn!("Flight API returned no offers, using mock data"),
            Err(e) => warn!("Flight API request failed ({}), using mock data", e),
        }
    }

    Ok(render(&args, mock_offers(&args), "mock"))
}

async fn fetch_upstream(
    http: &reqwest::Client,
    key: &str,
    args: &FlightArgs,
) -> anyhow::Result<Vec<FlightOption>> {
    let body: Value = http
        .get("https://api.aviationstack.com/v1/flights")
        .query(&[
            ("access_key", key),
            ("dep_iata", &args.origin),
            ("arr_iata", &args.destination),
            ("limit", "5"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let mut options = Vec::new();
    if let Some(entries) = body["data"].as_array() {
        for entry in entries {
            let airline = entry["airline"]["name"].as_str().unwrap_or("Unknown");
            let number = entry["flight"]["iata"].as_str().unwrap_or("N/A");
            options.push(FlightOption {
                airline: airline.to_string(),
                flight_number: number.to_string(),
                origin: args.origin.clone(),
                destination: args.destination.clone(),
                departure: entry["departure"]["scheduled"]
                    .as_str()
                    .unwrap_or(&args.departure_date)
                    .to_string(),
                arrival: entry["arrival"]["scheduled"]
                    .as_str()
                    .unwrap_or(&args.departure_date)
                    .to_string(),
                price_usd: 0.0, // AviationStack has no fares; price comes from the mock tier.
                stops: 0,
            });
        }
    }
    Ok(options)
}

fn mock_offers(args: &FlightArgs) -> Vec<FlightOption> {
    // Deterministic: derived only from the request so tests can assert on it.
    let base = 180.0 + 12.0 * (args.origin.len() + args.destination.len()) as f64;
    let carriers = [
        ("SkyLine Air", "SL", 1.0, 0),
        ("TransGlobal", "TG", 1.35, 1),
        ("BudgetWings", "BW", 0.78, 1),
    ];
    carriers
        .iter()
        .enumerate()
        .map(|(i, (airline, code, factor, stops))| FlightOption {
            airline: airline.to_string(),
            flight_number: format!("{}{}", code, 100 + i * 37),
            origin: args.origin.clone(),
            destination: args.destination.clone(),
            departure: format!("{}T0{}:30:00", args.departure_date, 6 + i * 2),
            arrival: format!("{}T1{}:45:00", args.departure_date, 2 + i * 2),
            price_usd: (base * factor).round(),
            stops: *stops,
        })
        .collect()
}

fn render(args: &FlightArgs, options: Vec<FlightOption>, source: &str) -> Value {
    json!({
        "origin": args.origin,
        "destination": args.destination,
        "departure_date": args.departure_date,
        "return_date": args.return_date,
        "travelers": args.travelers,
        "source": source,
        "flights": options,
    })
}
