//! Weather lookup collaborator.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use wayfare_types::{ToolDescriptor, WeatherReport};

use crate::error::ToolError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherArgs {
    destination: String,
    #[serde(default)]
    date: Option<String>,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "get_weather".to_string(),
        description: "Get current weather conditions for a destination".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "destination": {
                    "type": "string",
                    "description": "City to look up"
                },
                "date": {
                    "type": "string",
                    "description": "Optional date, YYYY-MM-DD. Current conditions if omitted."
                }
            },
            "required": ["destination"]
        }),
    }
}

pub async fn run(
    http: &reqwest::Client,
    api_key: Option<&str>,
    args: Value,
) -> Result<Value, ToolError> {
    let args: WeatherArgs =
        serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

    if let Some(key) = api_key {
        match fetch_upstream(http, key, &args).await {
            Ok(report) => return Ok(render(&args, report, "live")),
            Err(e) => warn!("Weather API request failed ({}), using mock data", e),
        }
    }

    Ok(render(&args, mock_report(&args), "mock"))
}

async fn fetch_upstream(
    http: &reqwest::Client,
    key: &str,
    args: &WeatherArgs,
) -> anyhow::Result<WeatherReport> {
    let body: Value = http
        .get("https://api.openweathermap.org/data/2.5/weather")
        .query(&[
            ("q", args.destination.as_str()),
            ("appid", key),
            ("units", "metric"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(WeatherReport {
        destination: args.destination.clone(),
        conditions: body["weather"][0]["description"]
            .as_str()
            .unwrap_or("unknown")
            .to_string(),
        temperature_c: body["main"]["temp"].as_f64().unwrap_or(0.0),
        humidity_pct: body["main"]["humidity"].as_f64().unwrap_or(0.0),
        wind_kph: body["wind"]["speed"].as_f64().unwrap_or(0.0) * 3.6,
    })
}

fn mock_report(args: &WeatherArgs) -> WeatherReport {
    // Seeded from the city name so repeated calls agree.
    let seed = args
        .destination
        .to_lowercase()
        .bytes()
        .map(u64::from)
        .sum::<u64>();
    let conditions = ["clear sky", "scattered clouds", "light rain", "overcast"];
    WeatherReport {
        destination: args.destination.clone(),
        conditions: conditions[(seed % conditions.len() as u64) as usize].to_string(),
        temperature_c: 8.0 + (seed % 22) as f64,
        humidity_pct: 40.0 + (seed % 45) as f64,
        wind_kph: 5.0 + (seed % 25) as f64,
    }
}

fn render(args: &WeatherArgs, report: WeatherReport, source: &str) -> Value {
    json!({
        "date": args.date,
        "source": source,
        "weather": report,
    })
}
