//! Currency conversion collaborator.
//!
//! Uses a live exchange-rate API when a key is configured; otherwise falls
//! back to a static USD-based rate table so conversions stay deterministic.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use wayfare_types::{CurrencyConversion, ToolDescriptor};

use crate::error::ToolError;

/// Fallback rates, units of currency per 1 USD.
const STATIC_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 148.0),
    ("CHF", 0.88),
    ("AUD", 1.52),
    ("CAD", 1.36),
    ("CNY", 7.21),
    ("INR", 83.2),
    ("THB", 35.8),
    ("SEK", 10.4),
    ("NOK", 10.6),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrencyArgs {
    amount: f64,
    from_currency: String,
    to_currency: String,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "convert_currency".to_string(),
        description: "Convert an amount between two currencies".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "Amount to convert"
                },
                "fromCurrency": {
                    "type": "string",
                    "description": "ISO 4217 code to convert from, e.g. USD"
                },
                "toCurrency": {
                    "type": "string",
                    "description": "ISO 4217 code to convert to, e.g. EUR"
                }
            },
            "required": ["amount", "fromCurrency", "toCurrency"]
        }),
    }
}

pub async fn run(
    http: &reqwest::Client,
    api_key: Option<&str>,
    args: Value,
) -> Result<Value, ToolError> {
    let args: CurrencyArgs =
        serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    let from = args.from_currency.to_uppercase();
    let to = args.to_currency.to_uppercase();

    let (rate, source) = match api_key {
        Some(key) => match fetch_rate(http, key, &from, &to).await {
            Ok(rate) => (rate, "live"),
            Err(e) => {
                warn!("Exchange-rate API request failed ({}), using static table", e);
                (static_rate(&from, &to)?, "static")
            }
        },
        None => (static_rate(&from, &to)?, "static"),
    };

    let conversion = CurrencyConversion {
        amount: args.amount,
        from_currency: from,
        to_currency: to,
        rate,
        converted: (args.amount * rate * 100.0).round() / 100.0,
    };
    Ok(json!({ "source": source, "conversion": conversion }))
}

async fn fetch_rate(
    http: &reqwest::Client,
    key: &str,
    from: &str,
    to: &str,
) -> anyhow::Result<f64> {
    let url = format!("https://v6.exchangerate-api.com/v6/{key}/pair/{from}/{to}");
    let body: Value = http
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    body["conversion_rate"]
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("missing conversion_rate in response"))
}

fn static_rate(from: &str, to: &str) -> Result<f64, ToolError> {
    let per_usd = |code: &str| {
        STATIC_RATES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, r)| *r)
            .ok_or_else(|| ToolError::Dispatch {
                tool: "convert_currency".to_string(),
                message: format!("unsupported currency: {}", code),
            })
    };
    // Cross rate through USD.
    Ok(per_usd(to)? / per_usd(from)?)
}
