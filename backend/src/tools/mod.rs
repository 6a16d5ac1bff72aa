//! Tool registry and dispatcher.
//!
//! The registry is a constant catalog of tool descriptors; the dispatcher
//! owns the HTTP client and provider credentials, applies each tool's
//! documented defaults, and converts every handler fault into an error
//! envelope so nothing escapes to the protocol layer.

pub mod attractions;
pub mod budget;
pub mod currency;
pub mod flights;
pub mod hotels;
pub mod weather;

use serde_json::{json, Map, Value};
use tracing::{error, info};
use wayfare_types::ToolDescriptor;

use crate::config::ProviderConfig;
use crate::error::ToolError;

/// The constant tool catalog. Pure and side-effect-free.
pub fn catalog() -> Vec<ToolDescriptor> {
    vec![
        flights::descriptor(),
        hotels::descriptor(),
        weather::descriptor(),
        currency::descriptor(),
        attractions::descriptor(),
        budget::descriptor(),
    ]
}

/// Dispatches tool calls to their collaborators.
pub struct ToolDispatcher {
    http: reqwest::Client,
    providers: ProviderConfig,
}

impl ToolDispatcher {
    pub fn new(providers: ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            providers,
        }
    }

    /// Invoke a tool and wrap the outcome in an MCP content envelope.
    ///
    /// Faults never propagate: unknown tools, bad arguments, and collaborator
    /// failures all come back as `isError` envelopes and the session stays
    /// usable.
    pub async fn invoke(&self, name: &str, args: Value) -> Value {
        match self.call(name, args).await {
            Ok(result) => json!({
                "content": [{
                    "type": "text",
                    "text": serde_json::to_string_pretty(&result)
                        .unwrap_or_else(|_| result.to_string()),
                }]
            }),
            Err(e) => {
                error!("Tool call failed: {}", e);
                json!({
                    "content": [{
                        "type": "text",
                        "text": e.to_string(),
                    }],
                    "isError": true
                })
            }
        }
    }

    async fn call(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let mut args = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "expected an object, got {}",
                    other
                )))
            }
        };
        apply_defaults(name, &mut args);
        let args = Value::Object(args);

        info!("Dispatching tool call: {}", name);
        match name {
            "search_flights" => {
                flights::run(&self.http, self.providers.flight_api_key.as_deref(), args).await
            }
            "search_hotels" => {
                hotels::run(&self.http, self.providers.places_api_key.as_deref(), args).await
            }
            "get_weather" => {
                weather::run(&self.http, self.providers.weather_api_key.as_deref(), args).await
            }
            "convert_currency" => {
                currency::run(&self.http, self.providers.exchange_api_key.as_deref(), args).await
            }
            "find_attractions" => {
                attractions::run(&self.http, self.providers.places_api_key.as_deref(), args).await
            }
            "calculate_trip_budget" => budget::run(args),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}

/// Fill in the documented defaults for optional arguments the caller omitted.
///
/// The registry only documents defaults; applying them here keeps the
/// handlers free of per-field fallbacks.
fn apply_defaults(name: &str, args: &mut Map<String, Value>) {
    let mut ensure = |key: &str, value: Value| {
        args.entry(key.to_string()).or_insert(value);
    };
    match name {
        "search_flights" => {
            ensure("travelers", json!(1));
        }
        "search_hotels" => {
            ensure("budgetLevel", json!("mid-range"));
        }
        "find_attractions" => {
            ensure("category", json!("attractions"));
            ensure("limit", json!(5));
        }
        "calculate_trip_budget" => {
            ensure("travelers", json!(1));
            ensure("budgetLevel", json!("mid-range"));
            ensure("includeFlights", json!(true));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> ToolDispatcher {
        ToolDispatcher::new(ProviderConfig::default())
    }

    #[tokio::test]
    async fn unknown_tool_returns_error_envelope() {
        let result = dispatcher().invoke("book_cruise", json!({})).await;
        assert_eq!(result["isError"], json!(true));
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("book_cruise"));
    }

    #[tokio::test]
    async fn non_object_arguments_are_rejected_as_data() {
        let result = dispatcher().invoke("search_flights", json!([1, 2])).await;
        assert_eq!(result["isError"], json!(true));
    }

    #[tokio::test]
    async fn defaults_are_applied_before_dispatch() {
        // travelers defaults to 1; only duration is required.
        let result = dispatcher()
            .invoke("calculate_trip_budget", json!({"duration": 3}))
            .await;
        assert!(result.get("isError").is_none());
        let text = result["content"][0]["text"].as_str().unwrap();
        let budget: Value = serde_json::from_str(text).unwrap();
        assert_eq!(budget["travelers"], json!(1));
        assert_eq!(budget["budget_level"], json!("mid-range"));
    }

    #[tokio::test]
    async fn catalog_lists_all_six_tools() {
        let names: Vec<String> = catalog().into_iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 6);
        for expected in [
            "search_flights",
            "search_hotels",
            "get_weather",
            "convert_currency",
            "find_attractions",
            "calculate_trip_budget",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }
}
