//! Trip budget estimation.
//!
//! Purely local and deterministic:
//! `flight_rate * travelers + nightly_rate * duration + daily_rate * duration * travelers`
//! with per-tier rates from [`BudgetTier`].

use serde::Deserialize;
use serde_json::{json, Value};
use wayfare_types::{BudgetTier, ToolDescriptor, TripBudget};

use crate::error::ToolError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetArgs {
    duration: u32,
    travelers: u32,
    budget_level: BudgetTier,
    include_flights: bool,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "calculate_trip_budget".to_string(),
        description: "Estimate a total trip budget for a stay".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "duration": {
                    "type": "integer",
                    "description": "Trip length in days"
                },
                "travelers": {
                    "type": "integer",
                    "description": "Number of travelers. Default is 1.",
                    "default": 1
                },
                "budgetLevel": {
                    "type": "string",
                    "enum": ["budget", "mid-range", "luxury"],
                    "description": "Spending tier. Default is 'mid-range'.",
                    "default": "mid-range"
                },
                "includeFlights": {
                    "type": "boolean",
                    "description": "Whether to include round-trip airfare. Default is true.",
                    "default": true
                }
            },
            "required": ["duration"]
        }),
    }
}

pub fn run(args: Value) -> Result<Value, ToolError> {
    let args: BudgetArgs =
        serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    if args.duration == 0 {
        return Err(ToolError::InvalidArguments(
            "duration must be at least 1 day".to_string(),
        ));
    }

    let tier = args.budget_level;
    let flights = if args.include_flights {
        tier.flight_rate() * args.travelers as f64
    } else {
        0.0
    };
    let lodging = tier.nightly_rate() * args.duration as f64;
    let daily = tier.daily_rate() * args.duration as f64 * args.travelers as f64;

    let budget = TripBudget {
        duration_days: args.duration,
        travelers: args.travelers,
        budget_level: tier,
        flights_usd: flights,
        lodging_usd: lodging,
        daily_expenses_usd: daily,
        total_usd: flights + lodging + daily,
    };
    serde_json::to_value(&budget).map_err(|e| ToolError::Dispatch {
        tool: "calculate_trip_budget".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_range_week_for_two_matches_the_formula() {
        let result = run(json!({
            "duration": 7,
            "travelers": 2,
            "budgetLevel": "mid-range",
            "includeFlights": true
        }))
        .unwrap();

        // 800*2 + 150*7 + 80*7*2
        assert_eq!(result["flights_usd"], json!(1600.0));
        assert_eq!(result["lodging_usd"], json!(1050.0));
        assert_eq!(result["daily_expenses_usd"], json!(1120.0));
        assert_eq!(result["total_usd"], json!(3770.0));
    }

    #[test]
    fn flights_can_be_excluded() {
        let result = run(json!({
            "duration": 3,
            "travelers": 1,
            "budgetLevel": "budget",
            "includeFlights": false
        }))
        .unwrap();
        assert_eq!(result["flights_usd"], json!(0.0));
        // 60*3 + 40*3*1
        assert_eq!(result["total_usd"], json!(300.0));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let err = run(json!({
            "duration": 0,
            "travelers": 1,
            "budgetLevel": "budget",
            "includeFlights": true
        }))
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
