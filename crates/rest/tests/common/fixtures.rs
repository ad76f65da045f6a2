//! Test data fixtures.

use serde_json::{Value, json};

/// An Observation with a date and a numeric value.
pub fn observation(id: &str, date: &str, value: f64) -> Value {
    json!({
        "resourceType": "Observation",
        "id": id,
        "status": "final",
        "code": { "text": "Heart rate" },
        "date": date,
        "valueQuantity": { "value": value, "unit": "beats/min" }
    })
}

/// A Patient with a family name.
pub fn patient(id: &str, family: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "id": id,
        "name": [{ "family": family }],
        "active": true
    })
}

/// A Patient without an id.
pub fn new_patient(family: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "name": [{ "family": family }]
    })
}
