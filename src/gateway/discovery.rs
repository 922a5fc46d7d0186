//! Self-describing API document served at `GET /`

use serde_json::{json, Value};

/// Service name reported by discovery and health
pub const SERVICE_NAME: &str = "TOON Converter API";

/// Describe every endpoint with an example payload
pub fn discovery_document() -> Value {
    json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /encode": {
                "description": "Convert JSON to TOON format",
                "example": {
                    "data": { "users": [{ "id": 1, "name": "Alice" }] },
                    "options": {}
                }
            },
            "POST /decode": {
                "description": "Convert TOON to JSON format",
                "example": {
                    "toon": "users[1]{id,name}:\n  1,Alice",
                    "options": {}
                }
            },
            "POST /encode-batch": {
                "description": "Convert multiple JSON objects to TOON",
                "example": {
                    "items": [{ "id": 1 }, { "id": 2 }],
                    "options": {}
                }
            },
            "POST /encode-advanced": {
                "description": "Advanced encoding with delimiter and folding options",
                "example": {
                    "data": { "items": [{ "id": 1, "name": "Test" }] },
                    "delimiter": ",",
                    "keyFolding": "off",
                    "indent": 2
                }
            },
            "GET /health": {
                "description": "Health check endpoint"
            }
        }
    })
}
