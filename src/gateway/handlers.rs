//! Request handlers for the conversion endpoints
//!
//! Each handler validates the request shape before the codec runs. Shape
//! problems and single-item codec failures end the request with a 400;
//! batch failures are recorded per item instead.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::conversion::{canonical_json, encode_batch, ConversionStats, DelimiterType};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::discovery::{discovery_document, SERVICE_NAME};
use crate::gateway::responses::{
    AdvancedEncodeRequest, AdvancedEncodeResponse, AdvancedStats, BatchEncodeRequest,
    BatchEncodeResponse, DecodeRequest, DecodeResponse, EncodeRequest, EncodeResponse,
    HealthResponse,
};
use crate::gateway::server::AppState;

pub const MISSING_DATA: &str = "Missing \"data\" field in request body";
pub const MISSING_TOON: &str = "Missing \"toon\" field in request body";
pub const TOON_NOT_STRING: &str = "\"toon\" must be a string";
pub const ITEMS_NOT_ARRAY: &str = "\"items\" must be an array";
pub const MISSING_DATA_ADVANCED: &str = "Missing \"data\" field";

pub const ENCODE_FAILED: &str = "Failed to encode data to TOON format";
pub const DECODE_FAILED: &str = "Failed to decode TOON format to JSON";

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
    })
}

/// `GET /`
pub async fn discovery() -> Json<Value> {
    Json(discovery_document())
}

/// `POST /encode`
pub async fn encode(
    State(state): State<AppState>,
    payload: Result<Json<EncodeRequest>, JsonRejection>,
) -> GatewayResult<Json<EncodeResponse>> {
    let Json(request) = payload.map_err(|r| rejected("encode", r.into()))?;

    let data = request
        .data
        .ok_or_else(|| rejected("encode", GatewayError::validation(MISSING_DATA)))?;
    let options = request.options.unwrap_or_default();

    let toon = state.codec.encode(&data, &options).map_err(|err| {
        rejected("encode", GatewayError::codec_with_details(err, ENCODE_FAILED))
    })?;

    let stats = ConversionStats::measure(&canonical_json(&data), &toon);
    tracing::debug!(
        json_size = stats.json_size,
        toon_size = stats.toon_size,
        "Encoded JSON to TOON"
    );

    Ok(Json(EncodeResponse {
        success: true,
        toon,
        original_size: stats.json_size,
        toon_size: stats.toon_size,
        savings: stats.savings_label(),
    }))
}

/// `POST /decode`
pub async fn decode(
    State(state): State<AppState>,
    payload: Result<Json<DecodeRequest>, JsonRejection>,
) -> GatewayResult<Json<DecodeResponse>> {
    let Json(request) = payload.map_err(|r| rejected("decode", r.into()))?;

    let toon = match request.toon {
        Some(Value::String(text)) if !text.is_empty() => text,
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(rejected("decode", GatewayError::validation(MISSING_TOON)));
        }
        Some(_) => {
            return Err(rejected("decode", GatewayError::validation(TOON_NOT_STRING)));
        }
    };
    let options = request.options.unwrap_or_default();

    let data = state.codec.decode(&toon, &options).map_err(|err| {
        rejected("decode", GatewayError::codec_with_details(err, DECODE_FAILED))
    })?;

    let stats = ConversionStats::measure(&canonical_json(&data), &toon);
    tracing::debug!(
        json_size = stats.json_size,
        toon_size = stats.toon_size,
        "Decoded TOON to JSON"
    );

    Ok(Json(DecodeResponse {
        success: true,
        data,
        toon_size: stats.toon_size,
        json_size: stats.json_size,
    }))
}

/// `POST /encode-batch`
pub async fn encode_batch_items(
    State(state): State<AppState>,
    payload: Result<Json<BatchEncodeRequest>, JsonRejection>,
) -> GatewayResult<Json<BatchEncodeResponse>> {
    let Json(request) = payload.map_err(|r| rejected("encode-batch", r.into()))?;

    let Some(Value::Array(items)) = request.items else {
        return Err(rejected(
            "encode-batch",
            GatewayError::validation(ITEMS_NOT_ARRAY),
        ));
    };
    let options = request.options.unwrap_or_default();

    let outcome = encode_batch(state.codec.as_ref(), &items, &options);
    tracing::debug!(
        total = outcome.total,
        failed = outcome.failed,
        "Encoded batch"
    );

    Ok(Json(BatchEncodeResponse {
        success: true,
        outcome,
    }))
}

/// `POST /encode-advanced`
pub async fn encode_advanced(
    State(state): State<AppState>,
    payload: Result<Json<AdvancedEncodeRequest>, JsonRejection>,
) -> GatewayResult<Json<AdvancedEncodeResponse>> {
    let Json(request) = payload.map_err(|r| rejected("encode-advanced", r.into()))?;

    let Some(data) = request.data.as_ref() else {
        return Err(rejected(
            "encode-advanced",
            GatewayError::validation(MISSING_DATA_ADVANCED),
        ));
    };

    let toon = state
        .codec
        .encode(data, &request.conversion_options())
        .map_err(|err| rejected("encode-advanced", GatewayError::codec(err)))?;

    let stats = ConversionStats::measure(&canonical_json(data), &toon);
    let delimiter = delimiter_label(&request.delimiter);
    tracing::debug!(
        json_size = stats.json_size,
        toon_size = stats.toon_size,
        delimiter = %delimiter,
        "Encoded JSON to TOON with explicit options"
    );

    Ok(Json(AdvancedEncodeResponse {
        success: true,
        toon,
        stats: AdvancedStats {
            json_tokens: stats.json_size,
            toon_tokens: stats.toon_size,
            token_savings: stats.savings_label(),
            delimiter,
        },
    }))
}

/// Name a delimiter for the stats block. Unrecognised delimiters are
/// reported as given.
fn delimiter_label(delimiter: &str) -> String {
    DelimiterType::from_str(delimiter)
        .map(|d| d.label())
        .unwrap_or_else(|_| delimiter.to_string())
}

fn rejected(endpoint: &'static str, err: GatewayError) -> GatewayError {
    tracing::warn!(endpoint, kind = err.kind(), error = %err, "Request rejected");
    err
}
