//! Resource limits shared by the codec and the HTTP transport

use crate::error::{ToonError, ToonResult};

/// Maximum nesting depth the encoder and decoder will descend to. Keeps
/// recursion bounded for documents that are small in bytes but deep.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Default maximum request body size accepted by the gateway (10 MB)
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Smallest body limit a configuration may set
pub const MIN_BODY_LIMIT: usize = 1024;

/// Fail with an encode error once `depth` passes the nesting limit
pub fn check_encode_depth(depth: usize) -> ToonResult<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ToonError::encode(format!(
            "Maximum nesting depth of {} exceeded",
            MAX_NESTING_DEPTH
        )));
    }
    Ok(())
}

/// Fail with a parse error on `line` once `depth` passes the nesting limit
pub fn check_decode_depth(depth: usize, line: usize) -> ToonResult<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ToonError::parse(
            line,
            format!("Maximum nesting depth of {} exceeded", MAX_NESTING_DEPTH),
        ));
    }
    Ok(())
}
