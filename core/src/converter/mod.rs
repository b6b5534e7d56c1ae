//! Payload and failure conversion.
//!
//! Three layers, composed top to bottom:
//!
//! 1. Payload converters turn typed values into `Payload` wire messages and
//!    back, tagging each with an `"encoding"` metadata key.
//! 2. Payload codecs transform raw payload bytes after marshalling and
//!    before unmarshalling (compression, encryption).
//! 3. The failure converter maps the error taxonomy onto the recursive
//!    `Failure` wire message.

mod codec;
mod failure;
mod payload;

pub use codec::{PayloadCodec, ZlibCodec, ZlibCodecOptions};
pub use failure::{
    decode_common_failure_attributes, encode_common_failure_attributes, FailureConverter,
    FailureConverterOptions, ENCODED_FAILURE_MESSAGE,
};
pub use payload::{
    DataConverter, EncodedValues, PayloadValue, ENCODING_JSON, ENCODING_NULL, ENCODING_PROTO,
    ENCODING_PROTO_JSON, ENCODING_RAW, ENCODING_ZLIB, METADATA_ENCODING, METADATA_MESSAGE_TYPE,
};

/// Errors raised anywhere in the conversion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    /// The payload carries no `"encoding"` metadata or one no converter
    /// understands.
    #[error("invalid payload encoding: {encoding:?}")]
    InvalidEncoding { encoding: Option<String> },

    /// The number of values requested does not match the number of payloads.
    #[error("payload count mismatch: have {actual}, requested index/count {requested}")]
    SizeMismatch { requested: usize, actual: usize },

    /// Payload bytes could not be decoded under their declared encoding.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// No data was present where a value was requested.
    #[error("no data available")]
    NoData,

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A wire message failed to decode.
    #[error("proto decode error: {0}")]
    ProtoDecode(#[from] prost::DecodeError),
}
