//! Typed value ⇄ `Payload` conversion.

use crate::api::common::{Payload, Payloads};
use crate::converter::codec::PayloadCodec;
use crate::converter::ConverterError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Metadata key naming the converter that produced a payload.
pub const METADATA_ENCODING: &str = "encoding";
/// Metadata key carrying the message type of proto-encoded payloads.
pub const METADATA_MESSAGE_TYPE: &str = "messageType";

pub const ENCODING_NULL: &str = "binary/null";
pub const ENCODING_RAW: &str = "binary/plain";
pub const ENCODING_PROTO: &str = "binary/proto";
pub const ENCODING_PROTO_JSON: &str = "json/protobuf";
pub const ENCODING_JSON: &str = "json/plain";
/// Produced by the zlib codec, not by any converter.
pub const ENCODING_ZLIB: &str = "binary/zlib";

/// The in-memory forms a payload can take on either side of conversion.
///
/// The composite converter tries the variants in declaration order, so a
/// value always maps to exactly one encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    /// Absent value, `binary/null`.
    Nil,
    /// Raw bytes, `binary/plain`.
    Bytes(Vec<u8>),
    /// A proto message in its wire form, `binary/proto`.
    ProtoBinary { message_type: String, data: Vec<u8> },
    /// A proto message in its canonical JSON form, `json/protobuf`.
    ProtoJson { message_type: String, json: Value },
    /// Anything serde can express, `json/plain`.
    Json(Value),
}

impl PayloadValue {
    /// Build a value from any serializable type. `None`/`()`/null map to
    /// [`PayloadValue::Nil`].
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ConverterError> {
        let json = serde_json::to_value(value)?;
        Ok(match json {
            Value::Null => PayloadValue::Nil,
            other => PayloadValue::Json(other),
        })
    }

    /// Deserialize into a concrete type. Only `Nil`, `Json` and `ProtoJson`
    /// carry serde-compatible data.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ConverterError> {
        let json = match self {
            PayloadValue::Nil => Value::Null,
            PayloadValue::Json(json) => json,
            PayloadValue::ProtoJson { json, .. } => json,
            PayloadValue::Bytes(_) | PayloadValue::ProtoBinary { .. } => {
                return Err(ConverterError::Malformed(
                    "binary payload cannot deserialize into a typed value".to_string(),
                ))
            }
        };
        Ok(serde_json::from_value(json)?)
    }
}

impl From<Value> for PayloadValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PayloadValue::Nil,
            other => PayloadValue::Json(other),
        }
    }
}

fn payload_encoding(payload: &Payload) -> Option<&str> {
    payload
        .metadata
        .get(METADATA_ENCODING)
        .and_then(|raw| std::str::from_utf8(raw).ok())
}

fn metadata_with_encoding(encoding: &str) -> std::collections::HashMap<String, Vec<u8>> {
    let mut metadata = std::collections::HashMap::new();
    metadata.insert(METADATA_ENCODING.to_string(), encoding.as_bytes().to_vec());
    metadata
}

// ============================================================================
// Per-encoding converters
// ============================================================================

trait EncodingConverter: Send + Sync {
    fn encoding(&self) -> &'static str;

    /// Produce a payload if this converter handles the value, `None` to let
    /// the next converter try.
    fn try_to_payload(&self, value: &PayloadValue) -> Result<Option<Payload>, ConverterError>;

    fn from_payload(&self, payload: &Payload) -> Result<PayloadValue, ConverterError>;
}

struct NullConverter;

impl EncodingConverter for NullConverter {
    fn encoding(&self) -> &'static str {
        ENCODING_NULL
    }

    fn try_to_payload(&self, value: &PayloadValue) -> Result<Option<Payload>, ConverterError> {
        match value {
            PayloadValue::Nil => Ok(Some(Payload {
                metadata: metadata_with_encoding(ENCODING_NULL),
                data: Vec::new(),
            })),
            _ => Ok(None),
        }
    }

    fn from_payload(&self, _payload: &Payload) -> Result<PayloadValue, ConverterError> {
        Ok(PayloadValue::Nil)
    }
}

struct ByteSliceConverter;

impl EncodingConverter for ByteSliceConverter {
    fn encoding(&self) -> &'static str {
        ENCODING_RAW
    }

    fn try_to_payload(&self, value: &PayloadValue) -> Result<Option<Payload>, ConverterError> {
        match value {
            PayloadValue::Bytes(bytes) => Ok(Some(Payload {
                metadata: metadata_with_encoding(ENCODING_RAW),
                data: bytes.clone(),
            })),
            _ => Ok(None),
        }
    }

    fn from_payload(&self, payload: &Payload) -> Result<PayloadValue, ConverterError> {
        Ok(PayloadValue::Bytes(payload.data.clone()))
    }
}

struct ProtoJsonConverter;

impl EncodingConverter for ProtoJsonConverter {
    fn encoding(&self) -> &'static str {
        ENCODING_PROTO_JSON
    }

    fn try_to_payload(&self, value: &PayloadValue) -> Result<Option<Payload>, ConverterError> {
        match value {
            PayloadValue::ProtoJson { message_type, json } => {
                let mut metadata = metadata_with_encoding(ENCODING_PROTO_JSON);
                metadata.insert(
                    METADATA_MESSAGE_TYPE.to_string(),
                    message_type.as_bytes().to_vec(),
                );
                Ok(Some(Payload {
                    metadata,
                    data: serde_json::to_vec(json)?,
                }))
            }
            _ => Ok(None),
        }
    }

    fn from_payload(&self, payload: &Payload) -> Result<PayloadValue, ConverterError> {
        let json = serde_json::from_slice(&payload.data)
            .map_err(|e| ConverterError::Malformed(format!("invalid proto json: {e}")))?;
        Ok(PayloadValue::ProtoJson {
            message_type: message_type_of(payload),
            json,
        })
    }
}

struct ProtoBinaryConverter;

impl EncodingConverter for ProtoBinaryConverter {
    fn encoding(&self) -> &'static str {
        ENCODING_PROTO
    }

    fn try_to_payload(&self, value: &PayloadValue) -> Result<Option<Payload>, ConverterError> {
        match value {
            PayloadValue::ProtoBinary { message_type, data } => {
                let mut metadata = metadata_with_encoding(ENCODING_PROTO);
                metadata.insert(
                    METADATA_MESSAGE_TYPE.to_string(),
                    message_type.as_bytes().to_vec(),
                );
                Ok(Some(Payload {
                    metadata,
                    data: data.clone(),
                }))
            }
            _ => Ok(None),
        }
    }

    fn from_payload(&self, payload: &Payload) -> Result<PayloadValue, ConverterError> {
        Ok(PayloadValue::ProtoBinary {
            message_type: message_type_of(payload),
            data: payload.data.clone(),
        })
    }
}

struct JsonConverter;

impl EncodingConverter for JsonConverter {
    fn encoding(&self) -> &'static str {
        ENCODING_JSON
    }

    fn try_to_payload(&self, value: &PayloadValue) -> Result<Option<Payload>, ConverterError> {
        match value {
            PayloadValue::Json(json) => Ok(Some(Payload {
                metadata: metadata_with_encoding(ENCODING_JSON),
                data: serde_json::to_vec(json)?,
            })),
            _ => Ok(None),
        }
    }

    fn from_payload(&self, payload: &Payload) -> Result<PayloadValue, ConverterError> {
        let json = serde_json::from_slice(&payload.data)
            .map_err(|e| ConverterError::Malformed(format!("invalid json payload: {e}")))?;
        Ok(PayloadValue::Json(json))
    }
}

fn message_type_of(payload: &Payload) -> String {
    payload
        .metadata
        .get(METADATA_MESSAGE_TYPE)
        .and_then(|raw| std::str::from_utf8(raw).ok())
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// DataConverter
// ============================================================================

/// The composite converter plus an optional codec chain.
///
/// Conversion order on the way out: converter marshal, then codecs in
/// registration order. On the way in: codecs in reverse order, then converter
/// unmarshal.
#[derive(Clone)]
pub struct DataConverter {
    converters: Arc<Vec<Box<dyn EncodingConverter>>>,
    codecs: Vec<Arc<dyn PayloadCodec>>,
}

impl fmt::Debug for DataConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataConverter")
            .field("codecs", &self.codecs.len())
            .finish()
    }
}

impl Default for DataConverter {
    fn default() -> Self {
        Self {
            converters: Arc::new(vec![
                Box::new(NullConverter),
                Box::new(ByteSliceConverter),
                Box::new(ProtoJsonConverter),
                Box::new(ProtoBinaryConverter),
                Box::new(JsonConverter),
            ]),
            codecs: Vec::new(),
        }
    }
}

impl DataConverter {
    /// A converter with a codec chain layered on top. Codecs run in the
    /// given order when encoding and in reverse when decoding.
    pub fn with_codecs(codecs: Vec<Arc<dyn PayloadCodec>>) -> Self {
        Self {
            codecs,
            ..Default::default()
        }
    }

    /// Layer one more codec onto this converter.
    pub fn with_codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.codecs.push(codec);
        self
    }

    pub fn has_codecs(&self) -> bool {
        !self.codecs.is_empty()
    }

    fn marshal(&self, value: &PayloadValue) -> Result<Payload, ConverterError> {
        for converter in self.converters.iter() {
            if let Some(payload) = converter.try_to_payload(value)? {
                return Ok(payload);
            }
        }
        // The converter list is exhaustive over PayloadValue.
        Err(ConverterError::InvalidEncoding { encoding: None })
    }

    fn unmarshal(&self, payload: &Payload) -> Result<PayloadValue, ConverterError> {
        let encoding = payload_encoding(payload).ok_or(ConverterError::InvalidEncoding {
            encoding: None,
        })?;
        for converter in self.converters.iter() {
            if converter.encoding() == encoding {
                return converter.from_payload(payload);
            }
        }
        Err(ConverterError::InvalidEncoding {
            encoding: Some(encoding.to_string()),
        })
    }

    /// Run payloads through the codec chain (outbound direction).
    pub fn encode_payloads(&self, payloads: Vec<Payload>) -> Result<Vec<Payload>, ConverterError> {
        let mut payloads = payloads;
        for codec in &self.codecs {
            payloads = codec.encode(payloads)?;
        }
        Ok(payloads)
    }

    /// Run payloads through the codec chain (inbound direction).
    pub fn decode_payloads(&self, payloads: Vec<Payload>) -> Result<Vec<Payload>, ConverterError> {
        let mut payloads = payloads;
        for codec in self.codecs.iter().rev() {
            payloads = codec.decode(payloads)?;
        }
        Ok(payloads)
    }

    /// Convert one value into a payload.
    pub fn to_payload_value(&self, value: &PayloadValue) -> Result<Payload, ConverterError> {
        let payload = self.marshal(value)?;
        let mut encoded = self.encode_payloads(vec![payload])?;
        Ok(encoded.remove(0))
    }

    /// Convert a payload back into a value.
    pub fn from_payload_value(&self, payload: &Payload) -> Result<PayloadValue, ConverterError> {
        let mut decoded = self.decode_payloads(vec![payload.clone()])?;
        self.unmarshal(&decoded.remove(0))
    }

    /// Serialize any serde value into a payload.
    pub fn to_payload<T: Serialize + ?Sized>(&self, value: &T) -> Result<Payload, ConverterError> {
        self.to_payload_value(&PayloadValue::from_serialize(value)?)
    }

    /// Deserialize a payload into a concrete type.
    pub fn from_payload<T: DeserializeOwned>(&self, payload: &Payload) -> Result<T, ConverterError> {
        self.from_payload_value(payload)?.into_typed()
    }

    /// Convert an ordered value sequence into payloads.
    pub fn to_payloads(&self, values: &[PayloadValue]) -> Result<Payloads, ConverterError> {
        let marshalled = values
            .iter()
            .map(|v| self.marshal(v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Payloads {
            payloads: self.encode_payloads(marshalled)?,
        })
    }

    /// Convert payloads back into the value sequence.
    pub fn from_payloads(&self, payloads: &Payloads) -> Result<Vec<PayloadValue>, ConverterError> {
        let decoded = self.decode_payloads(payloads.payloads.clone())?;
        decoded.iter().map(|p| self.unmarshal(p)).collect()
    }

    /// Deserialize the payload at `index` into a concrete type.
    /// Out-of-range indexes are a size mismatch.
    pub fn from_payloads_at<T: DeserializeOwned>(
        &self,
        payloads: &Payloads,
        index: usize,
    ) -> Result<T, ConverterError> {
        if index >= payloads.payloads.len() {
            return Err(ConverterError::SizeMismatch {
                requested: index + 1,
                actual: payloads.payloads.len(),
            });
        }
        let decoded = self.decode_payloads(vec![payloads.payloads[index].clone()])?;
        self.unmarshal(&decoded[0])?.into_typed()
    }
}

// ============================================================================
// EncodedValues
// ============================================================================

/// Lazily-decoded payload sequence, used for error details and heartbeat
/// details. Holds the converter it was produced with so values decode the
/// same way they were encoded.
#[derive(Clone)]
pub struct EncodedValues {
    payloads: Option<Payloads>,
    converter: DataConverter,
}

impl EncodedValues {
    /// Wrap already-encoded payloads.
    pub fn from_payloads(payloads: Option<Payloads>, converter: DataConverter) -> Self {
        Self {
            payloads,
            converter,
        }
    }

    /// Encode a value sequence eagerly.
    pub fn from_values(
        values: &[PayloadValue],
        converter: &DataConverter,
    ) -> Result<Self, ConverterError> {
        let payloads = if values.is_empty() {
            None
        } else {
            Some(converter.to_payloads(values)?)
        };
        Ok(Self {
            payloads,
            converter: converter.clone(),
        })
    }

    pub fn empty(converter: DataConverter) -> Self {
        Self {
            payloads: None,
            converter,
        }
    }

    pub fn has_values(&self) -> bool {
        self.payloads
            .as_ref()
            .map(|p| !p.payloads.is_empty())
            .unwrap_or(false)
    }

    /// Decode the value at `index`. Missing payloads are [`ConverterError::NoData`],
    /// an out-of-range index is a size mismatch.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T, ConverterError> {
        let payloads = self.payloads.as_ref().ok_or(ConverterError::NoData)?;
        if payloads.payloads.is_empty() {
            return Err(ConverterError::NoData);
        }
        self.converter.from_payloads_at(payloads, index)
    }

    /// The raw wire form, if any.
    pub fn payloads(&self) -> Option<&Payloads> {
        self.payloads.as_ref()
    }

    pub fn into_payloads(self) -> Option<Payloads> {
        self.payloads
    }
}

impl fmt::Debug for EncodedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedValues")
            .field(
                "len",
                &self.payloads.as_ref().map(|p| p.payloads.len()).unwrap_or(0),
            )
            .finish()
    }
}

impl PartialEq for EncodedValues {
    fn eq(&self, other: &Self) -> bool {
        self.payloads == other.payloads
    }
}
