//! Byte-level payload codecs.

use crate::api::common::Payload;
use crate::converter::payload::{ENCODING_ZLIB, METADATA_ENCODING};
use crate::converter::ConverterError;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use prost::Message;
use std::io::{Read, Write};

/// Transforms raw payloads after marshalling / before unmarshalling.
/// Implementations must be inverses of each other and idempotent on
/// already-encoded payloads.
pub trait PayloadCodec: Send + Sync {
    fn encode(&self, payloads: Vec<Payload>) -> Result<Vec<Payload>, ConverterError>;
    fn decode(&self, payloads: Vec<Payload>) -> Result<Vec<Payload>, ConverterError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibCodecOptions {
    /// Compress even when the result is not smaller than the input.
    pub always_encode: bool,
}

/// Wraps each payload in a zlib-compressed envelope tagged `binary/zlib`.
/// The envelope data is the compressed wire form of the original payload, so
/// decoding restores metadata and data exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibCodec {
    options: ZlibCodecOptions,
}

impl ZlibCodec {
    pub fn new(options: ZlibCodecOptions) -> Self {
        Self { options }
    }

    fn is_encoded(payload: &Payload) -> bool {
        payload
            .metadata
            .get(METADATA_ENCODING)
            .map(|e| e.as_slice() == ENCODING_ZLIB.as_bytes())
            .unwrap_or(false)
    }
}

impl PayloadCodec for ZlibCodec {
    fn encode(&self, payloads: Vec<Payload>) -> Result<Vec<Payload>, ConverterError> {
        payloads
            .into_iter()
            .map(|payload| {
                if Self::is_encoded(&payload) {
                    return Ok(payload);
                }
                let plain = payload.encode_to_vec();
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder
                    .write_all(&plain)
                    .and_then(|_| encoder.finish())
                    .map_err(|e| ConverterError::Malformed(format!("zlib encode: {e}")))
                    .map(|compressed| {
                        // Compressing tiny payloads usually grows them; keep
                        // the original unless forced.
                        if !self.options.always_encode && compressed.len() >= plain.len() {
                            return payload;
                        }
                        let mut metadata = std::collections::HashMap::new();
                        metadata.insert(
                            METADATA_ENCODING.to_string(),
                            ENCODING_ZLIB.as_bytes().to_vec(),
                        );
                        Payload {
                            metadata,
                            data: compressed,
                        }
                    })
            })
            .collect()
    }

    fn decode(&self, payloads: Vec<Payload>) -> Result<Vec<Payload>, ConverterError> {
        payloads
            .into_iter()
            .map(|payload| {
                if !Self::is_encoded(&payload) {
                    // Not ours; the payload skipped encoding or belongs to
                    // another codec.
                    return Ok(payload);
                }
                let mut plain = Vec::new();
                ZlibDecoder::new(payload.data.as_slice())
                    .read_to_end(&mut plain)
                    .map_err(|e| ConverterError::Malformed(format!("zlib decode: {e}")))?;
                Payload::decode(plain.as_slice())
                    .map_err(|e| ConverterError::Malformed(format!("zlib envelope: {e}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::payload::{DataConverter, ENCODING_JSON};
    use serde_json::json;
    use std::sync::Arc;

    fn zlib_always() -> ZlibCodec {
        ZlibCodec::new(ZlibCodecOptions {
            always_encode: true,
        })
    }

    #[test]
    fn test_zlib_round_trip() {
        let dc = DataConverter::default();
        let payloads = dc.to_payloads(&[json!("test").into()]).unwrap();
        let codec = zlib_always();

        let encoded = codec.encode(payloads.payloads.clone()).unwrap();
        assert_eq!(
            encoded[0].metadata.get(METADATA_ENCODING).unwrap(),
            ENCODING_ZLIB.as_bytes()
        );

        let decoded = codec.decode(encoded).unwrap();
        assert_eq!(decoded, payloads.payloads);
        assert_eq!(
            decoded[0].metadata.get(METADATA_ENCODING).unwrap(),
            ENCODING_JSON.as_bytes()
        );
    }

    #[test]
    fn test_zlib_skips_small_payloads_by_default() {
        let dc = DataConverter::default();
        let payloads = dc.to_payloads(&[json!("x").into()]).unwrap();
        let codec = ZlibCodec::default();

        let encoded = codec.encode(payloads.payloads.clone()).unwrap();
        // Too small to shrink; passed through unchanged.
        assert_eq!(encoded, payloads.payloads);
    }

    #[test]
    fn test_zlib_compresses_large_payloads_by_default() {
        let dc = DataConverter::default();
        let large = "abc".repeat(2000);
        let payloads = dc.to_payloads(&[json!(large).into()]).unwrap();
        let codec = ZlibCodec::default();

        let encoded = codec.encode(payloads.payloads.clone()).unwrap();
        assert_eq!(
            encoded[0].metadata.get(METADATA_ENCODING).unwrap(),
            ENCODING_ZLIB.as_bytes()
        );
        assert!(encoded[0].data.len() < payloads.payloads[0].data.len());

        let decoded = codec.decode(encoded).unwrap();
        assert_eq!(decoded, payloads.payloads);
    }

    #[test]
    fn test_zlib_encode_is_idempotent() {
        let dc = DataConverter::default();
        let payloads = dc.to_payloads(&[json!("test").into()]).unwrap();
        let codec = zlib_always();

        let once = codec.encode(payloads.payloads).unwrap();
        let twice = codec.encode(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_zlib_decode_passes_through_unencoded() {
        let dc = DataConverter::default();
        let payloads = dc.to_payloads(&[json!("test").into()]).unwrap();
        let codec = zlib_always();

        let decoded = codec.decode(payloads.payloads.clone()).unwrap();
        assert_eq!(decoded, payloads.payloads);
    }

    #[test]
    fn test_zlib_decode_corrupt_is_malformed() {
        let codec = zlib_always();
        let mut payload = Payload::default();
        payload.metadata.insert(
            METADATA_ENCODING.to_string(),
            ENCODING_ZLIB.as_bytes().to_vec(),
        );
        payload.data = vec![0xde, 0xad, 0xbe, 0xef];
        let err = codec.decode(vec![payload]).unwrap_err();
        assert!(matches!(err, ConverterError::Malformed(_)));
    }

    #[test]
    fn test_codec_data_converter_round_trip() {
        let dc = DataConverter::with_codecs(vec![Arc::new(zlib_always())]);
        let payloads = dc
            .to_payloads(&[json!("test").into(), json!(42).into()])
            .unwrap();
        for p in &payloads.payloads {
            assert_eq!(
                p.metadata.get(METADATA_ENCODING).unwrap(),
                ENCODING_ZLIB.as_bytes()
            );
        }

        let values = dc.from_payloads(&payloads).unwrap();
        assert_eq!(values[0], json!("test").into());
        assert_eq!(values[1], json!(42).into());
    }
}
