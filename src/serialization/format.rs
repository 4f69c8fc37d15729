use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::{BaseError, Result};

/// Every blob starts with this magic, a version byte and the codec id.
pub(crate) const BLOB_MAGIC: &[u8; 4] = b"EBSR";
pub(crate) const BLOB_VERSION: u8 = 1;
const HEADER_LEN: usize = BLOB_MAGIC.len() + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SerializationFormat {
    #[default]
    MessagePack,
    Json,
}

impl SerializationFormat {
    pub const ALL: [SerializationFormat; 2] = [Self::MessagePack, Self::Json];

    pub fn name(self) -> &'static str {
        match self {
            Self::MessagePack => "msgpack",
            Self::Json => "json",
        }
    }

    /// Whether the codec was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Self::MessagePack => true,
            Self::Json => cfg!(feature = "json"),
        }
    }

    pub fn ensure_available(self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(BaseError::CodecUnavailable(
                self.name().to_string(),
                format!("enable the `{}` feature of estibase", self.name()),
            ))
        }
    }

    fn id(self) -> u8 {
        match self {
            Self::MessagePack => 0,
            Self::Json => 1,
        }
    }

    fn from_id(id: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.id() == id)
            .ok_or_else(|| BaseError::Serialization(format!("unknown codec id {id}")))
    }

    fn supported() -> String {
        Self::ALL
            .iter()
            .map(|format| format.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SerializationFormat {
    type Err = BaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "msgpack" | "messagepack" => Ok(Self::MessagePack),
            "json" => Ok(Self::Json),
            _ => Err(BaseError::UnsupportedSerializationFormat {
                format: s.to_string(),
                supported: Self::supported(),
            }),
        }
    }
}

pub(crate) fn encode<T: Serialize>(format: SerializationFormat, value: &T) -> Result<Vec<u8>> {
    let payload = match format {
        SerializationFormat::MessagePack => rmp_serde::to_vec_named(value)?,
        SerializationFormat::Json => encode_json(value)?,
    };
    let mut blob = Vec::with_capacity(HEADER_LEN + payload.len());
    blob.extend_from_slice(BLOB_MAGIC);
    blob.push(BLOB_VERSION);
    blob.push(format.id());
    blob.extend_from_slice(&payload);
    Ok(blob)
}

/// Reads the header to pick the codec, then decodes the payload.
pub(crate) fn decode<T: DeserializeOwned>(blob: &[u8]) -> Result<(SerializationFormat, T)> {
    if blob.len() < HEADER_LEN || &blob[..BLOB_MAGIC.len()] != BLOB_MAGIC {
        return Err(BaseError::Serialization(
            "not a serialized estibase object".to_string(),
        ));
    }
    let version = blob[BLOB_MAGIC.len()];
    if version != BLOB_VERSION {
        return Err(BaseError::Serialization(format!(
            "unsupported blob version {version}"
        )));
    }
    let format = SerializationFormat::from_id(blob[BLOB_MAGIC.len() + 1])?;
    format.ensure_available()?;
    let payload = &blob[HEADER_LEN..];
    let value = match format {
        SerializationFormat::MessagePack => rmp_serde::from_slice(payload)?,
        SerializationFormat::Json => decode_json(payload)?,
    };
    Ok((format, value))
}

#[cfg(feature = "json")]
fn encode_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

#[cfg(not(feature = "json"))]
fn encode_json<T: Serialize>(_value: &T) -> Result<Vec<u8>> {
    SerializationFormat::Json.ensure_available()?;
    Ok(Vec::new())
}

#[cfg(feature = "json")]
fn decode_json<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(payload)?)
}

#[cfg(not(feature = "json"))]
fn decode_json<T: DeserializeOwned>(_payload: &[u8]) -> Result<T> {
    SerializationFormat::Json.ensure_available()?;
    Err(BaseError::Serialization("json codec missing".to_string()))
}
