use bytes::Bytes;
use respite::RespVersion;

#[derive(Debug)]
pub enum BulkReply {
    Bytes(Bytes),
}

impl BulkReply {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            BulkReply::Bytes(value) => &value[..],
        }
    }
}

impl From<&'static str> for BulkReply {
    fn from(value: &'static str) -> Self {
        BulkReply::Bytes(value.into())
    }
}

impl From<Bytes> for BulkReply {
    fn from(value: Bytes) -> Self {
        BulkReply::Bytes(value)
    }
}

impl<const N: usize> From<&'static [u8; N]> for BulkReply {
    fn from(value: &'static [u8; N]) -> Self {
        BulkReply::Bytes(Bytes::from_static(value))
    }
}

impl From<&[u8]> for BulkReply {
    fn from(value: &[u8]) -> Self {
        BulkReply::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<Vec<u8>> for BulkReply {
    fn from(value: Vec<u8>) -> Self {
        BulkReply::Bytes(value.into())
    }
}

impl From<f64> for BulkReply {
    fn from(value: f64) -> Self {
        BulkReply::Bytes(Bytes::from(format!("{value}")))
    }
}

impl From<i64> for BulkReply {
    fn from(value: i64) -> Self {
        BulkReply::Bytes(Bytes::from(value.to_string()))
    }
}

impl From<RespVersion> for BulkReply {
    fn from(value: RespVersion) -> Self {
        use RespVersion::*;
        let value = match value {
            V2 => 2i64,
            V3 => 3i64,
        };
        BulkReply::Bytes(Bytes::from(value.to_string()))
    }
}
