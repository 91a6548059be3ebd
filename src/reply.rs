mod bulk;
mod error;
mod status;

pub use bulk::BulkReply;
pub use error::ReplyError;
pub use status::StatusReply;

use crate::{client::ClientId, command::Arity, config::YesNo, db::ValueError};
use bytes::Bytes;
use ordered_float::NotNan;
use respite::RespError;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum Reply {
    Array(usize),
    Bignum(Bytes),
    Boolean(bool),
    Bulk(BulkReply),
    DeferredArray(oneshot::Receiver<usize>),
    DeferredMap(oneshot::Receiver<usize>),
    DeferredSet(oneshot::Receiver<usize>),
    Double(f64),
    Error(ReplyError),
    Integer(i64),
    Map(usize),
    Nil,
    Push(usize),
    Set(usize),
    Status(StatusReply),
    Verbatim(Bytes, BulkReply),
}

impl From<i32> for Reply {
    fn from(value: i32) -> Self {
        Reply::Integer(value.into())
    }
}

impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Reply::Integer(value)
    }
}

impl From<usize> for Reply {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(value) => Reply::Integer(value),
            Err(_) => ReplyError::InvalidUsize.into(),
        }
    }
}

impl From<ClientId> for Reply {
    fn from(value: ClientId) -> Self {
        Reply::Integer(value.0)
    }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Reply::Nil,
        }
    }
}

impl From<RespError> for Reply {
    fn from(error: RespError) -> Self {
        Reply::Error(ReplyError::Resp(error))
    }
}

impl<const N: usize> From<&'static [u8; N]> for Reply {
    fn from(value: &'static [u8; N]) -> Self {
        Reply::Bulk(value.into())
    }
}

impl From<&'static str> for Reply {
    fn from(value: &'static str) -> Self {
        Reply::Status(value.into())
    }
}

impl From<Bytes> for Reply {
    fn from(value: Bytes) -> Self {
        Reply::Bulk(BulkReply::Bytes(value))
    }
}

impl From<&Bytes> for Reply {
    fn from(value: &Bytes) -> Self {
        Reply::Bulk(BulkReply::Bytes(value.clone()))
    }
}

impl From<ReplyError> for Reply {
    fn from(error: ReplyError) -> Self {
        Reply::Error(error)
    }
}

impl From<ValueError> for Reply {
    fn from(error: ValueError) -> Self {
        use ValueError::*;
        match error {
            WrongType => ReplyError::WrongType.into(),
        }
    }
}

impl From<bool> for Reply {
    fn from(value: bool) -> Self {
        Reply::Boolean(value)
    }
}

impl From<f64> for Reply {
    fn from(value: f64) -> Self {
        Reply::Double(value)
    }
}

impl From<&NotNan<f64>> for Reply {
    fn from(value: &NotNan<f64>) -> Self {
        Reply::Double(**value)
    }
}

impl From<&Arity> for Reply {
    fn from(arity: &Arity) -> Self {
        use Arity::*;
        Reply::Integer(match arity {
            Exact(arity) => (*arity).into(),
            Minimum(arity) => {
                let arity: i64 = (*arity).into();
                -arity
            }
        })
    }
}

impl From<BulkReply> for Reply {
    fn from(bulk: BulkReply) -> Self {
        Reply::Bulk(bulk)
    }
}

impl From<YesNo> for Reply {
    fn from(value: YesNo) -> Self {
        Reply::Bulk(if value.0 { "yes" } else { "no" }.into())
    }
}
