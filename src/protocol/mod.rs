//! Wire protocol between the host and an out-of-process release handler.
//!
//! One [`ReleaseRequest`] goes to the handler's stdin, one [`ReleaseResponse`]
//! comes back on its stdout. Diagnostics travel separately on stderr and are
//! attached to the response by the gateway as [`LogEntry`] values.

mod manifest;
mod request;
mod response;

pub use manifest::{CommandSpec, FlagKind, FlagSpec, Manifest};
pub use request::{ReleaseRequest, RequestContext, Scalar};
pub use response::{
    DataValue, LogEntry, LogLevel, ReleaseResponse, ResponseError, ResponseMetadata,
    ResponseStatus, Row,
};
