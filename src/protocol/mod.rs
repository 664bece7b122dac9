//! Wire protocol between clients and satellite nodes.
//!
//! Every value is sent as one length-prefixed JSON frame. The request leg is
//! an [`Envelope`]; the response leg is the bare result value with no wrapper.

pub mod frame;
pub mod message;

pub use frame::{read_frame, read_value, write_frame, write_value};
pub use message::{Envelope, ErrorReply, MessageKind};
