//! Protocol module containing the wire types, the frame codec and the inbound
//! line splitter.

pub mod codec;
pub mod line_buffer;
pub mod messages;

pub use codec::{
    decode_command, decode_line, encode_command, is_ambiguous_scan_code, ProtocolError,
};
pub use line_buffer::LineSplitter;
pub use messages::*;
