//! Streamable-HTTP adapters for real tool-provider servers.

mod probe;
mod rpc;
mod session;

pub use probe::{HttpHealthProbe, candidate_urls};
pub use rpc::{RpcError, RpcRequest, RpcResponse, decode_response};
pub use session::{
    PROTOCOL_VERSION, SESSION_ID_HEADER, StreamableHttpConnector, StreamableHttpSession,
};
