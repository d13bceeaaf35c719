//! Generation engine adapters.

mod azure_openai;
mod canned;
mod configured;
mod scripted;

pub use azure_openai::AzureOpenAiChatModel;
pub use canned::CannedReplyModel;
pub use configured::ConfiguredChatModel;
pub use scripted::ScriptedChatModel;
