//! HTTP client for a remote conversational agent and its knowledge base.
//!
//! The agent is stateless: every call carries the full transcript. Its reply
//! envelope varies between agent configurations, which [`interpret_response`]
//! normalizes into plain text.
//!
//! # Example
//!
//! ```ignore
//! use colloquy_agent::{interpret_response, AgentClient, AgentRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AgentClient::with_base_url("http://localhost:3000");
//!     let request = AgentRequest::new("User: Hello!", "my-agent");
//!     let response = client.invoke(&request).await.unwrap();
//!     println!("{}", interpret_response(&response));
//! }
//! ```

mod backend;
mod client;
mod convert;
mod error;
mod types;

pub use backend::{AgentBackend, KnowledgeBase};
pub use client::{AgentClient, DEFAULT_BASE_URL};
pub use convert::{interpret_response, FALLBACK_REPLY};
pub use error::AgentError;
pub use types::{AgentRequest, AgentResponse, DeleteDocumentsRequest, UploadFile};
