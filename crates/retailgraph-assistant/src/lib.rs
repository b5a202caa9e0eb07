//! Natural-language assistant over the retail graph.
//!
//! The loop is deliberately small and auditable:
//!
//! 1. fetch the sampled graph schema,
//! 2. the model drafts a Cypher query (untrusted: it *proposes*, the
//!    engine executes),
//! 3. the draft passes a hard read-only guard before execution,
//! 4. the model summarizes the returned rows,
//! 5. optionally, the model emits a [`DashboardSpec`] payload for the HTML
//!    sink.
//!
//! The hosted multi-agent delegation of a full agent framework is out of
//! scope here; one provider plays both the query-builder and the analyst
//! role, which keeps the crate useful offline (tests script a
//! [`MockProvider`]) and provider-agnostic (any OpenAI-compatible
//! chat-completions endpoint works).
//!
//! [`DashboardSpec`]: retailgraph_dashboard::DashboardSpec

pub mod assistant;
pub mod prompts;
pub mod provider;

pub use assistant::{
    answer_question, build_dashboard_spec, sanitize_cypher, AssistantError, AssistantReply,
};
pub use provider::{ChatProvider, HttpProvider, MockProvider, ProviderConfig, ProviderError};
