//! The question-answering loop and its guardrails.

use retailgraph_dashboard::DashboardSpec;
use retailgraph_store::tools::{get_graph_schema, run_cypher_query};
use retailgraph_store::GraphStore;

use crate::prompts;
use crate::provider::{ChatProvider, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("model produced no query")]
    EmptyDraft,
    #[error("refusing to execute generated Cypher containing {0:?} (read-only surface)")]
    UnsafeCypher(String),
}

/// The answer to one question, with its full audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub cypher: String,
    pub rows_json: String,
    pub summary: String,
}

/// Answer a natural-language question against the graph.
///
/// The provider drafts the Cypher; [`sanitize_cypher`] rejects anything
/// that could write; the store executes; the provider summarizes. Query
/// failures are not fatal; they come back as an error string in
/// `rows_json` for the summarizer to acknowledge, matching the read-tool
/// contract.
pub async fn answer_question(
    provider: &dyn ChatProvider,
    store: &GraphStore,
    question: &str,
) -> Result<AssistantReply, AssistantError> {
    let schema = get_graph_schema(store).await;

    let draft = provider
        .complete(
            prompts::CYPHER_SYSTEM_PROMPT,
            &prompts::cypher_user_prompt(&schema, question),
        )
        .await?;
    let cypher = sanitize_cypher(&draft)?;
    tracing::debug!(%cypher, "executing generated query");

    let rows_json = run_cypher_query(store, &cypher).await;

    let summary = provider
        .complete(
            prompts::SUMMARY_SYSTEM_PROMPT,
            &prompts::summary_user_prompt(question, &cypher, &rows_json),
        )
        .await?;

    Ok(AssistantReply {
        cypher,
        rows_json,
        summary,
    })
}

/// Ask the provider for a dashboard payload for `reply`.
///
/// Best-effort by design: if the model's JSON does not parse as a
/// [`DashboardSpec`], the dashboard degrades to a minimal one carrying the
/// summary, rather than failing an already-answered question.
pub async fn build_dashboard_spec(
    provider: &dyn ChatProvider,
    question: &str,
    reply: &AssistantReply,
) -> DashboardSpec {
    let response = provider
        .complete(
            prompts::DASHBOARD_SYSTEM_PROMPT,
            &prompts::dashboard_user_prompt(question, &reply.summary, &reply.rows_json),
        )
        .await;

    match response {
        Ok(text) => match serde_json::from_str::<DashboardSpec>(strip_code_fences(&text)) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!(error = %e, "dashboard payload did not parse; using fallback");
                fallback_spec(question, reply)
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "dashboard payload request failed; using fallback");
            fallback_spec(question, reply)
        }
    }
}

fn fallback_spec(question: &str, reply: &AssistantReply) -> DashboardSpec {
    DashboardSpec {
        title: "Retail Analytics".to_string(),
        subtitle: question.to_string(),
        notes: vec![reply.summary.clone()],
        ..DashboardSpec::default()
    }
}

/// Verbs/prefixes that would make a generated query mutate the graph.
/// The ingestion pipeline is the only write path; the assistant never is.
const WRITE_TOKENS: [&str; 9] = [
    "CREATE", "MERGE", "SET", "DELETE", "DETACH", "REMOVE", "DROP", "FOREACH", "CALL",
];

/// Strip code fences from the model's draft and enforce the read-only
/// contract. Keyword detection is token-based, so a property named
/// `dataset` does not trip the `SET` rule.
pub fn sanitize_cypher(draft: &str) -> Result<String, AssistantError> {
    let cypher = strip_code_fences(draft).trim().to_string();
    if cypher.is_empty() {
        return Err(AssistantError::EmptyDraft);
    }

    for token in cypher
        .to_ascii_uppercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
    {
        if WRITE_TOKENS.contains(&token) {
            return Err(AssistantError::UnsafeCypher(token.to_string()));
        }
    }
    Ok(cypher)
}

/// Remove a surrounding markdown code fence (with or without a language
/// tag) if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag line (e.g. ```cypher or ```json).
    match body.split_once('\n') {
        Some((first, remainder)) if !first.trim().contains(' ') => remainder.trim(),
        _ => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;

    #[test]
    fn sanitize_strips_fences_and_accepts_read_queries() {
        let draft = "```cypher\nMATCH (c:Customer)-[:MADE]->(t:Transaction)\nRETURN c.name, count(t) AS purchases ORDER BY purchases DESC LIMIT 5\n```";
        let cypher = sanitize_cypher(draft).expect("read-only query");
        assert!(cypher.starts_with("MATCH"));
        assert!(!cypher.contains("```"));
    }

    #[test]
    fn sanitize_rejects_write_verbs_but_not_lookalike_identifiers() {
        for bad in [
            "MERGE (c:Customer {name: 'x'}) RETURN c",
            "MATCH (n) SET n.category = 'y' RETURN n",
            "MATCH (n) DETACH DELETE n",
            "CALL db.labels()",
        ] {
            assert!(
                matches!(sanitize_cypher(bad), Err(AssistantError::UnsafeCypher(_))),
                "accepted: {bad}"
            );
        }
        // `dataset`/`reset` contain SET as a substring, not as a token.
        let ok = "MATCH (t:Transaction) WHERE t.dataset = 'x' RETURN t.reset LIMIT 1";
        assert!(sanitize_cypher(ok).is_ok());
    }

    #[test]
    fn sanitize_rejects_empty_drafts() {
        assert!(matches!(
            sanitize_cypher("```\n\n```"),
            Err(AssistantError::EmptyDraft)
        ));
    }

    #[tokio::test]
    async fn dashboard_spec_parses_model_json_and_falls_back_on_garbage() {
        let reply = AssistantReply {
            cypher: "MATCH (t:Transaction) RETURN count(t) AS n".to_string(),
            rows_json: r#"[{"n": 2500}]"#.to_string(),
            summary: "There are 2500 transactions.".to_string(),
        };

        let good = MockProvider::always(
            "```json\n{\"title\": \"Transactions\", \"kpis\": [{\"label\": \"Count\", \"value\": 2500}]}\n```",
        );
        let spec = build_dashboard_spec(&good, "how many transactions?", &reply).await;
        assert_eq!(spec.title, "Transactions");
        assert_eq!(spec.kpis.len(), 1);

        let garbage = MockProvider::always("I can't do JSON today.");
        let spec = build_dashboard_spec(&garbage, "how many transactions?", &reply).await;
        assert_eq!(spec.title, "Retail Analytics");
        assert_eq!(spec.notes, vec!["There are 2500 transactions.".to_string()]);
    }
}
