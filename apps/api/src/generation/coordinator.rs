//! Streaming Session Coordinator — one live generation request, from briefing
//! to parsed proposal.
//!
//! Flow: build prompt → open LLM stream → accumulate deltas (progress every
//! 15th) → final progress → extract → repair (only on a token-cap stop) →
//! strict parse → typed validation → one terminal event.
//!
//! Each session owns its accumulation buffer and chunk counter exclusively;
//! nothing is shared across requests and nothing is persisted. Dropping the
//! returned stream (caller disconnected) abandons the upstream call without
//! emitting further events.

use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::generation::extract::extract;
use crate::generation::prompts::build_analyze_prompt;
use crate::generation::repair::repair;
use crate::llm_client::{LlmClient, LlmError, StopReason, TextEvent};
use crate::models::proposal::{parse_proposal, Proposal, ProposalParseError};

/// Progress cadence in text increments — approximates "about once per second"
/// at typical model throughput. Count-based, not time-based.
const PROGRESS_EVERY: u64 = 15;

/// Fixed user-facing message when the model output is not valid JSON even
/// after extraction and repair.
pub const MALFORMED_OUTPUT_MSG: &str = "Claude gaf geen geldig JSON terug. Probeer opnieuw.";

/// Events observed by the caller of one generation session, in order:
/// zero or more `Progress`, then exactly one `Complete` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Progress { chunks: u64 },
    Complete { data: Proposal },
    Error { error: String },
}

/// Runs a full generation session for one briefing.
///
/// The system instruction is startup configuration, passed in by the caller —
/// this module never reads it from disk.
pub fn generate_proposal(
    llm: LlmClient,
    system_prompt: Arc<str>,
    briefing_text: String,
) -> impl Stream<Item = SessionEvent> + Send {
    stream! {
        let prompt = build_analyze_prompt(&briefing_text);
        let upstream = match llm.stream(&prompt, &system_prompt).await {
            Ok(upstream) => upstream,
            Err(e) => {
                warn!("upstream call failed before streaming: {e}");
                yield SessionEvent::Error { error: format!("API fout: {e}") };
                return;
            }
        };

        let session = run_session(upstream);
        tokio::pin!(session);
        while let Some(event) = session.next().await {
            yield event;
        }
    }
}

/// Consumes one upstream text-increment stream and yields session events.
///
/// Generic over the upstream so tests can drive it with a scripted sequence.
pub fn run_session<S>(upstream: S) -> impl Stream<Item = SessionEvent>
where
    S: Stream<Item = Result<TextEvent, LlmError>>,
{
    stream! {
        let mut accumulated = String::new();
        let mut chunks: u64 = 0;

        tokio::pin!(upstream);
        let stop_reason = loop {
            match upstream.next().await {
                Some(Ok(TextEvent::Delta(delta))) => {
                    accumulated.push_str(&delta);
                    chunks += 1;
                    if chunks % PROGRESS_EVERY == 0 {
                        yield SessionEvent::Progress { chunks };
                    }
                }
                Some(Ok(TextEvent::Stopped(reason))) => break reason,
                Some(Err(e)) => {
                    warn!("stream failed after {chunks} chunks: {e}");
                    yield SessionEvent::Error { error: format!("API fout: {e}") };
                    return;
                }
                // Upstream ended without a stop signal; the llm_client
                // normally converts this into an error item first.
                None => {
                    yield SessionEvent::Error {
                        error: "API fout: stream eindigde zonder stopconditie".to_string(),
                    };
                    return;
                }
            }
        };

        // Final progress with the terminal chunk count, before finalizing.
        yield SessionEvent::Progress { chunks };

        let was_truncated = stop_reason == StopReason::MaxTokens;
        if was_truncated {
            warn!("model output hit the token cap after {chunks} chunks; repairing");
        }

        let candidate = extract(&accumulated);
        let repaired = repair(candidate, was_truncated);

        match parse_proposal(&repaired) {
            Ok(proposal) => {
                info!("proposal parsed after {chunks} chunks (truncated: {was_truncated})");
                yield SessionEvent::Complete { data: proposal };
            }
            Err(ProposalParseError::Syntax(e)) => {
                warn!("model output is not valid JSON: {e}");
                yield SessionEvent::Error { error: MALFORMED_OUTPUT_MSG.to_string() };
            }
            Err(ProposalParseError::Schema(e)) => {
                warn!("model output failed schema validation: {e}");
                yield SessionEvent::Error {
                    error: format!("De offerte voldoet niet aan het verwachte schema: {e}"),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn delta(text: &str) -> Result<TextEvent, LlmError> {
        Ok(TextEvent::Delta(text.to_string()))
    }

    fn stopped(reason: StopReason) -> Result<TextEvent, LlmError> {
        Ok(TextEvent::Stopped(reason))
    }

    async fn collect(items: Vec<Result<TextEvent, LlmError>>) -> Vec<SessionEvent> {
        run_session(stream::iter(items)).collect().await
    }

    fn terminal(events: &[SessionEvent]) -> &SessionEvent {
        events.last().expect("session emitted no events")
    }

    #[tokio::test]
    async fn test_well_formed_output_round_trips() {
        let json = r#"{"meta": {"projectnaam": "Test"}, "deliverables": ["a", "b"]}"#;
        // Split the response across several deltas, as the API delivers it.
        let (head, tail) = json.split_at(20);
        let events = collect(vec![delta(head), delta(tail), stopped(StopReason::EndTurn)]).await;

        assert_eq!(events.len(), 2); // final progress + complete
        assert_eq!(events[0], SessionEvent::Progress { chunks: 2 });
        match terminal(&events) {
            SessionEvent::Complete { data } => {
                assert_eq!(
                    data.meta.as_ref().unwrap().projectnaam.as_deref(),
                    Some("Test")
                );
                assert_eq!(data.deliverables, vec!["a", "b"]);
            }
            other => panic!("expected complete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_truncated_mid_array_completes_after_repair() {
        let events = collect(vec![
            delta(r#"{"deliverables": ["a", "b"#),
            stopped(StopReason::MaxTokens),
        ])
        .await;

        match terminal(&events) {
            SessionEvent::Complete { data } => {
                assert_eq!(data.deliverables, vec!["a", "b"]);
            }
            other => panic!("expected complete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_truncation_is_not_repaired_on_a_normal_stop() {
        // Same broken payload, but the model claims a natural end — repair
        // must not run, so the parse fails with the malformed message.
        let events = collect(vec![
            delta(r#"{"deliverables": ["a", "b"#),
            stopped(StopReason::EndTurn),
        ])
        .await;

        assert_eq!(
            *terminal(&events),
            SessionEvent::Error {
                error: MALFORMED_OUTPUT_MSG.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_output_yields_distinguished_message() {
        let events = collect(vec![delta("not json at all"), stopped(StopReason::EndTurn)]).await;

        let errors: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Error { .. }))
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            *terminal(&events),
            SessionEvent::Error {
                error: MALFORMED_OUTPUT_MSG.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_not_reported_as_malformed_json() {
        let events = collect(vec![
            delta(r#"{"steekproef": {"totaal_completes": "veel"}}"#),
            stopped(StopReason::EndTurn),
        ])
        .await;

        match terminal(&events) {
            SessionEvent::Error { error } => {
                assert_ne!(error, MALFORMED_OUTPUT_MSG);
                assert!(error.contains("schema"), "unexpected message: {error}");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_progress_cadence_for_47_chunks() {
        // 46 whitespace deltas followed by the object: floor(47/15) = 3
        // mid-stream progress events, one final progress with chunks=47,
        // then the terminal event.
        let mut items: Vec<_> = (0..46).map(|_| delta(" ")).collect();
        items.push(delta("{}"));
        items.push(stopped(StopReason::EndTurn));

        let events = collect(items).await;

        let progress: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Progress { chunks } => Some(*chunks),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![15, 30, 45, 47]);
        assert!(matches!(terminal(&events), SessionEvent::Complete { .. }));
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn test_final_progress_may_repeat_a_cadence_hit() {
        // 15 deltas: the cadence event and the final event both say 15.
        let mut items: Vec<_> = (0..14).map(|_| delta(" ")).collect();
        items.push(delta("{}"));
        items.push(stopped(StopReason::EndTurn));

        let events = collect(items).await;
        let progress: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Progress { chunks } => Some(*chunks),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![15, 15]);
    }

    #[tokio::test]
    async fn test_transport_failure_mid_stream_is_an_api_error() {
        let events = collect(vec![
            delta("{\"meta\""),
            Err(LlmError::Stream("verbinding verbroken".to_string())),
        ])
        .await;

        assert_eq!(events.len(), 1);
        match terminal(&events) {
            SessionEvent::Error { error } => {
                assert!(error.starts_with("API fout:"), "unexpected: {error}");
                assert!(error.contains("verbinding verbroken"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fenced_output_is_extracted_before_parsing() {
        let events = collect(vec![
            delta("```json\n{\"management_summary\": \"Kort.\"}\n```"),
            stopped(StopReason::EndTurn),
        ])
        .await;

        match terminal(&events) {
            SessionEvent::Complete { data } => {
                assert_eq!(data.management_summary.as_deref(), Some("Kort."));
            }
            other => panic!("expected complete, got {other:?}"),
        }
    }

    #[test]
    fn test_session_events_serialize_with_type_tags() {
        let progress = serde_json::to_value(SessionEvent::Progress { chunks: 30 }).unwrap();
        assert_eq!(progress["type"], "progress");
        assert_eq!(progress["chunks"], 30);

        let error = serde_json::to_value(SessionEvent::Error {
            error: "API fout: x".to_string(),
        })
        .unwrap();
        assert_eq!(error["type"], "error");

        let complete = serde_json::to_value(SessionEvent::Complete {
            data: Proposal::default(),
        })
        .unwrap();
        assert_eq!(complete["type"], "complete");
        assert!(complete["data"].is_object());
    }
}
