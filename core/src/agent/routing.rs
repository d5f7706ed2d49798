//! Supervisor routing strategies
//!
//! Both strategies read the supervisor model's reply text and never fail:
//! anything they cannot interpret means [`RoutingDecision::Finish`].

use super::worker::WorkerKind;
use crate::config::RoutingStrategy;
use crate::util::strip_code_fence;
use serde::{Deserialize, Serialize};

/// The supervisor's single routing choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "agent", rename_all = "snake_case")]
pub enum RoutingDecision {
    Dispatch(WorkerKind),
    Finish,
}

/// Keyword sets checked in order; the first set with a hit wins
const KEYWORD_ROUTES: [(WorkerKind, &[&str]); 3] = [
    (WorkerKind::ScriptMaker, &["script", "story", "creative"]),
    (WorkerKind::BoxMaker, &["box", "container", "package"]),
    (WorkerKind::Research, &["research", "information", "data"]),
];

/// Route on keywords in the lowercased reply
pub fn keyword_route(reply: &str) -> RoutingDecision {
    let content = reply.to_lowercase();
    KEYWORD_ROUTES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| content.contains(k)))
        .map(|(kind, _)| RoutingDecision::Dispatch(*kind))
        .unwrap_or(RoutingDecision::Finish)
}

#[derive(Deserialize)]
struct StructuredRoute {
    next: Option<String>,
}

/// Route on the `next` field of a JSON reply
pub fn parse_structured(reply: &str) -> RoutingDecision {
    let route: StructuredRoute = match serde_json::from_str(strip_code_fence(reply)) {
        Ok(route) => route,
        Err(e) => {
            tracing::warn!("Could not parse supervisor routing reply: {}", e);
            return RoutingDecision::Finish;
        }
    };

    let Some(next) = route.next else {
        tracing::warn!("Supervisor routing reply has no `next` field");
        return RoutingDecision::Finish;
    };

    if next.trim().eq_ignore_ascii_case("finish") {
        return RoutingDecision::Finish;
    }

    match WorkerKind::from_name(&next) {
        Some(kind) => RoutingDecision::Dispatch(kind),
        None => {
            tracing::warn!("Supervisor routed to unknown worker {:?}", next);
            RoutingDecision::Finish
        }
    }
}

/// Apply the configured strategy
pub fn decide(strategy: RoutingStrategy, reply: &str) -> RoutingDecision {
    match strategy {
        RoutingStrategy::Keyword => keyword_route(reply),
        RoutingStrategy::Structured => parse_structured(reply),
    }
}
