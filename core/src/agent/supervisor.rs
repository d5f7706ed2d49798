//! Supervisor
//!
//! Makes one routing model call, dispatches to at most one worker, and
//! stops. Routing problems never raise; they simply end the run without a
//! dispatch.

use super::prompts::{self, SUPERVISOR_PROMPT, SUPERVISOR_STRUCTURED_PROMPT};
use super::reply::repair;
use super::routing::{decide, RoutingDecision};
use super::state::SupervisorState;
use super::worker::{with_timeout, WorkerAgent, WorkerKind};
use crate::config::{Config, RoutingStrategy, RunConfig};
use crate::error::{Result, RouterError};
use crate::llm::{ChatMessage, ChatRequest, ModelLoader, ProviderLoader};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Routes each request to one worker agent
pub struct Supervisor {
    routing: RoutingStrategy,
    default_model: String,
    model_timeout: Option<Duration>,
    loader: Arc<dyn ModelLoader>,
    script_maker: WorkerAgent,
    box_maker: WorkerAgent,
    research: WorkerAgent,
}

impl Supervisor {
    /// Build a supervisor and its workers talking to the configured providers
    pub fn new(config: &Config) -> Self {
        Self::with_loader(config, Arc::new(ProviderLoader::new(config.clone())))
    }

    /// Build a supervisor whose models all come from `loader`
    pub fn with_loader(config: &Config, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            routing: config.routing,
            default_model: config.model.clone(),
            model_timeout: config.model_timeout_secs.map(Duration::from_secs),
            script_maker: WorkerAgent::new(WorkerKind::ScriptMaker, config, loader.clone()),
            box_maker: WorkerAgent::new(WorkerKind::BoxMaker, config, loader.clone()),
            research: WorkerAgent::new(WorkerKind::Research, config, loader.clone()),
            loader,
        }
    }

    /// Replace the worker of the same kind
    pub fn with_worker(mut self, worker: WorkerAgent) -> Self {
        match worker.kind() {
            WorkerKind::ScriptMaker => self.script_maker = worker,
            WorkerKind::BoxMaker => self.box_maker = worker,
            WorkerKind::Research => self.research = worker,
        }
        self
    }

    pub fn routing(&self) -> RoutingStrategy {
        self.routing
    }

    pub fn worker(&self, kind: WorkerKind) -> &WorkerAgent {
        match kind {
            WorkerKind::ScriptMaker => &self.script_maker,
            WorkerKind::BoxMaker => &self.box_maker,
            WorkerKind::Research => &self.research,
        }
    }

    /// Route `messages` and run the chosen worker
    pub async fn invoke(&self, messages: Vec<ChatMessage>, run: &RunConfig) -> Result<SupervisorState> {
        self.invoke_state(SupervisorState::new(messages), run).await
    }

    /// Like [`Supervisor::invoke`], keeping the caller's bookkeeping
    pub async fn invoke_state(&self, mut state: SupervisorState, run: &RunConfig) -> Result<SupervisorState> {
        let trace_id = state.metadata.trace_id;
        tracing::debug!(%trace_id, routing = %self.routing, messages = state.messages.len(), "supervisor started");

        let reply = match self.call_supervisor(&state, run).await {
            Ok(reply) => reply,
            Err(e) if e.is_config_error() => return Err(e),
            Err(e) => {
                tracing::warn!(%trace_id, "Supervisor model call failed, ending without a route: {}", e);
                return Ok(state);
            }
        };

        let decision = decide(self.routing, &reply.content);
        state.metadata.routing_reply = Some(reply.content.clone());
        state.metadata.decision = Some(decision);
        state.messages.push(reply);

        let kind = match decision {
            RoutingDecision::Dispatch(kind) => kind,
            RoutingDecision::Finish => {
                tracing::info!(%trace_id, "No worker selected");
                return Ok(state);
            }
        };

        if state.is_last_step {
            tracing::warn!(%trace_id, agent = %kind, "Last step reached, not dispatching");
            return Ok(state);
        }

        let Some(trigger) = state.last_user_message().cloned() else {
            tracing::warn!(%trace_id, agent = %kind, "No user message to hand to the worker");
            return Ok(state);
        };

        tracing::info!(%trace_id, agent = %kind, "Dispatching request");
        let worker_state = self.worker(kind).invoke(vec![trigger], run).await?;

        let final_message = worker_state
            .messages
            .last()
            .cloned()
            .ok_or_else(|| RouterError::MalformedResponse {
                message: format!("{} returned an empty history", kind),
            })?;
        let artifact = repair(&final_message.content, kind.result_field()).to_value();
        state.record_dispatch(kind, final_message, artifact);

        tracing::info!(%trace_id, agent = %kind, "Worker finished");
        Ok(state)
    }

    async fn call_supervisor(&self, state: &SupervisorState, run: &RunConfig) -> Result<ChatMessage> {
        let model_name = run.resolve_model(&self.default_model);
        let model = self.loader.load(&model_name)?;

        let template = match self.routing {
            RoutingStrategy::Keyword => SUPERVISOR_PROMPT,
            RoutingStrategy::Structured => SUPERVISOR_STRUCTURED_PROMPT,
        };
        let request = ChatRequest::new(state.messages.clone())
            .with_system_prompt(prompts::render(template, Utc::now()));

        tracing::debug!(model = %model_name, "calling supervisor model");
        let reply = with_timeout(self.model_timeout, "supervisor model call", model.generate(&request)).await?;

        Ok(reply.with_name("supervisor"))
    }
}
