//! Integration Tests for the supervisor and workers
//!
//! These tests drive whole invocations with scripted models and tools.

#[cfg(test)]
mod tests {
    use crate::agent::{
        tool::{Tool, ToolRegistry},
        RoutingDecision, Supervisor, SupervisorState, WorkerAgent, WorkerKind, WorkerSettings,
    };
    use crate::config::{Config, RoutingStrategy, RunConfig};
    use crate::error::{Result, RouterError};
    use crate::llm::{ChatMessage, ChatModel, ChatRequest, MessageRole, ModelLoader, ModelSpec, ToolCall};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// One scripted model turn
    enum Turn {
        Reply(ChatMessage),
        Fail,
    }

    fn text(content: &str) -> Turn {
        Turn::Reply(ChatMessage::assistant(content))
    }

    fn tools(calls: &[(&str, &str, Value)]) -> Turn {
        Turn::Reply(ChatMessage::assistant_with_tools(
            "",
            calls
                .iter()
                .map(|(id, name, args)| ToolCall::new(*id, *name, args.clone()))
                .collect(),
        ))
    }

    /// Mock model that plays back a script and records every request
    struct ScriptedModel {
        script: Mutex<VecDeque<Turn>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedModel {
        fn new(turns: Vec<Turn>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(turns.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> ChatRequest {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn generate(&self, request: &ChatRequest) -> Result<ChatMessage> {
            self.requests.lock().unwrap().push(request.clone());
            let turn = self.script.lock().unwrap().pop_front();
            match turn {
                Some(Turn::Reply(message)) => Ok(message),
                Some(Turn::Fail) => Err(RouterError::Provider {
                    status: 529,
                    message: "overloaded".to_string(),
                }),
                None => Ok(ChatMessage::assistant("No more responses")),
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    /// Loader validating model strings like the real one, then handing out the mock
    struct ScriptedLoader {
        model: Arc<ScriptedModel>,
        loaded: Mutex<Vec<String>>,
    }

    impl ScriptedLoader {
        fn new(model: Arc<ScriptedModel>) -> Arc<Self> {
            Arc::new(Self {
                model,
                loaded: Mutex::new(Vec::new()),
            })
        }

        fn loaded(&self) -> Vec<String> {
            self.loaded.lock().unwrap().clone()
        }
    }

    impl ModelLoader for ScriptedLoader {
        fn load(&self, model: &str) -> Result<Arc<dyn ChatModel>> {
            ModelSpec::parse(model)?;
            self.loaded.lock().unwrap().push(model.to_string());
            Ok(self.model.clone())
        }
    }

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "Echo the arguments"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object"})
        }
        async fn call(&self, args: Value) -> Result<Value> {
            Ok(json!({"echo": args}))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "flaky"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object"})
        }
        async fn call(&self, _args: Value) -> Result<Value> {
            Err(RouterError::ToolExecutionFailed {
                tool_name: "flaky".to_string(),
                error: "service unavailable".to_string(),
            })
        }
    }

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }
        fn description(&self) -> &str {
            "Never finishes in time"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object"})
        }
        async fn call(&self, _args: Value) -> Result<Value> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Value::Null)
        }
    }

    fn settings() -> WorkerSettings {
        WorkerSettings {
            default_model: "anthropic/claude-3-5-sonnet-20240620".to_string(),
            recursion_limit: 25,
            model_timeout: None,
            tool_timeout: None,
            require_script_details: false,
        }
    }

    fn research_worker(model: Arc<ScriptedModel>, settings: WorkerSettings) -> WorkerAgent {
        let registry = ToolRegistry::new()
            .with_tool(Arc::new(EchoTool("search")))
            .with_tool(Arc::new(EchoTool("summarize")))
            .with_tool(Arc::new(FailingTool))
            .with_tool(Arc::new(SlowTool));
        WorkerAgent::with_tools(WorkerKind::Research, registry, ScriptedLoader::new(model), settings)
    }

    fn parse_final(state_messages: &[ChatMessage]) -> Value {
        serde_json::from_str(&state_messages.last().unwrap().content).unwrap()
    }

    // =========================================================================
    // Worker loop
    // =========================================================================

    #[tokio::test]
    async fn test_worker_without_tools_calls_model_once() {
        let model = ScriptedModel::new(vec![text("The history of AI began in 1956.")]);
        let worker = research_worker(model.clone(), settings());

        let state = worker
            .invoke(vec![ChatMessage::user("history of AI")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(model.calls(), 1);
        assert_eq!(state.messages.len(), 2);
        let last = state.messages.last().unwrap();
        assert_eq!(last.role, MessageRole::Assistant);
        assert!(!last.has_tool_calls());
        assert_eq!(parse_final(&state.messages)["final_report"], "The history of AI began in 1956.");
    }

    #[tokio::test]
    async fn test_model_request_carries_prompt_history_and_tools() {
        let model = ScriptedModel::new(vec![text("done")]);
        let worker = research_worker(model.clone(), settings());

        worker
            .invoke(vec![ChatMessage::user("history of AI")], &RunConfig::new())
            .await
            .unwrap();

        let request = model.request(0);
        assert!(request.system.starts_with("You are Research Assistant"));
        assert!(!request.system.contains("{system_time}"));
        assert_eq!(request.messages, vec![ChatMessage::user("history of AI")]);
        let names: Vec<_> = request.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["search", "summarize", "flaky", "slow"]);
    }

    #[tokio::test]
    async fn test_tool_results_appended_in_request_order() {
        let model = ScriptedModel::new(vec![
            tools(&[
                ("call_1", "search", json!({"query": "turing"})),
                ("call_2", "summarize", json!({"text": "long"})),
                ("call_3", "search", json!({"query": "dartmouth"})),
            ]),
            text("report"),
        ]);
        let worker = research_worker(model.clone(), settings());

        let state = worker
            .invoke(vec![ChatMessage::user("history of AI")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(model.calls(), 2);
        // user, tool request, 3 results, final
        assert_eq!(state.messages.len(), 6);
        let results: Vec<_> = state.messages[2..5]
            .iter()
            .map(|m| (m.role, m.tool_call_id.clone().unwrap()))
            .collect();
        assert_eq!(
            results,
            vec![
                (MessageRole::Tool, "call_1".to_string()),
                (MessageRole::Tool, "call_2".to_string()),
                (MessageRole::Tool, "call_3".to_string()),
            ]
        );
        assert_eq!(
            state.messages[2].content,
            r#"Tool search returned: {"echo":{"query":"turing"}}"#
        );

        // All results were visible to the second model call
        assert_eq!(model.request(1).messages.len(), 5);
    }

    #[tokio::test]
    async fn test_failing_tool_is_contained() {
        let model = ScriptedModel::new(vec![
            tools(&[("call_1", "flaky", json!({}))]),
            text("Could not reach the service."),
        ]);
        let worker = research_worker(model.clone(), settings());

        let state = worker
            .invoke(vec![ChatMessage::user("anything")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(state.messages[2].content, "Error executing tool flaky: service unavailable");
        assert_eq!(state.messages[2].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_error_message() {
        let model = ScriptedModel::new(vec![
            tools(&[("call_1", "crawl", json!({"url": "https://example.com"}))]),
            text("done"),
        ]);
        let worker = research_worker(model.clone(), settings());

        let state = worker
            .invoke(vec![ChatMessage::user("anything")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(state.messages[2].content, "Error executing tool crawl: tool not found");
    }

    #[tokio::test]
    async fn test_tool_timeout_is_contained() {
        let model = ScriptedModel::new(vec![tools(&[("call_1", "slow", json!({}))]), text("done")]);
        let worker = research_worker(
            model.clone(),
            WorkerSettings {
                tool_timeout: Some(Duration::from_millis(20)),
                ..settings()
            },
        );

        let state = worker
            .invoke(vec![ChatMessage::user("anything")], &RunConfig::new())
            .await
            .unwrap();

        assert!(state.messages[2].content.starts_with("Error executing tool slow: tool slow timed out"));
    }

    #[tokio::test]
    async fn test_step_limit() {
        let model = ScriptedModel::new(
            (0..5)
                .map(|i| {
                    Turn::Reply(ChatMessage::assistant_with_tools(
                        "",
                        vec![ToolCall::new(format!("call_{}", i), "search", json!({}))],
                    ))
                })
                .collect(),
        );
        let worker = research_worker(
            model.clone(),
            WorkerSettings {
                recursion_limit: 3,
                ..settings()
            },
        );

        let err = worker
            .invoke(vec![ChatMessage::user("loop forever")], &RunConfig::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::StepLimit { limit: 3, .. }));
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_worker_model_failure_propagates() {
        let model = ScriptedModel::new(vec![Turn::Fail]);
        let worker = research_worker(model, settings());

        let err = worker
            .invoke(vec![ChatMessage::user("anything")], &RunConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Provider { status: 529, .. }));
    }

    #[tokio::test]
    async fn test_execute_tools_is_noop_without_requests() {
        let worker = research_worker(ScriptedModel::new(Vec::new()), settings());
        let mut state = crate::agent::AgentState::default();
        worker.execute_tools(&mut state).await;
        assert!(state.messages.is_empty());

        let mut state = crate::agent::AgentState::new(vec![ChatMessage::assistant("plain")]);
        worker.execute_tools(&mut state).await;
        assert_eq!(state.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_box_maker_uses_material_calculator() {
        let model = ScriptedModel::new(vec![
            tools(&[(
                "toolu_1",
                "calculate_material",
                json!({"length": 30, "width": 20, "height": 15}),
            )]),
            text(r#"{"chain_of_thought": "sized", "final_design": "Two sheets of cardboard"}"#),
        ]);
        let worker = WorkerAgent::new(WorkerKind::BoxMaker, &Config::default(), ScriptedLoader::new(model));

        let state = worker
            .invoke(vec![ChatMessage::user("design a 30x20x15 box")], &RunConfig::new())
            .await
            .unwrap();

        let tool_message = &state.messages[2];
        assert!(tool_message.content.starts_with("Tool calculate_material returned: "));
        let payload: Value = serde_json::from_str(
            tool_message.content.trim_start_matches("Tool calculate_material returned: "),
        )
        .unwrap();
        let surface = payload["surface_area_cm2"].as_f64().unwrap();
        let total = payload["total_material_needed_cm2"].as_f64().unwrap();
        assert!((surface - 2700.0).abs() < 1e-9);
        assert!((total - 2970.0).abs() < 1e-9);
        assert_eq!(parse_final(&state.messages)["final_design"], "Two sheets of cardboard");
    }

    // =========================================================================
    // Script detail gate
    // =========================================================================

    fn script_worker(model: Arc<ScriptedModel>, require_details: bool) -> WorkerAgent {
        WorkerAgent::with_tools(
            WorkerKind::ScriptMaker,
            ToolRegistry::new(),
            ScriptedLoader::new(model),
            WorkerSettings {
                require_script_details: require_details,
                ..settings()
            },
        )
    }

    #[tokio::test]
    async fn test_detail_gate_asks_when_nothing_given() {
        let model = ScriptedModel::new(vec![text("should not be used")]);
        let worker = script_worker(model.clone(), true);

        let state = worker
            .invoke(vec![ChatMessage::user("write me something")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(model.calls(), 0);
        let reply = parse_final(&state.messages);
        assert!(reply["final_script"]
            .as_str()
            .unwrap()
            .starts_with("Before proceeding, I need more details about: environment, tone, setting"));
    }

    #[tokio::test]
    async fn test_detail_gate_passes_with_any_detail() {
        let model = ScriptedModel::new(vec![text("A script")]);
        let worker = script_worker(model.clone(), true);

        worker
            .invoke(vec![ChatMessage::user("Make the Tone playful")], &RunConfig::new())
            .await
            .unwrap();
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_detail_gate_off_by_default() {
        let model = ScriptedModel::new(vec![text("A script")]);
        let worker = script_worker(model.clone(), false);

        worker
            .invoke(vec![ChatMessage::user("write me something")], &RunConfig::new())
            .await
            .unwrap();
        assert_eq!(model.calls(), 1);
    }

    // =========================================================================
    // Supervisor
    // =========================================================================

    fn supervisor(model: Arc<ScriptedModel>, routing: RoutingStrategy) -> (Supervisor, Arc<ScriptedLoader>) {
        let config = Config {
            routing,
            ..Config::default()
        };
        let loader = ScriptedLoader::new(model);
        (Supervisor::with_loader(&config, loader.clone()), loader)
    }

    #[tokio::test]
    async fn test_keyword_story_routes_to_script_maker() {
        let model = ScriptedModel::new(vec![
            text("This calls for a creative story."),
            text(r#"{"chain_of_thought": "plan", "final_script": "INT. CAFE - NIGHT"}"#),
        ]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Keyword);

        let state = supervisor
            .invoke(vec![ChatMessage::user("Tell me something nice")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(state.current_agent, Some(WorkerKind::ScriptMaker));
        assert_eq!(state.completed_agents, vec![WorkerKind::ScriptMaker]);
        assert_eq!(state.metadata.decision, Some(RoutingDecision::Dispatch(WorkerKind::ScriptMaker)));
        assert_eq!(state.artifacts.len(), 1);
        assert_eq!(state.artifacts[0].reply["final_script"], "INT. CAFE - NIGHT");
        assert_eq!(state.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_structured_finish_leaves_history_unchanged() {
        let model = ScriptedModel::new(vec![text(r#"{"next": "FINISH"}"#)]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Structured);
        let request = vec![ChatMessage::user("Thanks, that's all")];

        let state = supervisor.invoke(request.clone(), &RunConfig::new()).await.unwrap();

        assert_eq!(state.current_agent, None);
        assert!(state.completed_agents.is_empty());
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0], request[0]);
        assert_eq!(state.messages[1].content, r#"{"next": "FINISH"}"#);
        assert_eq!(model.calls(), 1);
        assert!(model.request(0).system.contains(r#"{"next":"#));
    }

    #[tokio::test]
    async fn test_structured_route_dispatches() {
        let model = ScriptedModel::new(vec![
            text(r#"{"next": "research_agent"}"#),
            text("Findings"),
        ]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Structured);

        let state = supervisor
            .invoke(vec![ChatMessage::user("Who coined the term AI?")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(state.current_agent, Some(WorkerKind::Research));
        assert_eq!(parse_final(&state.messages)["final_report"], "Findings");
    }

    #[tokio::test]
    async fn test_romantic_script_end_to_end() {
        let model = ScriptedModel::new(vec![
            text("I'll route this to the Script Maker for a romantic script."),
            text("Scene one: candles flicker..."),
        ]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Keyword);
        let query = ChatMessage::user("I need a romantic script for date night");

        let state = supervisor.invoke(vec![query.clone()], &RunConfig::new()).await.unwrap();

        assert_eq!(model.calls(), 2);
        // The worker only sees the triggering request
        assert_eq!(model.request(1).messages, vec![query]);
        assert!(model.request(1).system.starts_with("You are Script Maker"));

        let reply = parse_final(&state.messages);
        let keys: Vec<_> = reply.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["chain_of_thought", "final_script"]);
        assert_eq!(reply["final_script"], "Scene one: candles flicker...");
        assert_eq!(state.current_agent, Some(WorkerKind::ScriptMaker));
    }

    #[tokio::test]
    async fn test_dispatch_uses_latest_user_message() {
        let model = ScriptedModel::new(vec![text("Sending to the box designer."), text("design")]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Keyword);

        supervisor
            .invoke(
                vec![
                    ChatMessage::user("hello"),
                    ChatMessage::assistant("Hi! What do you need?"),
                    ChatMessage::user("A gift box, 10x10x10"),
                ],
                &RunConfig::new(),
            )
            .await
            .unwrap();

        assert_eq!(model.request(0).messages.len(), 3);
        assert_eq!(model.request(1).messages, vec![ChatMessage::user("A gift box, 10x10x10")]);
    }

    #[tokio::test]
    async fn test_no_keyword_match_finishes() {
        let model = ScriptedModel::new(vec![text("Hello! How can I help you today?")]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Keyword);

        let state = supervisor
            .invoke(vec![ChatMessage::user("hi")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(state.current_agent, None);
        assert_eq!(state.metadata.decision, Some(RoutingDecision::Finish));
        assert_eq!(state.final_message().unwrap().content, "Hello! How can I help you today?");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_supervisor_model_failure_is_no_route() {
        let model = ScriptedModel::new(vec![Turn::Fail]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Keyword);
        let request = vec![ChatMessage::user("write a story")];

        let state = supervisor.invoke(request.clone(), &RunConfig::new()).await.unwrap();

        assert_eq!(state.messages, request);
        assert_eq!(state.current_agent, None);
        assert_eq!(state.metadata.routing_reply, None);
    }

    #[tokio::test]
    async fn test_last_step_records_reply_without_dispatch() {
        let model = ScriptedModel::new(vec![text("A creative script it is."), text("unused")]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Keyword);

        let state = supervisor
            .invoke_state(
                SupervisorState::new(vec![ChatMessage::user("script please")]).with_last_step(true),
                &RunConfig::new(),
            )
            .await
            .unwrap();

        assert_eq!(model.calls(), 1);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.current_agent, None);
    }

    #[tokio::test]
    async fn test_completed_agents_accumulate() {
        let model = ScriptedModel::new(vec![text("research time"), text("report")]);
        let (supervisor, _) = supervisor(model, RoutingStrategy::Keyword);

        let state = supervisor
            .invoke_state(
                SupervisorState::new(vec![ChatMessage::user("facts please")])
                    .with_completed_agents(vec![WorkerKind::Research]),
                &RunConfig::new(),
            )
            .await
            .unwrap();

        assert_eq!(state.completed_agents, vec![WorkerKind::Research, WorkerKind::Research]);
    }

    #[tokio::test]
    async fn test_unsupported_provider_fails_before_any_model_call() {
        let model = ScriptedModel::new(vec![text("story")]);
        let (supervisor, loader) = supervisor(model.clone(), RoutingStrategy::Keyword);

        let err = supervisor
            .invoke(vec![ChatMessage::user("story")], &RunConfig::new().with_model("foo/bar"))
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::UnsupportedProvider { .. }));
        assert_eq!(model.calls(), 0);
        assert!(loader.loaded().is_empty());
    }

    #[tokio::test]
    async fn test_run_config_model_reaches_every_load() {
        let model = ScriptedModel::new(vec![text("a story"), text("script")]);
        let (supervisor, loader) = supervisor(model, RoutingStrategy::Keyword);

        supervisor
            .invoke(vec![ChatMessage::user("story")], &RunConfig::new().with_model("openai/gpt-4o"))
            .await
            .unwrap();

        assert_eq!(loader.loaded(), vec!["openai/gpt-4o", "openai/gpt-4o"]);
    }

    #[tokio::test]
    async fn test_worker_failure_propagates_through_supervisor() {
        let model = ScriptedModel::new(vec![text("box it"), Turn::Fail]);
        let (supervisor, _) = supervisor(model, RoutingStrategy::Keyword);

        let err = supervisor
            .invoke(vec![ChatMessage::user("a box")], &RunConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_replaced_worker_is_used() {
        let model = ScriptedModel::new(vec![
            text("research"),
            tools(&[("call_1", "search", json!({"query": "ai"}))]),
            text("done"),
        ]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Keyword);
        let supervisor = supervisor.with_worker(research_worker(model.clone(), settings()));

        let state = supervisor
            .invoke(vec![ChatMessage::user("ai history")], &RunConfig::new())
            .await
            .unwrap();

        assert_eq!(model.calls(), 3);
        assert_eq!(state.current_agent, Some(WorkerKind::Research));
        // Only the worker's final message reaches the supervisor history
        assert_eq!(state.messages.len(), 3);
    }

    #[test]
    fn test_supervisor_wires_configured_workers() {
        let model = ScriptedModel::new(vec![]);
        let (supervisor, _) = supervisor(model.clone(), RoutingStrategy::Structured);

        assert_eq!(supervisor.routing(), RoutingStrategy::Structured);
        assert_eq!(
            supervisor.worker(WorkerKind::BoxMaker).tools().names(),
            ["calculate_material"]
        );
        assert_eq!(
            supervisor.worker(WorkerKind::Research).tools().names(),
            ["search", "summarize"]
        );

        let supervisor = supervisor.with_worker(research_worker(model, settings()));
        assert_eq!(
            supervisor.worker(WorkerKind::Research).tools().names(),
            ["search", "summarize", "flaky", "slow"]
        );
        assert_eq!(supervisor.worker(WorkerKind::ScriptMaker).tools().len(), 1);
    }
}
