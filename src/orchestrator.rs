//! Conversation orchestrator.
//!
//! One user turn: build the prompt, call the chat lane, parse, dispatch,
//! infer the indicator mood, and (when the model sent no ambient change of
//! its own) fire the ambient lane in the background.
//!
//! The two lanes are independent `RequestLane`s. A newer request on a lane
//! cancels the older one, and a response is applied only while its ticket
//! is still current, checked under the workspace lock.

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveTime};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::actions::{decode_batch, Action, ActionKind};
use crate::completion::{CompletionClient, CompletionRequest};
use crate::dates::DateReference;
use crate::dispatcher::{self, merge_ambient};
use crate::error::CompletionError;
use crate::lane::{LaneTicket, RequestLane};
use crate::mood::{infer_mood, infer_mood_from_kinds, Mood};
use crate::parser::{parse_response, ParsedResponse};
use crate::prompts::{
    build_chat_prompt, chat_ambient_context, event_ambient_context, task_ambient_context,
    AMBIENT_PROMPT,
};
use crate::types::LlmConfig;
use crate::workspace::{
    new_id, Event, Expense, ExpenseCategory, Priority, Task, Workspace,
};

/// Reply used when the model answered with nothing usable.
pub const FALLBACK_REPLY: &str = "Done! ✨";

// =============================================================================
// Conversation log
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Actions applied with this reply.
    pub action_count: usize,
}

impl Message {
    fn user(text: &str) -> Self {
        Self {
            role: Role::User,
            text: text.to_string(),
            action_count: 0,
        }
    }

    fn assistant(text: &str, action_count: usize) -> Self {
        Self {
            role: Role::Assistant,
            text: text.to_string(),
            action_count,
        }
    }
}

/// Opening assistant message with a few example commands.
pub fn welcome_message(backend: &str) -> String {
    format!(
        "Ready! ({})\n\n• \"make it cozy\"\n• \"check off documentation\"\n• \"meeting this friday 2pm\"\n• \"I spent €12 on lunch\"\n• \"focus mode\"",
        backend
    )
}

// =============================================================================
// Turn results
// =============================================================================

/// Token and sampling limits for both lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnSettings {
    pub temperature: f64,
    pub chat_max_tokens: u32,
    pub ambient_max_tokens: u32,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for TurnSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            chat_max_tokens: config.chat_max_tokens,
            ambient_max_tokens: config.ambient_max_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnStatus {
    /// Parsed and dispatched.
    Applied,
    /// Model output was not decodable; nothing dispatched.
    Unparsed,
    /// Transport or backend failure; one neutral reply logged.
    Failed,
    /// A newer turn replaced this one. Nothing visible happened.
    Superseded,
    /// Blank input.
    Ignored,
}

#[derive(Debug)]
pub struct TurnOutcome {
    pub status: TurnStatus,
    /// Assistant text appended to the log, if any.
    pub reply: Option<String>,
    pub executed: Vec<ActionKind>,
    /// Indicator mood after the turn, when it changed.
    pub mood: Option<Mood>,
    /// Background ambient request, when one was fired.
    pub ambient_task: Option<JoinHandle<()>>,
}

impl TurnOutcome {
    fn silent(status: TurnStatus) -> Self {
        Self {
            status,
            reply: None,
            executed: Vec::new(),
            mood: None,
            ambient_task: None,
        }
    }
}

/// Result of adding an entity outside the chat lane.
#[derive(Debug)]
pub struct ManualOutcome {
    pub id: String,
    pub mood: Option<Mood>,
    pub ambient_task: Option<JoinHandle<()>>,
}

// =============================================================================
// Orchestrator
// =============================================================================

struct Shared {
    client: Arc<dyn CompletionClient>,
    settings: TurnSettings,
    workspace: Mutex<Workspace>,
    log: Mutex<Vec<Message>>,
    mood: Mutex<Mood>,
    chat: RequestLane,
    ambient: RequestLane,
    fixed_today: Option<NaiveDate>,
}

/// Cheap to clone; every clone drives the same session.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Shared>,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn CompletionClient>, settings: TurnSettings, workspace: Workspace) -> Self {
        Self::build(client, settings, workspace, None)
    }

    /// Pin "today" instead of reading the local clock.
    pub fn with_date(
        client: Arc<dyn CompletionClient>,
        settings: TurnSettings,
        workspace: Workspace,
        today: NaiveDate,
    ) -> Self {
        Self::build(client, settings, workspace, Some(today))
    }

    fn build(
        client: Arc<dyn CompletionClient>,
        settings: TurnSettings,
        workspace: Workspace,
        fixed_today: Option<NaiveDate>,
    ) -> Self {
        Self {
            inner: Arc::new(Shared {
                client,
                settings,
                workspace: Mutex::new(workspace),
                log: Mutex::new(Vec::new()),
                mood: Mutex::new(Mood::Neutral),
                chat: RequestLane::new("Chat"),
                ambient: RequestLane::new("Ambient"),
                fixed_today,
            }),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.inner
            .fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.client.name()
    }

    /// Copy of the current workspace.
    pub fn workspace(&self) -> Workspace {
        self.inner.workspace.lock().clone()
    }

    /// Direct manipulation (toggle, edit, remove) under the workspace lock.
    pub fn with_workspace<R>(&self, f: impl FnOnce(&mut Workspace) -> R) -> R {
        let mut workspace = self.inner.workspace.lock();
        f(&mut *workspace)
    }

    pub fn conversation(&self) -> Vec<Message> {
        self.inner.log.lock().clone()
    }

    pub fn mood(&self) -> Mood {
        *self.inner.mood.lock()
    }

    pub fn push_assistant(&self, text: &str) {
        self.inner.log.lock().push(Message::assistant(text, 0));
    }

    // -------------------------------------------------------------------------
    // Chat lane
    // -------------------------------------------------------------------------

    /// Run one chat turn. Issuing a new turn while this one is in flight
    /// supersedes it.
    pub async fn submit(&self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::silent(TurnStatus::Ignored);
        }

        self.inner.log.lock().push(Message::user(text));
        let ticket = self.inner.chat.begin();

        let request = {
            let snapshot = self.inner.workspace.lock().snapshot();
            let dates = DateReference::for_date(self.today());
            CompletionRequest {
                system_prompt: build_chat_prompt(&dates, &snapshot),
                user_message: text.to_string(),
                max_tokens: self.inner.settings.chat_max_tokens,
                temperature: self.inner.settings.temperature,
            }
        };

        let result = self
            .inner
            .chat
            .run(&ticket, self.inner.client.complete(&request))
            .await;

        match result {
            Ok(raw) => {
                log::debug!("Chat lane: raw response {:?}", raw);
                let parsed = parse_response(&raw);
                log::debug!("Chat lane: parsed {:?}", parsed);
                self.finish_turn(text, &ticket, parsed)
            }
            Err(e) if e.is_canceled() => TurnOutcome::silent(TurnStatus::Superseded),
            Err(e) => self.fail_turn(text, &ticket, e),
        }
    }

    fn finish_turn(
        &self,
        text: &str,
        ticket: &LaneTicket,
        parsed: Option<ParsedResponse>,
    ) -> TurnOutcome {
        let (status, parsed) = match parsed {
            Some(p) => (TurnStatus::Applied, p),
            None => (TurnStatus::Unparsed, ParsedResponse::empty()),
        };
        let actions = decode_batch(&parsed.actions);
        let reply = if parsed.reply.trim().is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            parsed.reply
        };

        let report = {
            let mut workspace = self.inner.workspace.lock();
            if !self.inner.chat.is_current(ticket) {
                log::debug!("Chat lane: dropping stale response #{}", ticket.generation);
                return TurnOutcome::silent(TurnStatus::Superseded);
            }
            dispatcher::apply(&mut workspace, &actions, self.today())
        };
        log::info!(
            "Chat lane: applied {} action(s) ({})",
            report.executed.len(),
            report
                .executed
                .iter()
                .map(ActionKind::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.inner
            .log
            .lock()
            .push(Message::assistant(&reply, report.executed.len()));

        let mut mood = None;
        for label in &report.ambient_moods {
            mood = self.sync_mood(infer_mood_from_kinds(label, &[])).or(mood);
        }
        mood = self.sync_mood(infer_mood(text, &actions)).or(mood);

        let ambient_task = if report.contains(ActionKind::AdjustAmbient) {
            None
        } else {
            Some(self.fire_ambient(chat_ambient_context(text, &report.executed)))
        };

        TurnOutcome {
            status,
            reply: Some(reply),
            executed: report.executed,
            mood,
            ambient_task,
        }
    }

    fn fail_turn(&self, text: &str, ticket: &LaneTicket, error: CompletionError) -> TurnOutcome {
        if !self.inner.chat.is_current(ticket) {
            return TurnOutcome::silent(TurnStatus::Superseded);
        }
        log::warn!(
            "Chat lane: completion failed: {} ({})",
            error,
            error.recovery_suggestion()
        );
        let reply = error.user_message().map(str::to_string);
        if let Some(reply) = &reply {
            self.inner.log.lock().push(Message::assistant(reply, 0));
        }

        TurnOutcome {
            status: TurnStatus::Failed,
            reply,
            executed: Vec::new(),
            mood: None,
            ambient_task: Some(self.fire_ambient(chat_ambient_context(text, &[]))),
        }
    }

    // -------------------------------------------------------------------------
    // Ambient lane
    // -------------------------------------------------------------------------

    /// Fire-and-forget atmosphere request. Only `adjust_ambient` results are
    /// applied; every failure is swallowed.
    fn fire_ambient(&self, context: String) -> JoinHandle<()> {
        let ticket = self.inner.ambient.begin();
        let this = self.clone();
        tokio::spawn(async move {
            let request = CompletionRequest {
                system_prompt: AMBIENT_PROMPT.to_string(),
                user_message: context,
                max_tokens: this.inner.settings.ambient_max_tokens,
                temperature: this.inner.settings.temperature,
            };
            let result = this
                .inner
                .ambient
                .run(&ticket, this.inner.client.complete(&request))
                .await;

            match result {
                Ok(raw) => this.apply_ambient(&ticket, &raw),
                Err(e) if e.is_canceled() => {}
                Err(e) => log::debug!("Ambient lane: ignoring failure: {}", e),
            }
        })
    }

    fn apply_ambient(&self, ticket: &LaneTicket, raw: &str) {
        let Some(parsed) = parse_response(raw) else {
            log::debug!("Ambient lane: unparseable response ignored");
            return;
        };
        let updates: Vec<Action> = decode_batch(&parsed.actions)
            .into_iter()
            .filter(|a| a.kind() == ActionKind::AdjustAmbient)
            .collect();
        if updates.is_empty() {
            return;
        }

        let moods: Vec<String> = {
            let mut workspace = self.inner.workspace.lock();
            if !self.inner.ambient.is_current(ticket) {
                return;
            }
            updates
                .iter()
                .filter_map(|action| match action {
                    Action::AdjustAmbient(update) => {
                        merge_ambient(&mut workspace.ambient, update);
                        update.mood.clone()
                    }
                    _ => None,
                })
                .collect()
        };
        log::info!("Ambient lane: applied {} update(s)", updates.len());

        for label in moods {
            self.sync_mood(infer_mood_from_kinds(&label, &[]));
        }
    }

    /// Update the indicator when inference produced something.
    fn sync_mood(&self, inferred: Option<Mood>) -> Option<Mood> {
        let mood = inferred?;
        *self.inner.mood.lock() = mood;
        Some(mood)
    }

    // -------------------------------------------------------------------------
    // Manual entry
    // -------------------------------------------------------------------------

    /// Add a task typed straight into the task panel.
    pub fn add_task_manually(&self, text: &str) -> Option<ManualOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let task = Task::new(text, Priority::Medium);
        let id = task.id.clone();
        self.inner.workspace.lock().tasks.push(task);

        let mood = self.sync_mood(infer_mood_from_kinds(text, &[ActionKind::AddTask]));
        let ambient_task = Some(self.fire_ambient(task_ambient_context(text)));
        Some(ManualOutcome {
            id,
            mood,
            ambient_task,
        })
    }

    pub fn add_event_manually(
        &self,
        title: &str,
        date: NaiveDate,
        time: NaiveTime,
        color: &str,
    ) -> Option<ManualOutcome> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let event = Event {
            id: new_id(),
            title: title.to_string(),
            date,
            time,
            duration: crate::actions::DEFAULT_EVENT_DURATION,
            color: color.to_string(),
        };
        let id = event.id.clone();
        self.inner.workspace.lock().events.push(event);

        let mood = self.sync_mood(infer_mood_from_kinds(title, &[ActionKind::AddEvent]));
        let context = event_ambient_context(title, &date.to_string());
        Some(ManualOutcome {
            id,
            mood,
            ambient_task: Some(self.fire_ambient(context)),
        })
    }

    /// Expenses entered by hand don't touch mood or atmosphere.
    pub fn add_expense_manually(
        &self,
        description: &str,
        amount: f64,
        category: ExpenseCategory,
    ) -> Option<ManualOutcome> {
        let description = description.trim();
        if description.is_empty() {
            return None;
        }
        let expense = Expense {
            id: new_id(),
            description: description.to_string(),
            amount: if amount.is_finite() { amount.max(0.0) } else { 0.0 },
            category,
        };
        let id = expense.id.clone();
        self.inner.workspace.lock().expenses.push(expense);
        Some(ManualOutcome {
            id,
            mood: None,
            ambient_task: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TRANSPORT_FAILURE_REPLY;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;

    const NO_AMBIENT: &str = r#"{"actions":[],"reply":""}"#;

    enum Step {
        Reply(u64, &'static str),
        Fail(u64),
    }

    /// Chat and ambient answers served in call order.
    #[derive(Default)]
    struct ScriptedClient {
        chat: Mutex<VecDeque<Step>>,
        ambient: Mutex<VecDeque<Step>>,
        ambient_calls: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn chat(self, step: Step) -> Self {
            self.chat.lock().push_back(step);
            self
        }

        fn ambient(self, step: Step) -> Self {
            self.ambient.lock().push_back(step);
            self
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            let step = if request.system_prompt == AMBIENT_PROMPT {
                self.ambient_calls.lock().push(request.user_message.clone());
                self.ambient.lock().pop_front()
            } else {
                self.chat.lock().pop_front()
            };
            match step.unwrap_or(Step::Reply(0, NO_AMBIENT)) {
                Step::Reply(delay, text) => {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok(text.to_string())
                }
                Step::Fail(delay) => {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Err(CompletionError::Transport("connection refused".into()))
                }
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn orchestrator(client: ScriptedClient) -> (Orchestrator, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let orch = Orchestrator::with_date(
            client.clone(),
            TurnSettings::default(),
            Workspace::seeded(today()),
            today(),
        );
        (orch, client)
    }

    async fn settle(outcome: TurnOutcome) -> TurnOutcome {
        let TurnOutcome {
            status,
            reply,
            executed,
            mood,
            ambient_task,
        } = outcome;
        if let Some(task) = ambient_task {
            task.await.unwrap();
        }
        TurnOutcome {
            status,
            reply,
            executed,
            mood,
            ambient_task: None,
        }
    }

    #[tokio::test]
    async fn test_turn_applies_actions_and_logs_reply() {
        let (orch, client) = orchestrator(ScriptedClient::default().chat(Step::Reply(
            0,
            r#"{"actions":[{"type":"add_task","text":"Buy groceries 🛒"}],"reply":"Task added! 🛒"}"#,
        )));

        let outcome = settle(orch.submit("add task buy groceries").await).await;

        assert_eq!(outcome.status, TurnStatus::Applied);
        assert_eq!(outcome.reply.as_deref(), Some("Task added! 🛒"));
        assert_eq!(outcome.executed, vec![ActionKind::AddTask]);
        assert!(orch.workspace().tasks.iter().any(|t| t.text == "Buy groceries 🛒"));

        let log = orch.conversation();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, Role::User);
        assert_eq!(log[1].action_count, 1);

        let calls = client.ambient_calls.lock().clone();
        assert_eq!(
            calls,
            vec!["User said: \"add task buy groceries\". Actions taken: add_task. Emotional weight?"]
        );
    }

    #[tokio::test]
    async fn test_finished_report_sets_proud() {
        let (orch, _) = orchestrator(ScriptedClient::default().chat(Step::Reply(
            0,
            r#"{"actions":[{"type":"complete_task","text":"proposal"}],"reply":"Great job!"}"#,
        )));

        let outcome = settle(orch.submit("I finally finished the report!").await).await;

        assert_eq!(outcome.mood, Some(Mood::Proud));
        assert_eq!(orch.mood(), Mood::Proud);
        assert!(orch.workspace().tasks[0].done);
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_neutral() {
        let (orch, _) = orchestrator(
            ScriptedClient::default().chat(Step::Reply(0, "I'm not sure what you mean.")),
        );
        let before = orch.workspace();

        let outcome = settle(orch.submit("blorp").await).await;

        assert_eq!(outcome.status, TurnStatus::Unparsed);
        assert_eq!(outcome.reply.as_deref(), Some(FALLBACK_REPLY));
        assert!(outcome.executed.is_empty());
        assert_eq!(orch.workspace().tasks, before.tasks);
    }

    #[tokio::test]
    async fn test_empty_reply_gets_fallback() {
        let (orch, _) = orchestrator(ScriptedClient::default().chat(Step::Reply(
            0,
            r#"{"actions":[{"type":"clear_canvas"}]}"#,
        )));
        let outcome = settle(orch.submit("clear it").await).await;
        assert_eq!(outcome.status, TurnStatus::Applied);
        assert_eq!(outcome.reply.as_deref(), Some(FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn test_transport_failure_logs_one_neutral_reply() {
        let (orch, _) = orchestrator(
            ScriptedClient::default()
                .chat(Step::Fail(0))
                .ambient(Step::Fail(0)),
        );

        let outcome = settle(orch.submit("add task x").await).await;

        assert_eq!(outcome.status, TurnStatus::Failed);
        let log = orch.conversation();
        let replies: Vec<_> = log.iter().filter(|m| m.role == Role::Assistant).collect();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, TRANSPORT_FAILURE_REPLY);
        assert_eq!(orch.workspace().ambient, Workspace::default().ambient);
    }

    #[tokio::test]
    async fn test_superseded_turn_is_silent_and_never_applied() {
        let (orch, _) = orchestrator(
            ScriptedClient::default()
                .chat(Step::Reply(
                    300,
                    r#"{"actions":[{"type":"add_task","text":"stale"}],"reply":"old"}"#,
                ))
                .chat(Step::Reply(
                    0,
                    r#"{"actions":[{"type":"add_task","text":"fresh"}],"reply":"new"}"#,
                )),
        );

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.submit("first").await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        let second = settle(orch.submit("second").await).await;
        let first = settle(first.await.unwrap()).await;

        assert_eq!(first.status, TurnStatus::Superseded);
        assert_eq!(first.reply, None);
        assert_eq!(second.status, TurnStatus::Applied);

        let texts: Vec<String> = orch.workspace().tasks.into_iter().map(|t| t.text).collect();
        assert!(texts.contains(&"fresh".to_string()));
        assert!(!texts.contains(&"stale".to_string()));
        assert!(orch.conversation().iter().all(|m| m.text != "old"));
    }

    #[tokio::test]
    async fn test_explicit_ambient_skips_ambient_lane() {
        let (orch, client) = orchestrator(ScriptedClient::default().chat(Step::Reply(
            0,
            r#"{"actions":[{"type":"adjust_ambient","glowIntensity":0.9,"mood":"cozy"}],"reply":"Cozy!"}"#,
        )));

        let outcome = orch.submit("make it cozy").await;

        assert!(outcome.ambient_task.is_none());
        assert!(client.ambient_calls.lock().is_empty());
        let ws = orch.workspace();
        assert_eq!(ws.ambient.glow_intensity, 0.35);
        assert_eq!(ws.ambient.mood, "cozy");
        assert_eq!(orch.mood(), Mood::Cozy);
    }

    #[tokio::test]
    async fn test_ambient_lane_applies_only_ambient_actions() {
        let (orch, _) = orchestrator(
            ScriptedClient::default()
                .chat(Step::Reply(0, r#"{"actions":[],"reply":"Noted."}"#))
                .ambient(Step::Reply(
                    0,
                    r##"{"actions":[
                        {"type":"adjust_ambient","glowColor":"#0984e3","particles":"rain","mood":"sad"},
                        {"type":"add_task","text":"sneaky"}
                    ],"reply":""}"##,
                )),
        );
        let tasks_before = orch.workspace().tasks.len();

        settle(orch.submit("rough day, my dog is sick").await).await;

        let ws = orch.workspace();
        assert_eq!(ws.tasks.len(), tasks_before);
        assert_eq!(ws.ambient.glow_color, "#0984e3");
        assert_eq!(ws.ambient.particles, crate::workspace::Particles::Rain);
        assert_eq!(orch.mood(), Mood::Sad);
    }

    #[tokio::test]
    async fn test_ambient_lane_supersedes_itself() {
        let (orch, _) = orchestrator(
            ScriptedClient::default()
                .ambient(Step::Reply(
                    300,
                    r#"{"actions":[{"type":"adjust_ambient","mood":"stale"}],"reply":""}"#,
                ))
                .ambient(Step::Reply(
                    0,
                    r#"{"actions":[{"type":"adjust_ambient","mood":"calm"}],"reply":""}"#,
                )),
        );

        let first = orch.add_task_manually("Call mom").unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let second = orch.add_task_manually("Water plants").unwrap();

        first.ambient_task.unwrap().await.unwrap();
        second.ambient_task.unwrap().await.unwrap();
        assert_eq!(orch.workspace().ambient.mood, "calm");
    }

    #[tokio::test]
    async fn test_manual_task_infers_mood_and_fires_ambient() {
        let (orch, client) = orchestrator(ScriptedClient::default());

        let outcome = orch.add_task_manually("  Plan the week  ").unwrap();
        outcome.ambient_task.unwrap().await.unwrap();

        assert_eq!(outcome.mood, Some(Mood::Productive));
        assert!(orch.workspace().tasks.iter().any(|t| t.id == outcome.id && t.text == "Plan the week"));
        assert_eq!(
            client.ambient_calls.lock().clone(),
            vec!["User added task: \"Plan the week\". Emotional weight?"]
        );
        assert!(orch.add_task_manually("   ").is_none());
    }

    #[tokio::test]
    async fn test_manual_event_context() {
        let (orch, client) = orchestrator(ScriptedClient::default());
        let outcome = orch
            .add_event_manually(
                "Birthday party",
                NaiveDate::from_ymd_opt(2026, 10, 23).unwrap(),
                NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                "#e17055",
            )
            .unwrap();
        outcome.ambient_task.unwrap().await.unwrap();

        assert_eq!(outcome.mood, Some(Mood::Playful));
        assert_eq!(
            client.ambient_calls.lock().clone(),
            vec!["User added event: \"Birthday party\" on 2026-10-23. Emotional weight?"]
        );
        assert_eq!(orch.workspace().events.last().unwrap().duration, 60);
    }

    #[tokio::test]
    async fn test_manual_expense_is_quiet() {
        let (orch, client) = orchestrator(ScriptedClient::default());
        let outcome = orch
            .add_expense_manually("Lunch", -3.0, ExpenseCategory::Food)
            .unwrap();
        assert!(outcome.ambient_task.is_none());
        assert!(client.ambient_calls.lock().is_empty());
        assert_eq!(orch.workspace().expenses.last().unwrap().amount, 0.0);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let (orch, _) = orchestrator(ScriptedClient::default());
        let outcome = orch.submit("   ").await;
        assert_eq!(outcome.status, TurnStatus::Ignored);
        assert!(orch.conversation().is_empty());
    }

    #[test]
    fn test_welcome_message_names_backend() {
        assert!(welcome_message("local LLM").starts_with("Ready! (local LLM)"));
    }
}
