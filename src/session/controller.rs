//! Session state and the dispatch of user actions to the clients
//!
//! Every asynchronous action is split in three: a synchronous `begin_*` that
//! checks guards, transitions state and captures the request in a ticket; the
//! ticket's `execute` which does the suspending work; and a synchronous
//! `finish_*` that applies the result. Each ticket carries a [`RequestToken`];
//! results whose token is no longer pending are dropped.

use std::sync::Arc;
use futures::StreamExt;
use tracing::debug;

use crate::{
    app::{ChatClient, FragmentStream, GenerationClient, GenerationOptions},
    catalog::{filter, Catalog, CodeSnippet, FilteredSection, FilteredView, PromptItem},
    session::{ChatHistory, ChatTurn},
};

/// Identifies one dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// What the side panel is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelMode {
    #[default]
    Generator,
    Chat,
}

/// Something the user can copy to the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTarget {
    /// Body text of a catalog item
    ItemText(String),
    /// Code sample of a catalog item
    ItemCode(String),
    /// The last one-shot response
    Response,
}

/// Everything the UI renders from
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub active_section_id: Option<String>,
    pub search_term: String,
    pub selected_item: Option<PromptItem>,
    pub panel_open: bool,
    pub mode: PanelMode,
    pub loading: bool,
    pub streaming: bool,
    pub draft: String,
    pub chat_input: String,
    pub response: Option<String>,
    pub history: ChatHistory,
    pub extended_reasoning: bool,
}

/// A captured one-shot generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub token: RequestToken,
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerationTicket {
    pub async fn execute(self, client: &GenerationClient) -> GenerationOutcome {
        let text = client.generate(&self.prompt, self.options).await;
        GenerationOutcome {
            token: self.token,
            text,
        }
    }
}

/// The text produced for a [`GenerationTicket`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub token: RequestToken,
    pub text: String,
}

/// A captured chat send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTicket {
    pub token: RequestToken,
    /// History before the new user turn
    pub history: Vec<ChatTurn>,
    pub message: String,
    pub options: GenerationOptions,
}

impl ChatTicket {
    pub fn execute(&self, client: &ChatClient) -> FragmentStream {
        client.stream_reply(&self.history, &self.message, self.options)
    }
}

/// Owns the session state and applies user actions to it
#[derive(Debug)]
pub struct SessionController {
    catalog: Arc<Catalog>,
    state: SessionState,
    next_token: u64,
    pending_run: Option<RequestToken>,
    pending_send: Option<RequestToken>,
}

impl SessionController {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let state = SessionState {
            active_section_id: catalog.default_section().map(|s| s.id.clone()),
            ..SessionState::default()
        };
        Self {
            catalog,
            state,
            next_token: 0,
            pending_run: None,
            pending_send: None,
        }
    }

    pub fn with_extended_reasoning(mut self, enabled: bool) -> Self {
        self.state.extended_reasoning = enabled;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions::extended(self.state.extended_reasoning)
    }

    // Navigation and search

    /// Make `section_id` active and clear the search. Unknown ids are ignored.
    pub fn select_section(&mut self, section_id: &str) -> bool {
        if self.catalog.section(section_id).is_none() {
            debug!("Ignoring unknown section {}", section_id);
            return false;
        }
        self.state.active_section_id = Some(section_id.to_string());
        self.state.search_term.clear();
        true
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
    }

    pub fn clear_search(&mut self) {
        self.state.search_term.clear();
    }

    pub fn filtered_view(&self) -> FilteredView<'_> {
        filter(&self.catalog, &self.state.search_term)
    }

    /// The active section of the current filtered view, if any
    pub fn active_section(&self) -> Option<FilteredSection<'_>> {
        self.filtered_view()
            .active_section(self.state.active_section_id.as_deref())
            .cloned()
    }

    pub fn search_summary(&self) -> Option<String> {
        self.filtered_view()
            .summary(self.state.active_section_id.as_deref())
    }

    // Panel

    /// Load a catalog item into the generator. Any in-flight generation is
    /// detached and its result will be dropped.
    pub fn select_item(&mut self, item_id: &str) -> bool {
        let Some((_, item)) = self.catalog.find_item(item_id) else {
            debug!("Ignoring unknown item {}", item_id);
            return false;
        };
        self.state.draft = item.text.clone();
        self.state.selected_item = Some(item.clone());
        self.state.response = None;
        self.state.mode = PanelMode::Generator;
        self.state.panel_open = true;
        self.detach_run();
        true
    }

    /// Show the chat panel without touching the history
    pub fn open_chat(&mut self) {
        self.state.mode = PanelMode::Chat;
        self.state.panel_open = true;
        self.detach_run();
    }

    /// Hide the panel and drop generator state; chat history is kept
    pub fn close_panel(&mut self) {
        self.state.panel_open = false;
        self.state.selected_item = None;
        self.state.draft.clear();
        self.state.response = None;
        self.detach_run();
    }

    fn detach_run(&mut self) {
        if let Some(token) = self.pending_run.take() {
            debug!("Detached generation {}", token.value());
        }
        self.state.loading = false;
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft = text.into();
    }

    pub fn set_chat_input(&mut self, text: impl Into<String>) {
        self.state.chat_input = text.into();
    }

    /// Flip extended reasoning; returns the new value. Already dispatched
    /// tickets keep the options they captured.
    pub fn toggle_extended_reasoning(&mut self) -> bool {
        self.state.extended_reasoning = !self.state.extended_reasoning;
        self.state.extended_reasoning
    }

    // One-shot generation

    /// Start a run of the current draft. Returns `None` when the draft is
    /// blank or a run is already loading.
    pub fn begin_run(&mut self) -> Option<GenerationTicket> {
        if self.state.loading || self.state.draft.trim().is_empty() {
            return None;
        }
        let token = self.issue_token();
        self.state.loading = true;
        self.state.response = None;
        self.pending_run = Some(token);
        Some(GenerationTicket {
            token,
            prompt: self.state.draft.clone(),
            options: self.options(),
        })
    }

    /// Apply a finished generation. Returns false if it was stale.
    pub fn finish_run(&mut self, outcome: GenerationOutcome) -> bool {
        if self.pending_run != Some(outcome.token) {
            debug!("Discarding stale generation {}", outcome.token.value());
            return false;
        }
        self.pending_run = None;
        self.state.loading = false;
        self.state.response = Some(outcome.text);
        true
    }

    /// Run the draft to completion
    pub async fn run(&mut self, client: &GenerationClient) -> bool {
        match self.begin_run() {
            Some(ticket) => {
                let outcome = ticket.execute(client).await;
                self.finish_run(outcome)
            }
            None => false,
        }
    }

    // Chat

    /// Start sending the chat input. Returns `None` when the input is blank or
    /// a reply is still streaming.
    pub fn begin_send(&mut self) -> Option<ChatTicket> {
        if self.state.streaming || self.state.chat_input.trim().is_empty() {
            return None;
        }
        let token = self.issue_token();
        let message = std::mem::take(&mut self.state.chat_input);
        let history = self.state.history.turns().to_vec();

        self.state.history.push(ChatTurn::user(message.clone()));
        self.state.history.push(ChatTurn::model(String::new()));
        self.state.streaming = true;
        self.pending_send = Some(token);

        Some(ChatTicket {
            token,
            history,
            message,
            options: self.options(),
        })
    }

    /// Grow the placeholder reply with `fragment`
    pub fn apply_fragment(&mut self, token: RequestToken, fragment: &str) -> bool {
        if self.pending_send != Some(token) {
            return false;
        }
        self.state.history.append_to_last_model(fragment)
    }

    pub fn finish_send(&mut self, token: RequestToken) -> bool {
        if self.pending_send != Some(token) {
            return false;
        }
        self.pending_send = None;
        self.state.streaming = false;
        true
    }

    /// Send the chat input and stream the whole reply into the history
    pub async fn send(&mut self, client: &ChatClient) -> bool {
        let Some(ticket) = self.begin_send() else {
            return false;
        };
        let mut fragments = ticket.execute(client);
        while let Some(fragment) = fragments.next().await {
            self.apply_fragment(ticket.token, &fragment);
        }
        self.finish_send(ticket.token)
    }

    /// Empty the chat history unless a reply is streaming
    pub fn clear_chat(&mut self) -> bool {
        if self.state.streaming {
            return false;
        }
        self.state.history.clear();
        true
    }

    // Clipboard

    /// Text that `target` refers to, if it exists
    pub fn copy_source(&self, target: &CopyTarget) -> Option<String> {
        match target {
            CopyTarget::ItemText(id) => self.catalog.find_item(id).map(|(_, item)| item.text.clone()),
            CopyTarget::ItemCode(id) => self
                .catalog
                .find_item(id)
                .and_then(|(_, item)| item.code_snippet.as_ref())
                .map(|CodeSnippet { code, .. }| code.clone()),
            CopyTarget::Response => self.state.response.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{
        mock::{MockProvider, MockReply},
        simulated::SimulatedProvider,
        ModelSettings,
    };
    use std::time::Duration;

    fn controller() -> SessionController {
        SessionController::new(Arc::new(Catalog::builtin()))
    }

    #[test]
    fn test_initial_state() {
        let c = controller();
        assert_eq!(c.state().active_section_id.as_deref(), Some("waterfall-planning"));
        assert!(!c.state().panel_open);
        assert!(c.state().search_term.is_empty());
        assert_eq!(c.active_section().unwrap().id(), "waterfall-planning");
    }

    #[test]
    fn test_select_section_clears_search() {
        let mut c = controller();
        c.set_search("jql");
        assert!(c.select_section("safe-framework"));
        assert!(c.state().search_term.is_empty());
        assert_eq!(c.active_section().unwrap().id(), "safe-framework");

        assert!(!c.select_section("no-such-section"));
        assert_eq!(c.state().active_section_id.as_deref(), Some("safe-framework"));
    }

    #[test]
    fn test_active_section_falls_back_to_first_match() {
        let mut c = controller();
        c.select_section("safe-framework");
        c.set_search("WBS");
        assert_eq!(c.active_section().unwrap().id(), "waterfall-planning");
        assert_eq!(
            c.search_summary().as_deref(),
            Some("Found 1 prompts for \"WBS\"")
        );

        c.set_search("zzz-no-match");
        assert!(c.active_section().is_none());

        c.clear_search();
        assert_eq!(c.active_section().unwrap().id(), "safe-framework");
    }

    #[test]
    fn test_select_item_loads_draft_and_clears_response() {
        let mut c = controller();
        c.select_item("wf-1");
        c.state.response = Some("old".to_string());
        c.set_draft("edited");

        assert!(c.select_item("scrum-3"));
        let item = Catalog::builtin().find_item("scrum-3").unwrap().1.clone();
        assert_eq!(c.state().draft, item.text);
        assert_eq!(c.state().response, None);
        assert_eq!(c.state().mode, PanelMode::Generator);
        assert!(c.state().panel_open);
        assert_eq!(c.state().selected_item.as_ref(), Some(&item));
    }

    #[test]
    fn test_blank_draft_never_runs() {
        let mut c = controller();
        c.select_item("wf-1");
        c.set_draft("   \n\t");
        assert!(c.begin_run().is_none());
        assert!(!c.state().loading);
    }

    #[tokio::test]
    async fn test_blank_draft_never_calls_client() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::text("x")]));
        let client = GenerationClient::new(provider.clone(), ModelSettings::default());
        let mut c = controller();
        c.open_chat();

        assert!(!c.run(&client).await);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rapid_runs_make_one_call() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::text("done"), MockReply::text("again")]));
        let client = GenerationClient::new(provider.clone(), ModelSettings::default());
        let mut c = controller();
        c.select_item("wf-2");

        let first = c.begin_run().unwrap();
        assert!(c.state().loading);
        assert!(c.begin_run().is_none());

        let outcome = first.execute(&client).await;
        assert!(c.finish_run(outcome));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(c.state().response.as_deref(), Some("done"));
        assert!(!c.state().loading);
    }

    #[tokio::test]
    async fn test_run_without_credential_is_simulated() {
        let client = GenerationClient::new(
            Arc::new(SimulatedProvider::new(Duration::ZERO)),
            ModelSettings::default(),
        );
        let mut c = controller();
        c.select_item("pm-1");

        assert!(c.run(&client).await);
        assert!(c.state().response.as_deref().unwrap().contains("Simulated"));
    }

    #[tokio::test]
    async fn test_stale_generation_is_discarded() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::text("late")]));
        let client = GenerationClient::new(provider, ModelSettings::default());
        let mut c = controller();
        c.select_item("wf-1");

        let ticket = c.begin_run().unwrap();
        c.select_item("wf-2");
        assert!(!c.state().loading);

        let outcome = ticket.execute(&client).await;
        assert!(!c.finish_run(outcome));
        assert_eq!(c.state().response, None);
    }

    #[test]
    fn test_close_panel_keeps_history() {
        let mut c = controller();
        c.open_chat();
        c.state.history.push(ChatTurn::user("hi"));
        c.state.history.push(ChatTurn::model("hello"));
        c.select_item("wf-1");

        c.close_panel();
        assert!(!c.state().panel_open);
        assert!(c.state().draft.is_empty());
        assert!(c.state().selected_item.is_none());
        assert_eq!(c.state().history.len(), 2);

        c.open_chat();
        assert_eq!(c.state().mode, PanelMode::Chat);
        assert_eq!(c.state().history.len(), 2);
    }

    #[test]
    fn test_begin_send_appends_turns() {
        let mut c = controller();
        c.open_chat();
        c.set_chat_input("   ");
        assert!(c.begin_send().is_none());

        c.set_chat_input("Draft a risk register");
        let ticket = c.begin_send().unwrap();
        assert!(ticket.history.is_empty());
        assert_eq!(ticket.message, "Draft a risk register");
        assert!(c.state().chat_input.is_empty());
        assert!(c.state().streaming);
        assert_eq!(
            c.state().history.turns(),
            &[ChatTurn::user("Draft a risk register"), ChatTurn::model("")]
        );

        c.set_chat_input("another");
        assert!(c.begin_send().is_none());
        assert!(!c.clear_chat());
    }

    #[tokio::test]
    async fn test_send_streams_into_placeholder() {
        let provider = Arc::new(MockProvider::new(vec![
            MockReply::fragments(&["Risks: ", "scope, ", "budget."]),
            MockReply::text("Second."),
        ]));
        let client = ChatClient::new(provider.clone(), ModelSettings::default());
        let mut c = controller();
        c.open_chat();

        c.set_chat_input("List risks");
        assert!(c.send(&client).await);
        assert!(!c.state().streaming);
        assert_eq!(c.state().history.last(), Some(&ChatTurn::model("Risks: scope, budget.")));

        c.set_chat_input("More");
        assert!(c.send(&client).await);
        assert_eq!(c.state().history.len(), 4);

        let second = &provider.requests()[1];
        assert_eq!(second.messages.len(), 3);
        assert_eq!(second.messages[1].content, "Risks: scope, budget.");

        assert!(c.clear_chat());
        assert!(c.state().history.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_mid_stream_keeps_dispatched_options() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::fragments(&["a", "b"])]));
        let client = ChatClient::new(provider.clone(), ModelSettings::default());
        let mut c = controller();
        c.open_chat();
        c.set_chat_input("go");

        let ticket = c.begin_send().unwrap();
        assert!(c.toggle_extended_reasoning());

        let mut fragments = ticket.execute(&client);
        while let Some(fragment) = fragments.next().await {
            c.apply_fragment(ticket.token, &fragment);
        }
        assert!(c.finish_send(ticket.token));

        let request = &provider.requests()[0];
        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.thinking_budget, None);
        assert_eq!(c.state().history.last(), Some(&ChatTurn::model("ab")));
    }

    #[tokio::test]
    async fn test_stream_failure_leaves_streaming_state() {
        let provider = Arc::new(MockProvider::new(vec![MockReply::FailAfter(
            vec!["half".to_string()],
            "dropped".to_string(),
        )]));
        let client = ChatClient::new(provider, ModelSettings::default());
        let mut c = controller();
        c.open_chat();
        c.set_chat_input("go");

        assert!(c.send(&client).await);
        assert!(!c.state().streaming);
        let reply = &c.state().history.last().unwrap().text;
        assert!(reply.starts_with("half"));
        assert!(reply.contains("dropped"));
    }

    #[test]
    fn test_stale_fragments_are_ignored() {
        let mut c = controller();
        c.open_chat();
        c.set_chat_input("go");
        let ticket = c.begin_send().unwrap();

        assert!(!c.apply_fragment(RequestToken(ticket.token.value() + 1), "x"));
        assert!(c.apply_fragment(ticket.token, "y"));
        assert!(!c.finish_send(RequestToken(999)));
        assert!(c.finish_send(ticket.token));
        assert_eq!(c.state().history.last(), Some(&ChatTurn::model("y")));
    }

    #[test]
    fn test_copy_source() {
        let mut c = controller();
        assert!(c.copy_source(&CopyTarget::ItemCode("wf-1".to_string())).is_none());
        assert!(c
            .copy_source(&CopyTarget::ItemCode("py-auth".to_string()))
            .unwrap()
            .contains("import"));
        assert!(c.copy_source(&CopyTarget::Response).is_none());
        c.state.response = Some("r".to_string());
        assert_eq!(c.copy_source(&CopyTarget::Response).as_deref(), Some("r"));
    }
}
