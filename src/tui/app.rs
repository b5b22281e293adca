use crossterm::event::{KeyCode, KeyEvent};
use futures::StreamExt;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::Block;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    app::App,
    catalog::PromptItem,
    session::{CopyTarget, PanelMode, SessionController},
    tui::{
        components::{
            catalog::{code_copy_key, text_copy_key, Header, SectionView},
            help::HelpOverlay,
            playground::{random_quote, Playground, RESPONSE_COPY_KEY},
            sidebar::{sidebar_sections, Sidebar},
            status::{StatusBar, StatusKind, StatusMessage},
            Component,
        },
        events::Event,
        input::TextInput,
        keys::KeyMap,
        theme::ThemeContext,
        Frame,
    },
    utils::clipboard::{copy_in_background, CopyIndicator},
};

const SIDEBAR_WIDTH: u16 = 28;

/// Which pane receives plain keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Items,
    Search,
    Playground,
}

/// Main application state and controller
pub struct TuiApp<'a> {
    app: &'a App,
    controller: SessionController,
    theme: ThemeContext,
    keys: KeyMap,
    focus: Focus,
    /// Index into the sidebar's section order
    sidebar_cursor: usize,
    /// Index into the active section's visible items
    item_cursor: usize,
    search: TextInput,
    draft: TextInput,
    chat_input: TextInput,
    copy_indicator: CopyIndicator,
    status: Option<StatusMessage>,
    show_help: bool,
    expanded: bool,
    quote: &'static str,
    frame_count: usize,
    event_sender: mpsc::UnboundedSender<Event>,
    /// Whether the application should quit
    pub should_quit: bool,
}

impl<'a> TuiApp<'a> {
    pub fn new(app: &'a App, event_sender: mpsc::UnboundedSender<Event>) -> Self {
        let controller = app.new_session();
        let sidebar_cursor = controller
            .state()
            .active_section_id
            .as_deref()
            .and_then(|id| {
                sidebar_sections(controller.catalog())
                    .iter()
                    .position(|section| section.id == id)
            })
            .unwrap_or(0);

        Self {
            app,
            controller,
            theme: ThemeContext::new(app.config().theme_mode()),
            keys: KeyMap::default(),
            focus: Focus::Items,
            sidebar_cursor,
            item_cursor: 0,
            search: TextInput::single_line(),
            draft: TextInput::new(),
            chat_input: TextInput::single_line(),
            copy_indicator: CopyIndicator::default(),
            status: None,
            show_help: false,
            expanded: false,
            quote: random_quote(),
            frame_count: 0,
            event_sender,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Handle an event. Returns true when the application should exit.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => self.handle_paste(&text),
            Event::Resize(width, height) => debug!("Terminal resized to {}x{}", width, height),
            Event::Tick => self.on_tick(Instant::now()),
            Event::GenerationFinished(outcome) => {
                if self.controller.finish_run(outcome) {
                    self.announce("Response generated successfully.", StatusKind::Success);
                }
            }
            Event::ChatFragment { token, fragment } => {
                self.controller.apply_fragment(token, &fragment);
            }
            Event::ChatFinished(token) => {
                self.controller.finish_send(token);
            }
        }
        self.should_quit
    }

    fn announce(&mut self, text: impl Into<String>, kind: StatusKind) {
        let message = StatusMessage::new(text, kind, Instant::now());
        debug!("Status: {}", message.text);
        self.status = Some(message);
    }

    fn on_tick(&mut self, now: Instant) {
        self.copy_indicator.tick(now);
        if self.status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.status = None;
        }
        let state = self.controller.state();
        if state.loading || state.streaming {
            self.frame_count = self.frame_count.wrapping_add(1);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.keys.should_quit(&key) {
            info!("Quit requested");
            self.should_quit = true;
            return;
        }
        if self.show_help {
            self.show_help = false;
            return;
        }
        if self.keys.should_show_help(&key) {
            self.show_help = true;
            return;
        }

        if self.keys.run.matches(&key) {
            self.run_or_send();
        } else if self.keys.extended.matches(&key) {
            let enabled = self.controller.toggle_extended_reasoning();
            let text = if enabled {
                "Extended reasoning on"
            } else {
                "Extended reasoning off"
            };
            self.announce(text, StatusKind::Info);
        } else if self.keys.expand.matches(&key) {
            if self.controller.state().panel_open {
                self.expanded = !self.expanded;
            }
        } else if self.keys.clear_chat.matches(&key) {
            self.clear_chat();
        } else if self.keys.copy_response.matches(&key) {
            self.copy(CopyTarget::Response, RESPONSE_COPY_KEY.to_string());
        } else if self.keys.close.matches(&key) {
            self.close();
        } else {
            match self.focus {
                Focus::Search => self.handle_search_key(key),
                Focus::Playground => self.handle_playground_key(key),
                Focus::Sidebar | Focus::Items => self.handle_browse_key(key),
            }
        }
    }

    fn handle_paste(&mut self, text: &str) {
        match (self.focus, self.controller.state().mode) {
            (Focus::Search, _) => {
                self.search.insert_text(text);
                self.sync_search();
            }
            (Focus::Playground, PanelMode::Generator) => {
                self.draft.insert_text(text);
                self.controller.set_draft(self.draft.text());
            }
            (Focus::Playground, PanelMode::Chat) => {
                self.chat_input.insert_text(text);
                self.controller.set_chat_input(self.chat_input.text());
            }
            _ => {}
        }
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Items,
            Focus::Items | Focus::Search if self.controller.state().panel_open => Focus::Playground,
            Focus::Items | Focus::Search => Focus::Sidebar,
            Focus::Playground => Focus::Sidebar,
        };
    }

    /// Esc: leave search, then close the panel, then clear the search
    fn close(&mut self) {
        if self.focus == Focus::Search {
            self.focus = Focus::Items;
        } else if self.controller.state().panel_open {
            self.controller.close_panel();
            self.draft.clear();
            self.expanded = false;
            self.focus = Focus::Items;
        } else if !self.controller.state().search_term.is_empty() {
            self.search.clear();
            self.sync_search();
        }
    }

    fn sync_search(&mut self) {
        self.controller.set_search(self.search.text());
        self.item_cursor = 0;
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Down | KeyCode::Tab => self.focus = Focus::Items,
            _ => {
                if self.search.handle_key(&key) {
                    self.sync_search();
                }
            }
        }
    }

    fn handle_playground_key(&mut self, key: KeyEvent) {
        if self.keys.next_focus.matches(&key) {
            self.cycle_focus();
            return;
        }
        match self.controller.state().mode {
            PanelMode::Generator => {
                if self.draft.handle_key(&key) {
                    self.controller.set_draft(self.draft.text());
                }
            }
            PanelMode::Chat => {
                if key.code == KeyCode::Enter {
                    self.send();
                } else if self.chat_input.handle_key(&key) {
                    self.controller.set_chat_input(self.chat_input.text());
                }
            }
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        if self.keys.next_focus.matches(&key) {
            self.cycle_focus();
        } else if self.keys.help_alt.matches(&key) {
            self.show_help = true;
        } else if self.keys.search.matches(&key) {
            self.focus = Focus::Search;
        } else if self.keys.toggle_theme.matches(&key) {
            let mode = self.theme.toggle();
            self.announce(format!("Theme: {}", mode.label()), StatusKind::Info);
        } else if self.keys.open_chat.matches(&key) {
            self.open_chat();
        } else if self.keys.export.matches(&key) {
            self.export();
        } else if self.keys.copy_text.matches(&key) {
            if let Some(item) = self.highlighted_item() {
                self.copy(CopyTarget::ItemText(item.id.clone()), text_copy_key(&item.id));
            }
        } else if self.keys.copy_code.matches(&key) {
            if let Some(item) = self.highlighted_item() {
                self.copy(CopyTarget::ItemCode(item.id.clone()), code_copy_key(&item.id));
            }
        } else {
            match (self.focus, key.code) {
                (Focus::Sidebar, KeyCode::Up | KeyCode::Char('k')) => {
                    self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1);
                }
                (Focus::Sidebar, KeyCode::Down | KeyCode::Char('j')) => {
                    let last = sidebar_sections(self.controller.catalog()).len().saturating_sub(1);
                    self.sidebar_cursor = (self.sidebar_cursor + 1).min(last);
                }
                (Focus::Sidebar, KeyCode::Enter | KeyCode::Right | KeyCode::Char('l')) => {
                    self.select_sidebar_section();
                }
                (Focus::Items, KeyCode::Up | KeyCode::Char('k')) => {
                    self.item_cursor = self.item_cursor.saturating_sub(1);
                }
                (Focus::Items, KeyCode::Down | KeyCode::Char('j')) => {
                    let last = self.visible_item_count().saturating_sub(1);
                    self.item_cursor = (self.item_cursor + 1).min(last);
                }
                (Focus::Items, KeyCode::Left | KeyCode::Char('h')) => self.focus = Focus::Sidebar,
                (Focus::Items, KeyCode::Enter) => self.open_highlighted_item(),
                _ => {}
            }
        }
    }

    fn visible_item_count(&self) -> usize {
        self.controller
            .active_section()
            .map(|section| section.items.len())
            .unwrap_or(0)
    }

    fn highlighted_item(&self) -> Option<PromptItem> {
        let section = self.controller.active_section()?;
        let index = self.item_cursor.min(section.items.len().checked_sub(1)?);
        section.items.get(index).map(|item| (*item).clone())
    }

    fn select_sidebar_section(&mut self) {
        let Some(id) = sidebar_sections(self.controller.catalog())
            .get(self.sidebar_cursor)
            .map(|section| section.id.clone())
        else {
            return;
        };
        if self.controller.select_section(&id) {
            self.search.clear();
            self.item_cursor = 0;
            self.focus = Focus::Items;
        }
    }

    fn open_highlighted_item(&mut self) {
        let Some(item) = self.highlighted_item() else {
            return;
        };
        if self.controller.select_item(&item.id) {
            self.draft.set_text(&self.controller.state().draft);
            self.quote = random_quote();
            self.focus = Focus::Playground;
            self.announce(format!("Loaded prompt: {}", item.title), StatusKind::Info);
        }
    }

    fn open_chat(&mut self) {
        let state = self.controller.state();
        if !(state.panel_open && state.mode == PanelMode::Chat) {
            self.quote = random_quote();
        }
        self.controller.open_chat();
        self.chat_input.set_text(&self.controller.state().chat_input);
        self.focus = Focus::Playground;
    }

    fn run_or_send(&mut self) {
        let (panel_open, mode) = {
            let state = self.controller.state();
            (state.panel_open, state.mode)
        };
        if !panel_open {
            return;
        }
        match mode {
            PanelMode::Generator => self.run(),
            PanelMode::Chat => self.send(),
        }
    }

    fn run(&mut self) {
        let Some(ticket) = self.controller.begin_run() else {
            return;
        };
        self.announce("Generative AI is processing. Please wait.", StatusKind::Info);

        let client = self.app.generation_client().clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let outcome = ticket.execute(&client).await;
            if sender.send(Event::GenerationFinished(outcome)).is_err() {
                debug!("UI closed before generation finished");
            }
        });
    }

    fn send(&mut self) {
        self.controller.set_chat_input(self.chat_input.text());
        let Some(ticket) = self.controller.begin_send() else {
            return;
        };
        self.chat_input.clear();

        let client = self.app.chat_client().clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let mut fragments = ticket.execute(&client);
            while let Some(fragment) = fragments.next().await {
                let event = Event::ChatFragment {
                    token: ticket.token,
                    fragment,
                };
                if sender.send(event).is_err() {
                    return;
                }
            }
            let _ = sender.send(Event::ChatFinished(ticket.token));
        });
    }

    fn clear_chat(&mut self) {
        let state = self.controller.state();
        if !(state.panel_open && state.mode == PanelMode::Chat) {
            return;
        }
        if self.controller.clear_chat() {
            self.announce("Chat cleared", StatusKind::Info);
        } else {
            self.announce("Wait for the reply to finish before clearing", StatusKind::Error);
        }
    }

    fn copy(&mut self, target: CopyTarget, key: String) {
        match self.controller.copy_source(&target) {
            Some(text) => {
                copy_in_background(text);
                self.copy_indicator.mark(key, Instant::now());
            }
            None => debug!("Nothing to copy for {:?}", target),
        }
    }

    fn export(&mut self) {
        match self.app.export(None) {
            Ok(path) => {
                self.announce(format!("Exported catalog to {}", path.display()), StatusKind::Success);
            }
            Err(e) => {
                warn!("Export failed: {:#}", e);
                self.announce(format!("Export failed: {}", e), StatusKind::Error);
            }
        }
    }

    fn model_label(&self) -> String {
        self.app
            .config()
            .model_settings()
            .choose(self.controller.state().extended_reasoning)
            .model
    }

    /// Render the application
    pub fn render(&self, frame: &mut Frame) {
        let theme = self.theme.theme();
        let size = frame.size();
        frame.render_widget(Block::default().style(theme.base_style()), size);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(size);

        let state = self.controller.state();
        if state.panel_open && self.expanded {
            self.render_playground(frame, rows[0]);
        } else if state.panel_open {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(SIDEBAR_WIDTH),
                    Constraint::Min(30),
                    Constraint::Percentage(45),
                ])
                .split(rows[0]);
            self.render_browser(frame, columns[0], columns[1]);
            self.render_playground(frame, columns[2]);
        } else {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(30)])
                .split(rows[0]);
            self.render_browser(frame, columns[0], columns[1]);
        }

        StatusBar {
            message: self.status.as_ref(),
            provider: self.app.llm_provider().name(),
            busy: state.loading || state.streaming,
        }
        .render(frame, rows[1], theme);

        if self.show_help {
            HelpOverlay { keys: &self.keys }.render(frame, size, theme);
        }
    }

    fn render_browser(&self, frame: &mut Frame, sidebar_area: Rect, content_area: Rect) {
        let theme = self.theme.theme();
        let state = self.controller.state();
        let now = Instant::now();

        Sidebar {
            catalog: self.controller.catalog(),
            active_section_id: state.active_section_id.as_deref(),
            cursor: self.sidebar_cursor,
            focused: self.focus == Focus::Sidebar,
        }
        .render(frame, sidebar_area, theme);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(content_area);

        Header {
            search: &self.search,
            focused: self.focus == Focus::Search,
            theme_mode: self.theme.mode(),
            extended_reasoning: state.extended_reasoning,
        }
        .render(frame, rows[0], theme);

        let active = self.controller.active_section();
        let summary = self.controller.search_summary();
        SectionView {
            section: active.as_ref(),
            search_term: &state.search_term,
            summary: summary.as_deref(),
            cursor: self.item_cursor,
            focused: self.focus == Focus::Items,
            copied: self.copy_indicator.active(now),
        }
        .render(frame, rows[1], theme);
    }

    fn render_playground(&self, frame: &mut Frame, area: Rect) {
        let model = self.model_label();
        Playground {
            state: self.controller.state(),
            draft: &self.draft,
            chat_input: &self.chat_input,
            focused: self.focus == Focus::Playground,
            quote: self.quote,
            model: &model,
            copied: self.copy_indicator.active(Instant::now()),
            frame_count: self.frame_count,
        }
        .render(frame, area, self.theme.theme());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        llm::mock::{MockProvider, MockReply},
        session::ChatTurn,
        tui::theme::ThemeMode,
    };
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn test_app(replies: Vec<MockReply>) -> (App, Arc<MockProvider>) {
        let provider = Arc::new(MockProvider::new(replies));
        let app = App::with_provider(Config::default(), provider.clone());
        (app, provider)
    }

    fn press(ui: &mut TuiApp, code: KeyCode) {
        ui.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn ctrl(ui: &mut TuiApp, c: char) {
        ui.handle_event(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)));
    }

    fn type_text(ui: &mut TuiApp, text: &str) {
        for c in text.chars() {
            press(ui, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_quit_and_help() {
        let (app, _) = test_app(Vec::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ui = TuiApp::new(&app, tx);

        press(&mut ui, KeyCode::F(1));
        assert!(ui.show_help);
        // Any key closes the overlay without acting
        press(&mut ui, KeyCode::Char('t'));
        assert!(!ui.show_help);
        assert_eq!(ui.theme.mode(), ThemeMode::Light);

        assert!(ui.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))));
    }

    #[test]
    fn test_search_and_clear_canvas() {
        let (app, _) = test_app(Vec::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ui = TuiApp::new(&app, tx);

        press(&mut ui, KeyCode::Char('/'));
        assert_eq!(ui.focus(), Focus::Search);
        type_text(&mut ui, "jql");
        assert_eq!(ui.controller().state().search_term, "jql");
        assert_eq!(ui.controller().active_section().unwrap().id(), "jira-auto");

        press(&mut ui, KeyCode::Esc);
        assert_eq!(ui.focus(), Focus::Items);
        assert_eq!(ui.controller().state().search_term, "jql");

        press(&mut ui, KeyCode::Esc);
        assert!(ui.controller().state().search_term.is_empty());
        assert!(ui.search.is_empty());
    }

    #[test]
    fn test_sidebar_selection() {
        let (app, _) = test_app(Vec::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ui = TuiApp::new(&app, tx);

        press(&mut ui, KeyCode::Left);
        assert_eq!(ui.focus(), Focus::Sidebar);
        press(&mut ui, KeyCode::Down);
        press(&mut ui, KeyCode::Enter);

        let expected = sidebar_sections(ui.controller().catalog())[1].id.clone();
        assert_eq!(ui.controller().state().active_section_id.as_deref(), Some(expected.as_str()));
        assert_eq!(ui.focus(), Focus::Items);
    }

    #[test]
    fn test_open_item_loads_playground() {
        let (app, _) = test_app(Vec::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ui = TuiApp::new(&app, tx);

        press(&mut ui, KeyCode::Down);
        press(&mut ui, KeyCode::Enter);

        let state = ui.controller().state();
        let item = state.selected_item.clone().unwrap();
        assert!(state.panel_open);
        assert_eq!(state.mode, PanelMode::Generator);
        assert_eq!(ui.draft.text(), item.text);
        assert_eq!(ui.focus(), Focus::Playground);
        assert_eq!(ui.status().unwrap().text, format!("Loaded prompt: {}", item.title));

        type_text(&mut ui, "!");
        assert!(ui.controller().state().draft.ends_with('!'));

        press(&mut ui, KeyCode::Esc);
        assert!(!ui.controller().state().panel_open);
        assert!(ui.draft.is_empty());
    }

    #[tokio::test]
    async fn test_run_delivers_response() {
        let (app, provider) = test_app(vec![MockReply::text("## Charter\nDone")]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ui = TuiApp::new(&app, tx);

        press(&mut ui, KeyCode::Enter);
        ctrl(&mut ui, 'r');
        assert!(ui.controller().state().loading);
        // A second run while loading is ignored
        ctrl(&mut ui, 'r');

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::GenerationFinished(_)));
        ui.handle_event(event);

        assert_eq!(ui.controller().state().response.as_deref(), Some("## Charter\nDone"));
        assert_eq!(ui.status().unwrap().text, "Response generated successfully.");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_streams_fragments() {
        let (app, _) = test_app(vec![MockReply::fragments(&["Hello", " there"])]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ui = TuiApp::new(&app, tx);

        press(&mut ui, KeyCode::Char('c'));
        assert_eq!(ui.controller().state().mode, PanelMode::Chat);
        type_text(&mut ui, "hi");
        press(&mut ui, KeyCode::Enter);
        assert!(ui.controller().state().streaming);
        assert!(ui.chat_input.is_empty());

        // Clearing is refused mid-stream
        ctrl(&mut ui, 'l');
        assert_eq!(ui.controller().state().history.len(), 2);

        while let Some(event) = rx.recv().await {
            let done = matches!(event, Event::ChatFinished(_));
            ui.handle_event(event);
            if done {
                break;
            }
        }

        let state = ui.controller().state();
        assert!(!state.streaming);
        assert_eq!(state.history.last(), Some(&ChatTurn::model("Hello there")));

        ctrl(&mut ui, 'l');
        assert!(ui.controller().state().history.is_empty());
    }

    #[test]
    fn test_theme_and_extended_toggles() {
        let (app, _) = test_app(Vec::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ui = TuiApp::new(&app, tx);

        press(&mut ui, KeyCode::Char('t'));
        assert_eq!(ui.theme.mode(), ThemeMode::Dark);
        press(&mut ui, KeyCode::Char('t'));
        assert_eq!(ui.theme.mode(), ThemeMode::HighContrast);

        assert_eq!(ui.model_label(), "gemini-2.5-flash");
        ctrl(&mut ui, 'e');
        assert!(ui.controller().state().extended_reasoning);
        assert_eq!(ui.model_label(), "gemini-2.5-pro");
    }

    #[test]
    fn test_focus_cycle_skips_closed_panel() {
        let (app, _) = test_app(Vec::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ui = TuiApp::new(&app, tx);

        press(&mut ui, KeyCode::Tab);
        assert_eq!(ui.focus(), Focus::Sidebar);
        press(&mut ui, KeyCode::Tab);
        assert_eq!(ui.focus(), Focus::Items);

        press(&mut ui, KeyCode::Char('c'));
        press(&mut ui, KeyCode::Tab);
        assert_eq!(ui.focus(), Focus::Sidebar);
        press(&mut ui, KeyCode::Tab);
        press(&mut ui, KeyCode::Tab);
        assert_eq!(ui.focus(), Focus::Playground);
    }
}
