mod ui;
pub(crate) mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::db::{Database, KeyValueStore};
use crate::models::{ItemType, PlanEntry};
use crate::store::StudyPlanStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Videos,
    Articles,
    Questions,
    Completed,
    Detail,
}

impl View {
    const TABS: [View; 5] = [
        View::Overview,
        View::Videos,
        View::Articles,
        View::Questions,
        View::Completed,
    ];

    fn index(&self) -> usize {
        Self::TABS.iter().position(|v| v == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::TABS[(self.index() + 1) % Self::TABS.len()]
    }

    fn prev(&self) -> Self {
        Self::TABS[(self.index() + Self::TABS.len() - 1) % Self::TABS.len()]
    }

    fn is_list(&self) -> bool {
        !matches!(self, View::Overview | View::Detail)
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    /// Swap in new items, keeping the cursor in range.
    fn replace(&mut self, items: Vec<T>) {
        self.selected = match (self.selected, items.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.items = items;
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i >= self.items.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn first(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    fn last(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(self.items.len() - 1);
        }
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App<S: KeyValueStore> {
    store: StudyPlanStore<S>,
    pub view: View,
    /// Entry ids per list tab: videos, articles, questions, completed.
    lists: [StatefulList<String>; 4],
    pub detail_id: Option<String>,
    detail_return: View,
    pub show_answer: bool,
    pub filter: Option<String>,
    pub filter_input: String,
    pub filter_mode: bool,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: StudyPlanStore<S>) -> Self {
        let mut app = Self {
            store,
            view: View::Overview,
            lists: std::array::from_fn(|_| StatefulList::with_items(Vec::new())),
            detail_id: None,
            detail_return: View::Videos,
            show_answer: false,
            filter: None,
            filter_input: String::new(),
            filter_mode: false,
            status: None,
            should_quit: false,
        };
        app.refresh_lists();
        app
    }

    pub fn store(&self) -> &StudyPlanStore<S> {
        &self.store
    }

    pub fn list(&self, view: View) -> Option<&StatefulList<String>> {
        let slot = view.index().checked_sub(1)?;
        self.lists.get(slot)
    }

    fn list_mut(&mut self, view: View) -> Option<&mut StatefulList<String>> {
        let slot = view.index().checked_sub(1)?;
        self.lists.get_mut(slot)
    }

    /// Entries shown on a list tab, after the title filter.
    pub fn entries_for(&self, view: View) -> Vec<PlanEntry<'_>> {
        let tabs = &self.store.plan().tabs;
        let entries: Vec<PlanEntry> = match view {
            View::Videos => tabs.entries().filter(|e| e.item_type() == ItemType::Videos).collect(),
            View::Articles => tabs
                .entries()
                .filter(|e| e.item_type() == ItemType::Articles)
                .collect(),
            View::Questions => tabs
                .entries()
                .filter(|e| e.item_type() == ItemType::Questions)
                .collect(),
            View::Completed => tabs.completed(),
            View::Overview | View::Detail => Vec::new(),
        };

        match &self.filter {
            Some(needle) => {
                let needle = needle.to_lowercase();
                entries
                    .into_iter()
                    .filter(|e| e.title().to_lowercase().contains(&needle))
                    .collect()
            }
            None => entries,
        }
    }

    pub fn detail_entry(&self) -> Option<PlanEntry<'_>> {
        self.detail_id.as_deref().and_then(|id| self.store.find(id))
    }

    fn refresh_lists(&mut self) {
        for view in &View::TABS[1..] {
            let ids: Vec<String> = self
                .entries_for(*view)
                .iter()
                .map(|e| e.id().to_string())
                .collect();
            if let Some(list) = self.list_mut(*view) {
                list.replace(ids);
            }
        }
    }

    fn selected_id(&self) -> Option<String> {
        match self.view {
            View::Detail => self.detail_id.clone(),
            view => self.list(view)?.selected_item().cloned(),
        }
    }

    fn open_detail(&mut self) {
        if let Some(id) = self.selected_id() {
            self.detail_return = self.view;
            self.detail_id = Some(id);
            self.show_answer = false;
            self.view = View::Detail;
        }
    }

    fn close_detail(&mut self) {
        self.view = self.detail_return;
        self.detail_id = None;
        self.show_answer = false;
    }

    fn toggle_selected(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(id) = self.selected_id() else {
            return Ok(());
        };
        if let Some(done) = self.store.toggle_complete(&id)? {
            let state = if done { "done" } else { "not done" };
            self.status = Some(format!(
                "Marked {}. Progress {}%",
                state,
                self.store.plan().progress
            ));
        }
        self.refresh_lists();
        Ok(())
    }

    fn delete_selected(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(id) = self.selected_id() else {
            return Ok(());
        };
        if self.store.delete_item(&id)? {
            self.status = Some("Deleted.".to_string());
        }
        if self.view == View::Detail {
            self.close_detail();
        }
        self.refresh_lists();
        Ok(())
    }

    fn apply_filter(&mut self) {
        self.filter = if self.filter_input.is_empty() {
            None
        } else {
            Some(self.filter_input.clone())
        };
        self.refresh_lists();
    }

    fn handle_key(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.filter_mode {
            match key {
                KeyCode::Esc => {
                    self.filter_mode = false;
                    self.filter_input.clear();
                }
                KeyCode::Enter => {
                    self.filter_mode = false;
                    self.apply_filter();
                }
                KeyCode::Backspace => {
                    self.filter_input.pop();
                }
                KeyCode::Char(c) => {
                    self.filter_input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        self.status = None;

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.store.reload()?;
                self.refresh_lists();
                self.status = Some("Reloaded.".to_string());
            }

            KeyCode::Char('/') if self.view.is_list() => {
                self.filter_mode = true;
                self.filter_input.clear();
            }

            KeyCode::Esc => match self.view {
                View::Detail => self.close_detail(),
                _ if self.filter.is_some() => {
                    self.filter_input.clear();
                    self.apply_filter();
                }
                _ => {}
            },

            KeyCode::Char('h') | KeyCode::Left => match self.view {
                View::Detail => self.close_detail(),
                _ => self.view = self.view.prev(),
            },
            KeyCode::Char('l') | KeyCode::Right => match self.view {
                view if view.is_list() => self.open_detail(),
                View::Detail => {}
                _ => self.view = self.view.next(),
            },

            KeyCode::Tab if self.view != View::Detail => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.view = self.view.prev();
                } else {
                    self.view = self.view.next();
                }
            }
            KeyCode::BackTab if self.view != View::Detail => {
                self.view = self.view.prev();
            }

            // Jump straight to a tab
            KeyCode::Char(c @ '1'..='5') if self.view != View::Detail => {
                let i = c as usize - '1' as usize;
                self.view = View::TABS[i];
            }

            KeyCode::Char('j') | KeyCode::Down => {
                let view = self.view;
                if let Some(list) = self.list_mut(view) {
                    list.next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let view = self.view;
                if let Some(list) = self.list_mut(view) {
                    list.previous();
                }
            }
            KeyCode::Char('g') => {
                let view = self.view;
                if let Some(list) = self.list_mut(view) {
                    list.first();
                }
            }
            KeyCode::Char('G') => {
                let view = self.view;
                if let Some(list) = self.list_mut(view) {
                    list.last();
                }
            }

            KeyCode::Enter if self.view.is_list() => self.open_detail(),

            KeyCode::Char(' ') | KeyCode::Char('x') if self.view != View::Overview => {
                self.toggle_selected()?;
            }
            KeyCode::Char('d') if self.view != View::Overview => {
                self.delete_selected()?;
            }

            KeyCode::Char('a') if self.view == View::Detail => {
                self.show_answer = !self.show_answer;
            }

            _ => {}
        }
        Ok(())
    }
}

pub fn run(db: Database) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(StudyPlanStore::load(db));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers)?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
