use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use crate::college::CollegeRecord;
use crate::compare::{
    build_comparison_table, AddOutcome, ComparisonSet, ComparisonTable, FieldDescriptor,
    ToggleOutcome,
};
use crate::session::SelectionState;
use crate::source::CollegeFilter;
use crate::tui::theme::ThemeColors;

const MAX_UNDO: usize = 50;
const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Browse,
    Compare,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Search,
    Detail,
    Help,
}

/// Selection changes that `z` can revert
#[derive(Debug, Clone)]
pub enum UndoAction {
    Added { id: u64, name: String },
    Removed { index: usize, college: CollegeRecord },
    Cleared { members: Vec<CollegeRecord> },
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub text: String,
    pub is_error: bool,
    shown_at: Instant,
}

pub struct App {
    pub colleges: Vec<CollegeRecord>,
    pub table_state: ratatui::widgets::TableState,
    /// Highlighted column in the compare view
    pub compare_cursor: usize,
    pub current_view: View,
    pub selection: ComparisonSet,
    pub compare_fields: Vec<FieldDescriptor>,
    /// Where the selection is saved after every change; `None` disables saving
    pub selection_path: Option<PathBuf>,
    pub filter: CollegeFilter,
    pub input_mode: InputMode,
    pub search_input: String,
    pub flash_message: Option<Flash>,
    pub undo_stack: VecDeque<UndoAction>,
    pub last_refresh: Instant,
    pub needs_refresh: bool,
    pub force_refresh: bool,
    pub should_quit: bool,
    pub is_loading: bool,
    pub spinner_frame: usize,
    pub theme: ThemeColors,
    pub source_label: String,
}

impl App {
    /// App in loading state; colleges arrive from the first background fetch
    pub fn new(
        selection: ComparisonSet,
        compare_fields: Vec<FieldDescriptor>,
        selection_path: Option<PathBuf>,
        page_size: usize,
        theme: ThemeColors,
        source_label: String,
    ) -> Self {
        Self {
            colleges: Vec::new(),
            table_state: ratatui::widgets::TableState::default(),
            compare_cursor: 0,
            current_view: View::Browse,
            selection,
            compare_fields,
            selection_path,
            filter: CollegeFilter {
                limit: Some(page_size),
                ..Default::default()
            },
            input_mode: InputMode::Normal,
            search_input: String::new(),
            flash_message: None,
            undo_stack: VecDeque::new(),
            last_refresh: Instant::now(),
            needs_refresh: false,
            force_refresh: false,
            should_quit: false,
            is_loading: true,
            spinner_frame: 0,
            theme,
            source_label,
        }
    }

    fn current_len(&self) -> usize {
        match self.current_view {
            View::Browse => self.colleges.len(),
            View::Compare => self.selection.len(),
        }
    }

    pub fn next_row(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        match self.current_view {
            View::Browse => {
                let i = match self.table_state.selected() {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                };
                self.table_state.select(Some(i));
            }
            View::Compare => self.compare_cursor = (self.compare_cursor + 1) % len,
        }
    }

    pub fn previous_row(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        match self.current_view {
            View::Browse => {
                let i = match self.table_state.selected() {
                    Some(0) | None => len - 1,
                    Some(i) => i - 1,
                };
                self.table_state.select(Some(i));
            }
            View::Compare => {
                self.compare_cursor = self.compare_cursor.checked_sub(1).unwrap_or(len - 1)
            }
        }
    }

    /// College under the cursor in the current view
    pub fn selected_college(&self) -> Option<&CollegeRecord> {
        match self.current_view {
            View::Browse => self
                .table_state
                .selected()
                .and_then(|i| self.colleges.get(i)),
            View::Compare => self.selection.members().get(self.compare_cursor),
        }
    }

    pub fn comparison_table(&self) -> ComparisonTable {
        build_comparison_table(self.selection.members(), &self.compare_fields)
    }

    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push_front(action);
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.pop_back();
        }
    }

    pub fn update_flash(&mut self) {
        if let Some(ref flash) = self.flash_message {
            if flash.shown_at.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, text: String) {
        self.flash_message = Some(Flash {
            text,
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn show_error(&mut self, text: String) {
        self.flash_message = Some(Flash {
            text,
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    /// Add or remove the highlighted college (Browse view only)
    pub fn toggle_selected(&mut self) {
        if self.current_view != View::Browse {
            return;
        }
        let Some(college) = self.selected_college().cloned() else {
            return;
        };
        let index = self.selection.position(college.id);
        let name = college.display_name().to_string();

        match self.selection.toggle(college.clone()) {
            Ok(ToggleOutcome::Added) => {
                self.push_undo(UndoAction::Added {
                    id: college.id,
                    name: name.clone(),
                });
                self.show_flash(format!(
                    "Added: {} ({}/{})",
                    name,
                    self.selection.len(),
                    self.selection.max()
                ));
            }
            Ok(ToggleOutcome::Removed) => {
                self.push_undo(UndoAction::Removed {
                    index: index.unwrap_or(0),
                    college,
                });
                self.show_flash(format!("Removed: {} (z to undo)", name));
            }
            Err(e) => {
                self.show_error(e.to_string());
                return;
            }
        }
        self.persist_selection();
    }

    /// Add the highlighted college; a no-op when it is already selected
    pub fn add_selected(&mut self) {
        if self.current_view != View::Browse {
            return;
        }
        let Some(college) = self.selected_college().cloned() else {
            return;
        };
        let name = college.display_name().to_string();
        let id = college.id;

        match self.selection.add(college) {
            Ok(AddOutcome::Added) => {
                self.push_undo(UndoAction::Added {
                    id,
                    name: name.clone(),
                });
                self.show_flash(format!(
                    "Added: {} ({}/{})",
                    name,
                    self.selection.len(),
                    self.selection.max()
                ));
                self.persist_selection();
            }
            Ok(AddOutcome::AlreadyPresent) => {
                self.show_flash(format!("{} is already in the comparison", name));
            }
            Err(e) => self.show_error(e.to_string()),
        }
    }

    /// Remove the highlighted college from the comparison
    pub fn remove_selected(&mut self) {
        let Some(id) = self.selected_college().map(|c| c.id) else {
            return;
        };
        let Some(index) = self.selection.position(id) else {
            return;
        };
        let Some(college) = self.selection.members().get(index).cloned() else {
            return;
        };

        self.selection.remove(id);
        self.clamp_compare_cursor();
        self.show_flash(format!("Removed: {} (z to undo)", college.display_name()));
        self.push_undo(UndoAction::Removed { index, college });
        self.persist_selection();
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            self.show_flash("Comparison is already empty".to_string());
            return;
        }
        let members = self.selection.members().to_vec();
        let count = members.len();
        self.selection.clear();
        self.compare_cursor = 0;
        self.push_undo(UndoAction::Cleared { members });
        self.show_flash(format!("Cleared {} colleges (z to undo)", count));
        self.persist_selection();
    }

    /// Undo the last add, remove or clear
    pub fn undo_last(&mut self) {
        let Some(action) = self.undo_stack.pop_front() else {
            self.show_flash("Nothing to undo".to_string());
            return;
        };

        match action {
            UndoAction::Added { id, name } => {
                self.selection.remove(id);
                self.clamp_compare_cursor();
                self.show_flash(format!("Undid add: {}", name));
            }
            UndoAction::Removed { index, college } => {
                let name = college.display_name().to_string();
                match self.selection.insert_at(index, college) {
                    Ok(_) => self.show_flash(format!("Undid remove: {}", name)),
                    Err(e) => {
                        self.show_error(format!("Cannot undo remove: {}", e));
                        return;
                    }
                }
            }
            UndoAction::Cleared { members } => {
                let mut restored = 0;
                let mut overflow = false;
                for (index, college) in members.into_iter().enumerate() {
                    match self.selection.insert_at(index, college) {
                        Ok(AddOutcome::Added) => restored += 1,
                        Ok(AddOutcome::AlreadyPresent) => {}
                        Err(_) => overflow = true,
                    }
                }
                if overflow {
                    self.show_error(format!(
                        "Restored {} colleges; the rest did not fit",
                        restored
                    ));
                } else {
                    self.show_flash(format!("Undid clear: {} colleges restored", restored));
                }
            }
        }
        self.persist_selection();
    }

    fn clamp_compare_cursor(&mut self) {
        let len = self.selection.len();
        if self.compare_cursor >= len {
            self.compare_cursor = len.saturating_sub(1);
        }
    }

    /// Save the selection so the next session starts with it
    fn persist_selection(&mut self) {
        let Some(ref path) = self.selection_path else {
            return;
        };
        let state = SelectionState::from_set(&self.selection);
        if let Err(e) = crate::session::save_selection(path, &state) {
            tracing::warn!(error = %e, "failed to save selection");
            self.show_error(format!("Failed to save selection: {}", e));
        }
    }

    /// Open the highlighted college's website in the browser
    pub fn open_selected(&mut self) {
        let Some(college) = self.selected_college() else {
            return;
        };
        match crate::browser::open_website(college) {
            Ok(url) => self.show_flash(format!("Opened: {}", url)),
            Err(e) => self.show_error(e.to_string()),
        }
    }

    pub fn toggle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Browse => View::Compare,
            View::Compare => View::Browse,
        };
        self.clamp_compare_cursor();
    }

    pub fn start_search(&mut self) {
        self.search_input = self.filter.search.clone().unwrap_or_default();
        self.input_mode = InputMode::Search;
    }

    /// Apply the typed search term and schedule a refetch
    pub fn confirm_search(&mut self) {
        let term = self.search_input.trim().to_string();
        self.filter.search = if term.is_empty() { None } else { Some(term) };
        self.input_mode = InputMode::Normal;
        self.current_view = View::Browse;
        self.needs_refresh = true;
    }

    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
    }

    pub fn show_detail(&mut self) {
        if self.selected_college().is_some() {
            self.input_mode = InputMode::Detail;
        }
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_popup(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Manual refresh: refetch bypassing cached responses
    pub fn request_refresh(&mut self) {
        self.needs_refresh = true;
        self.force_refresh = true;
        self.show_flash("Refreshing (fresh data)...".to_string());
    }

    /// Replace the list with fresh data from a fetch
    pub fn update_colleges(&mut self, colleges: Vec<CollegeRecord>) {
        self.colleges = colleges;

        if self.colleges.is_empty() {
            self.table_state.select(None);
        } else {
            match self.table_state.selected() {
                Some(selected) if selected >= self.colleges.len() => {
                    self.table_state.select(Some(self.colleges.len() - 1))
                }
                Some(_) => {}
                None => self.table_state.select(Some(0)),
            }
        }

        self.last_refresh = Instant::now();
        let message = match self.filter.search {
            Some(ref term) => format!("Found {} colleges matching '{}'", self.colleges.len(), term),
            None => format!("Loaded {} colleges", self.colleges.len()),
        };
        self.show_flash(message);
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::default_fields;

    fn college(id: u64) -> CollegeRecord {
        CollegeRecord::new(id, &format!("College {}", id), "Somewhere")
    }

    fn app_with(ids: &[u64]) -> App {
        let mut app = App::new(
            ComparisonSet::new(),
            default_fields(),
            None,
            50,
            ThemeColors::dark(),
            "test".to_string(),
        );
        app.update_colleges(ids.iter().map(|id| college(*id)).collect());
        app
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app_with(&[1, 2, 3]);
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(2));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut app = app_with(&[1, 2]);
        app.toggle_selected();
        assert_eq!(app.selection.ids(), vec![1]);
        app.toggle_selected();
        assert!(app.selection.is_empty());
        assert_eq!(app.undo_stack.len(), 2);
    }

    #[test]
    fn test_limit_reached_shows_error_and_keeps_set() {
        let mut app = app_with(&[1, 2, 3, 4, 5]);
        for _ in 0..4 {
            app.add_selected();
            app.next_row();
        }
        assert_eq!(app.selection.ids(), vec![1, 2, 3, 4]);

        app.add_selected();
        assert_eq!(app.selection.ids(), vec![1, 2, 3, 4]);
        let flash = app.flash_message.as_ref().unwrap();
        assert!(flash.is_error);
        assert!(flash.text.starts_with("Limit reached"));
        // Failed adds are not undoable
        assert_eq!(app.undo_stack.len(), 4);
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut app = app_with(&[1]);
        app.add_selected();
        app.add_selected();
        assert_eq!(app.selection.ids(), vec![1]);
        assert_eq!(app.undo_stack.len(), 1);
    }

    #[test]
    fn test_undo_remove_restores_position() {
        let mut app = app_with(&[1, 2, 3]);
        for _ in 0..3 {
            app.add_selected();
            app.next_row();
        }
        app.toggle_view();
        app.compare_cursor = 1;
        app.remove_selected();
        assert_eq!(app.selection.ids(), vec![1, 3]);

        app.undo_last();
        assert_eq!(app.selection.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_undo_clear_and_add() {
        let mut app = app_with(&[1, 2]);
        app.add_selected();
        app.next_row();
        app.add_selected();
        app.clear_selection();
        assert!(app.selection.is_empty());

        app.undo_last();
        assert_eq!(app.selection.ids(), vec![1, 2]);

        app.undo_last();
        assert_eq!(app.selection.ids(), vec![1]);

        app.undo_last();
        app.undo_last();
        assert_eq!(app.flash_message.as_ref().unwrap().text, "Nothing to undo");
    }

    #[test]
    fn test_compare_cursor_clamped_after_remove() {
        let mut app = app_with(&[1, 2]);
        app.add_selected();
        app.next_row();
        app.add_selected();
        app.toggle_view();
        app.next_row();
        assert_eq!(app.compare_cursor, 1);
        app.remove_selected();
        assert_eq!(app.compare_cursor, 0);
        assert_eq!(app.selected_college().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_confirm_search_sets_filter() {
        let mut app = app_with(&[1]);
        app.start_search();
        app.search_input = "  iit ".to_string();
        app.confirm_search();
        assert_eq!(app.filter.search.as_deref(), Some("iit"));
        assert!(app.needs_refresh);
        assert_eq!(app.input_mode, InputMode::Normal);

        app.start_search();
        assert_eq!(app.search_input, "iit");
        app.search_input.clear();
        app.confirm_search();
        assert_eq!(app.filter.search, None);
    }

    #[test]
    fn test_update_colleges_clamps_selection() {
        let mut app = app_with(&[1, 2, 3]);
        app.table_state.select(Some(2));
        app.update_colleges(vec![college(1)]);
        assert_eq!(app.table_state.selected(), Some(0));
        app.update_colleges(Vec::new());
        assert_eq!(app.table_state.selected(), None);
    }

    #[test]
    fn test_selection_persisted_after_change() {
        let path = std::env::temp_dir().join(format!(
            "college-compare-tui-selection-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut app = app_with(&[1, 2]);
        app.selection_path = Some(path.clone());
        app.add_selected();

        let saved = crate::session::load_selection(&path).unwrap();
        assert_eq!(saved.college_ids, vec![1]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_comparison_table_follows_selection() {
        let mut app = app_with(&[1, 2]);
        app.add_selected();
        app.next_row();
        app.add_selected();
        let table = app.comparison_table();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.rows.len(), default_fields().len());
    }
}
