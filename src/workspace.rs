use chrono::Local;

use crate::board::{Boards, Priority};
use crate::history::HistoryLog;
use crate::progress::{self, ProgressState};
use crate::registry::{self, Characters, SceneStatus, Scenes};
use crate::sprint::{AttachTarget, SprintRecord, SprintTimer};
use crate::storage::{keys, Store};

/// The whole application state, loaded once and passed around explicitly.
/// Every mutating operation persists its own collection afterwards; writes
/// are whole-document and failures degrade silently (the in-memory state
/// stays authoritative for the rest of the session).
#[derive(Debug)]
pub struct Workspace<S: Store> {
    store: S,
    pub boards: Boards,
    pub timer: SprintTimer,
    pub history: HistoryLog,
    pub progress: ProgressState,
    pub characters: Characters,
    pub scenes: Scenes,
    pub editor_text: String,
}

impl<S: Store> Workspace<S> {
    /// Load every collection, falling back to defaults for missing or
    /// unparseable documents.
    pub fn load(store: S) -> Self {
        let boards = store.load_json(keys::BOARDS);
        let timer = store.load_json(keys::TIMER);
        let history = store.load_json(keys::HISTORY);
        let progress = store.load_json(keys::PROGRESS);
        let characters = store.load_json(keys::CHARACTERS);
        let scenes = store.load_json(keys::SCENES);
        let editor_text = store.load_json(keys::EDITOR);
        Self {
            store,
            boards,
            timer,
            history,
            progress,
            characters,
            scenes,
            editor_text,
        }
    }

    pub fn save_boards(&self) {
        let _ = self.store.save_json(keys::BOARDS, &self.boards);
    }

    pub fn save_timer(&self) {
        let _ = self.store.save_json(keys::TIMER, &self.timer);
    }

    pub fn save_history(&self) {
        let _ = self.store.save_json(keys::HISTORY, &self.history);
    }

    pub fn save_progress(&self) {
        let _ = self.store.save_json(keys::PROGRESS, &self.progress);
    }

    pub fn save_registries(&self) {
        let _ = self.store.save_json(keys::CHARACTERS, &self.characters);
        let _ = self.store.save_json(keys::SCENES, &self.scenes);
    }

    pub fn save_editor(&self) {
        let _ = self.store.save_json(keys::EDITOR, &self.editor_text);
    }

    pub fn save_all(&self) {
        self.save_boards();
        self.save_timer();
        self.save_history();
        self.save_progress();
        self.save_registries();
        self.save_editor();
    }

    // ---- boards ----

    pub fn create_board(
        &mut self,
        title: &str,
        description: &str,
        word_goal: u32,
        initial_card_titles: &[&str],
    ) -> String {
        let id = self
            .boards
            .create_board(title, description, word_goal, initial_card_titles);
        self.save_boards();
        id
    }

    pub fn delete_board(&mut self, id: &str) {
        self.boards.delete_board(id);
        self.save_boards();
    }

    pub fn add_card(&mut self, board_id: &str, title: &str, description: &str) -> Option<String> {
        let id = self.boards.add_card(board_id, title, description);
        if id.is_some() {
            self.save_boards();
        }
        id
    }

    pub fn delete_card(&mut self, board_id: &str, card_id: &str) {
        self.boards.delete_card(board_id, card_id);
        self.save_boards();
    }

    pub fn move_card(&mut self, card_id: &str, from_board: &str, to_board: &str, target_list: &str) {
        self.boards.move_card(card_id, from_board, to_board, target_list);
        self.save_boards();
    }

    pub fn set_card_goal(&mut self, card_id: &str, board_id: &str, goal: u32) {
        self.boards.set_card_goal(card_id, board_id, goal);
        self.save_boards();
    }

    pub fn set_card_priority(&mut self, card_id: &str, board_id: &str, priority: Priority) {
        self.boards.set_card_priority(card_id, board_id, priority);
        self.save_boards();
    }

    pub fn toggle_collapsed(&mut self, board_id: &str, list_id: &str) {
        self.boards.toggle_collapsed(board_id, list_id);
        self.save_boards();
    }

    // ---- sprint timer ----

    pub fn start_sprint(&mut self) {
        self.timer.start();
        self.save_timer();
    }

    pub fn pause_sprint(&mut self) {
        self.timer.pause();
        self.save_timer();
    }

    pub fn reset_sprint(&mut self) {
        self.timer.reset();
        self.save_timer();
    }

    pub fn set_sprint_title(&mut self, title: &str) {
        self.timer.title = title.to_string();
        self.save_timer();
    }

    /// Boards first, then their cards, in display order.
    pub fn attach_targets(&self) -> Vec<AttachTarget> {
        let mut targets: Vec<AttachTarget> = self
            .boards
            .boards
            .iter()
            .map(|b| AttachTarget::Board(b.id.clone()))
            .collect();
        targets.extend(
            self.boards
                .all_cards()
                .into_iter()
                .map(|(_, _, c)| AttachTarget::Card(c.id.clone())),
        );
        targets
    }

    pub fn set_attach_target(&mut self, target: Option<AttachTarget>) {
        self.timer.target = target;
        self.save_timer();
    }

    /// Log the record, credit the attachment target if one was selected, and
    /// persist everything the completion touched.
    fn record_sprint(&mut self, record: SprintRecord) -> SprintRecord {
        let stored = self.history.push(record);
        if let Some(target) = stored.target.clone() {
            self.boards.attach_sprint(&target, &stored);
            self.save_boards();
        }
        self.save_history();
        self.save_timer();
        stored
    }

    /// Advance the countdown by one second. Returns the completed record when
    /// the sprint finished on this tick.
    pub fn on_tick(&mut self) -> Option<SprintRecord> {
        let record = self.timer.tick(&self.editor_text)?;
        Some(self.record_sprint(record))
    }

    /// Manual save: force completion now, keeping mode and remaining seconds.
    pub fn save_sprint_now(&mut self) -> SprintRecord {
        let record = self.timer.save_now(&self.editor_text);
        self.record_sprint(record)
    }

    pub fn edit_history(&mut self, seq: u64, title: &str, words: u32) -> bool {
        let changed = self.history.edit(seq, title, words);
        if changed {
            self.save_history();
        }
        changed
    }

    pub fn delete_history(&mut self, seq: u64) -> bool {
        let removed = self.history.delete(seq);
        if removed {
            self.save_history();
        }
        removed
    }

    // ---- editor ----

    pub fn set_editor_text(&mut self, text: &str) {
        self.editor_text = text.to_string();
        self.save_editor();
    }

    pub fn push_editor_char(&mut self, c: char) {
        self.editor_text.push(c);
        self.save_editor();
    }

    pub fn editor_backspace(&mut self) {
        self.editor_text.pop();
        self.save_editor();
    }

    pub fn clear_editor(&mut self) {
        self.editor_text.clear();
        self.save_editor();
    }

    pub fn editor_word_count(&self) -> usize {
        crate::util::word_count(&self.editor_text)
    }

    // ---- progress ----

    pub fn add_manual_words(&mut self, words: u32) {
        self.progress.add_manual(words);
        self.save_progress();
    }

    pub fn set_daily_goal(&mut self, goal: u32) {
        self.progress.set_daily_goal(goal);
        self.save_progress();
    }

    pub fn today_words(&self) -> u64 {
        progress::today_words(&self.history, &self.progress, Local::now().date_naive())
    }

    pub fn total_words(&self) -> u64 {
        progress::total_words(&self.history, &self.boards, &self.progress)
    }

    pub fn until_goal(&self) -> u64 {
        progress::until_goal(&self.progress, self.today_words())
    }

    // ---- characters & scenes ----

    pub fn add_character(
        &mut self,
        name: &str,
        role: &str,
        notes: &str,
        board_id: Option<String>,
    ) -> Option<String> {
        let id = self.characters.add(name, role, notes, board_id);
        if id.is_some() {
            self.save_registries();
        }
        id
    }

    pub fn delete_character_remove_pov(&mut self, character_id: &str) -> usize {
        let cleared =
            registry::remove_pov_and_delete(&mut self.characters, &mut self.scenes, character_id);
        self.save_registries();
        cleared
    }

    pub fn delete_character_reassign(&mut self, character_id: &str, to_id: &str) -> Option<usize> {
        let moved = registry::reassign_pov_and_delete(
            &mut self.characters,
            &mut self.scenes,
            character_id,
            to_id,
        );
        if moved.is_some() {
            self.save_registries();
        }
        moved
    }

    pub fn add_scene(
        &mut self,
        title: &str,
        pov_id: Option<String>,
        status: SceneStatus,
        summary: &str,
    ) -> Option<String> {
        let id = self.scenes.add(title, pov_id, status, summary);
        if id.is_some() {
            self.save_registries();
        }
        id
    }

    pub fn delete_scene(&mut self, id: &str) {
        self.scenes.delete(id);
        self.save_registries();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::Mode;
    use crate::storage::FileStore;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn workspace_in(dir: &std::path::Path) -> Workspace<FileStore> {
        Workspace::load(FileStore::with_dir(dir))
    }

    #[test]
    fn fresh_workspace_loads_defaults() {
        let dir = tempdir().unwrap();
        let ws = workspace_in(dir.path());
        assert!(ws.boards.boards.is_empty());
        assert!(ws.history.is_empty());
        assert_eq!(ws.timer, SprintTimer::default());
        assert_eq!(ws.progress.daily_goal, 1000);
        assert!(ws.editor_text.is_empty());
    }

    #[test]
    fn mutations_survive_a_reload() {
        let dir = tempdir().unwrap();
        let mut ws = workspace_in(dir.path());
        let board_id = ws.create_board("Novel Draft", "the big one", 50_000, &["Outline Act 1"]);
        ws.set_editor_text("draft words");
        ws.set_daily_goal(750);
        ws.add_character("Ana", "protagonist", "", Some(board_id.clone()));
        ws.add_scene("Opening", None, SceneStatus::Planned, "");
        drop(ws);

        let ws = workspace_in(dir.path());
        let board = ws.boards.board(&board_id).unwrap();
        assert_eq!(board.title, "Novel Draft");
        assert_eq!(board.lists[0].cards.len(), 1);
        assert_eq!(ws.editor_text, "draft words");
        assert_eq!(ws.progress.daily_goal, 750);
        assert_eq!(ws.characters.items[0].name, "Ana");
        assert_eq!(ws.scenes.items[0].title, "Opening");
    }

    #[test]
    fn completed_sprint_logs_attaches_and_persists() {
        let dir = tempdir().unwrap();
        let mut ws = workspace_in(dir.path());
        let board_id = ws.create_board("b", "", 0, &["Ch.1"]);
        let card_id = ws.boards.board(&board_id).unwrap().lists[0].cards[0].id.clone();

        ws.timer.length_min = 1;
        ws.timer.remaining_sec = 60;
        ws.timer.target_words = 500;
        ws.set_attach_target(Some(AttachTarget::Card(card_id.clone())));
        ws.start_sprint();

        let mut completed = None;
        for _ in 0..60 {
            completed = ws.on_tick();
        }
        let record = completed.expect("sprint completes on the sixtieth tick");
        assert_eq!(record.words, 500);

        // Exactly one history entry and one attachment with the same credit.
        assert_eq!(ws.history.len(), 1);
        let (_, _, card) = ws.boards.find_card(&card_id).unwrap();
        assert_eq!(card.sprints.len(), 1);
        assert_eq!(card.word_count, 500);
        assert_matches!(ws.timer.mode, Mode::Break);

        // All of it survives a reload.
        drop(ws);
        let ws = workspace_in(dir.path());
        assert_eq!(ws.history.len(), 1);
        let (_, _, card) = ws.boards.find_card(&card_id).unwrap();
        assert_eq!(card.word_count, 500);
        assert_eq!(ws.timer.remaining_sec, ws.timer.short_break_min * 60);
    }

    #[test]
    fn manual_save_does_not_flip_mode() {
        let dir = tempdir().unwrap();
        let mut ws = workspace_in(dir.path());
        ws.set_editor_text("a few words here");
        ws.start_sprint();
        ws.on_tick();

        let record = ws.save_sprint_now();
        assert_eq!(record.words, 4);
        assert_matches!(record.mode, Mode::Work);
        assert_matches!(ws.timer.mode, Mode::Work);
        assert!(!ws.timer.running);
        assert_eq!(ws.history.len(), 1);
    }

    #[test]
    fn ticks_do_nothing_while_paused() {
        let dir = tempdir().unwrap();
        let mut ws = workspace_in(dir.path());
        assert!(ws.on_tick().is_none());
        assert_eq!(ws.timer.remaining_sec, 25 * 60);
    }

    #[test]
    fn attach_targets_list_boards_then_cards() {
        let dir = tempdir().unwrap();
        let mut ws = workspace_in(dir.path());
        let a = ws.create_board("a", "", 0, &["x"]);
        let b = ws.create_board("b", "", 0, &[]);
        let targets = ws.attach_targets();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0], AttachTarget::Board(a));
        assert_eq!(targets[1], AttachTarget::Board(b));
        assert_matches!(targets[2], AttachTarget::Card(_));
    }

    #[test]
    fn editor_ops_persist() {
        let dir = tempdir().unwrap();
        let mut ws = workspace_in(dir.path());
        ws.push_editor_char('h');
        ws.push_editor_char('i');
        ws.editor_backspace();
        assert_eq!(ws.editor_text, "h");
        drop(ws);
        let mut ws = workspace_in(dir.path());
        assert_eq!(ws.editor_text, "h");
        ws.clear_editor();
        assert_eq!(ws.editor_word_count(), 0);
    }

    #[test]
    fn character_deletion_paths_persist_scene_updates() {
        let dir = tempdir().unwrap();
        let mut ws = workspace_in(dir.path());
        let ana = ws.add_character("Ana", "", "", None).unwrap();
        ws.add_scene("Opening", Some(ana.clone()), SceneStatus::Planned, "");

        assert_eq!(ws.delete_character_remove_pov(&ana), 1);
        drop(ws);

        let ws = workspace_in(dir.path());
        assert!(ws.characters.items.is_empty());
        assert!(ws.scenes.items[0].pov_id.is_none());
    }
}
