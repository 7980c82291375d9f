use serde::{Deserialize, Serialize};

use crate::sprint::{AttachTarget, SprintRecord};

/// Workflow stages are fixed literals shared by every board.
pub const STAGES: [(&str, &str); 3] = [("todo", "To Do"), ("doing", "Doing"), ("done", "Done")];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// A task. Belongs to exactly one list at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub word_goal: u32,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub sprints: Vec<SprintRecord>,
}

impl Card {
    fn new(id: String, title: &str, description: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            word_goal: 0,
            word_count: 0,
            tags: Vec::new(),
            priority: Priority::None,
            sprints: Vec::new(),
        }
    }

    /// A goal of 0 means "no goal" and suppresses the label entirely.
    pub fn goal_label(&self) -> Option<String> {
        if self.word_goal > 0 {
            Some(format!("Goal: {}", self.word_goal))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// A project: fixed set of lists, plus sprints attached at board level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub word_goal: u32,
    #[serde(default)]
    pub word_count: u64,
    pub lists: Vec<List>,
    #[serde(default)]
    pub sprints: Vec<SprintRecord>,
}

impl Board {
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum()
    }
}

/// The whole board collection, persisted as a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Boards {
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    next_id: u64,
}

impl Boards {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn create_board(
        &mut self,
        title: &str,
        description: &str,
        word_goal: u32,
        initial_card_titles: &[&str],
    ) -> String {
        let board_id = format!("board-{}", self.next_id());
        let mut lists: Vec<List> = STAGES
            .iter()
            .map(|(id, title)| List {
                id: (*id).to_string(),
                title: (*title).to_string(),
                collapsed: false,
                cards: Vec::new(),
            })
            .collect();
        for card_title in initial_card_titles {
            let card_id = format!("card-{}", self.next_id());
            lists[0].cards.push(Card::new(card_id, card_title, ""));
        }
        self.boards.push(Board {
            id: board_id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            word_goal,
            word_count: 0,
            lists,
            sprints: Vec::new(),
        });
        board_id
    }

    /// Characters/scenes referencing the board keep their weak ids; deletion
    /// only orphans them.
    pub fn delete_board(&mut self, id: &str) {
        self.boards.retain(|b| b.id != id);
    }

    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn board_mut(&mut self, id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == id)
    }

    /// Quick-add into the board's first list. Returns the new card id.
    pub fn add_card(&mut self, board_id: &str, title: &str, description: &str) -> Option<String> {
        if title.trim().is_empty() {
            return None;
        }
        let card_id = format!("card-{}", self.next_id());
        let board = self.board_mut(board_id)?;
        let list = board.lists.first_mut()?;
        list.cards
            .push(Card::new(card_id.clone(), title, description));
        Some(card_id)
    }

    pub fn delete_card(&mut self, board_id: &str, card_id: &str) {
        if let Some(board) = self.board_mut(board_id) {
            for list in &mut board.lists {
                list.cards.retain(|c| c.id != card_id);
            }
        }
    }

    pub fn find_card(&self, card_id: &str) -> Option<(&Board, &List, &Card)> {
        for board in &self.boards {
            for list in &board.lists {
                if let Some(card) = list.cards.iter().find(|c| c.id == card_id) {
                    return Some((board, list, card));
                }
            }
        }
        None
    }

    fn card_mut(&mut self, board_id: &str, card_id: &str) -> Option<&mut Card> {
        self.board_mut(board_id)?
            .lists
            .iter_mut()
            .flat_map(|l| l.cards.iter_mut())
            .find(|c| c.id == card_id)
    }

    fn card_mut_anywhere(&mut self, card_id: &str) -> Option<&mut Card> {
        self.boards
            .iter_mut()
            .flat_map(|b| b.lists.iter_mut())
            .flat_map(|l| l.cards.iter_mut())
            .find(|c| c.id == card_id)
    }

    /// Remove-then-insert, never duplicate. Silent no-op unless the card, the
    /// source board, the target board, and the target list all resolve; the
    /// target is verified before anything is removed.
    pub fn move_card(
        &mut self,
        card_id: &str,
        from_board: &str,
        to_board: &str,
        target_list: &str,
    ) {
        let Some(src_b) = self.boards.iter().position(|b| b.id == from_board) else {
            return;
        };
        let Some((src_l, src_c)) = self.boards[src_b].lists.iter().enumerate().find_map(
            |(li, list)| {
                list.cards
                    .iter()
                    .position(|c| c.id == card_id)
                    .map(|ci| (li, ci))
            },
        ) else {
            return;
        };
        let Some(dst_b) = self.boards.iter().position(|b| b.id == to_board) else {
            return;
        };
        let Some(dst_l) = self.boards[dst_b]
            .lists
            .iter()
            .position(|l| l.id == target_list)
        else {
            return;
        };

        let card = self.boards[src_b].lists[src_l].cards.remove(src_c);
        // Cards are always appended; insertion order is arrival order.
        self.boards[dst_b].lists[dst_l].cards.push(card);
    }

    pub fn set_card_goal(&mut self, card_id: &str, board_id: &str, goal: u32) {
        if let Some(card) = self.card_mut(board_id, card_id) {
            card.word_goal = goal;
        }
    }

    pub fn set_card_priority(&mut self, card_id: &str, board_id: &str, priority: Priority) {
        if let Some(card) = self.card_mut(board_id, card_id) {
            card.priority = priority;
        }
    }

    pub fn toggle_collapsed(&mut self, board_id: &str, list_id: &str) {
        if let Some(board) = self.board_mut(board_id) {
            if let Some(list) = board.lists.iter_mut().find(|l| l.id == list_id) {
                list.collapsed = !list.collapsed;
            }
        }
    }

    /// Prepend the record to the target's own sprint list and credit its word
    /// count exactly once. Word counts are additive only, never recomputed.
    pub fn attach_sprint(&mut self, target: &AttachTarget, record: &SprintRecord) -> bool {
        match target {
            AttachTarget::Board(id) => {
                if let Some(board) = self.board_mut(id) {
                    board.sprints.insert(0, record.clone());
                    board.word_count += record.words as u64;
                    true
                } else {
                    false
                }
            }
            AttachTarget::Card(id) => {
                if let Some(card) = self.card_mut_anywhere(id) {
                    card.sprints.insert(0, record.clone());
                    card.word_count += record.words as u64;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Every card with its board/list context, board order then list order.
    /// Feeds attach-target selectors and grouped displays.
    pub fn all_cards(&self) -> Vec<(&Board, &List, &Card)> {
        self.boards
            .iter()
            .flat_map(|b| {
                b.lists
                    .iter()
                    .flat_map(move |l| l.cards.iter().map(move |c| (b, l, c)))
            })
            .collect()
    }

    pub fn card_words_total(&self) -> u64 {
        self.all_cards().iter().map(|(_, _, c)| c.word_count).sum()
    }
}
