use serde::{Deserialize, Serialize};

use crate::board::Boards;

/// A character note. `board_id` is a weak reference: the board may be deleted
/// out from under it, and display falls back to "Unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub board_id: Option<String>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SceneStatus {
    #[default]
    Planned,
    Drafted,
    Revised,
}

/// A scene note. `pov_id` weakly references a character; `pov_name` is the
/// free-text fallback when no character is linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub pov_id: Option<String>,
    #[serde(default)]
    pub pov_name: String,
    #[serde(default)]
    pub status: SceneStatus,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Characters {
    #[serde(default)]
    pub items: Vec<Character>,
    #[serde(default)]
    next_id: u64,
}

impl Characters {
    pub fn add(&mut self, name: &str, role: &str, notes: &str, board_id: Option<String>) -> Option<String> {
        if name.trim().is_empty() {
            return None;
        }
        self.next_id += 1;
        let id = format!("ch-{}", self.next_id);
        self.items.insert(
            0,
            Character {
                id: id.clone(),
                name: name.to_string(),
                role: role.to_string(),
                notes: notes.to_string(),
                board_id,
            },
        );
        Some(id)
    }

    pub fn edit(&mut self, id: &str, name: &str, role: &str, notes: &str) -> bool {
        if let Some(ch) = self.items.iter_mut().find(|c| c.id == id) {
            ch.name = name.to_string();
            ch.role = role.to_string();
            ch.notes = notes.to_string();
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.items.iter().find(|c| c.id == id)
    }

    fn remove(&mut self, id: &str) {
        self.items.retain(|c| c.id != id);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenes {
    #[serde(default)]
    pub items: Vec<Scene>,
    #[serde(default)]
    next_id: u64,
}

impl Scenes {
    pub fn add(
        &mut self,
        title: &str,
        pov_id: Option<String>,
        status: SceneStatus,
        summary: &str,
    ) -> Option<String> {
        if title.trim().is_empty() {
            return None;
        }
        self.next_id += 1;
        let id = format!("sc-{}", self.next_id);
        self.items.insert(
            0,
            Scene {
                id: id.clone(),
                title: title.to_string(),
                pov_id,
                pov_name: String::new(),
                status,
                summary: summary.to_string(),
            },
        );
        Some(id)
    }

    pub fn edit(
        &mut self,
        id: &str,
        title: &str,
        pov_id: Option<String>,
        status: SceneStatus,
        summary: &str,
    ) -> bool {
        if let Some(scene) = self.items.iter_mut().find(|s| s.id == id) {
            scene.title = title.to_string();
            scene.pov_id = pov_id;
            scene.status = status;
            scene.summary = summary.to_string();
            true
        } else {
            false
        }
    }

    pub fn delete(&mut self, id: &str) {
        self.items.retain(|s| s.id != id);
    }

    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.items.iter().find(|s| s.id == id)
    }

    /// Scenes whose POV references the given character.
    pub fn pov_of(&self, character_id: &str) -> Vec<&Scene> {
        self.items
            .iter()
            .filter(|s| s.pov_id.as_deref() == Some(character_id))
            .collect()
    }
}

/// The "remove POV" delete path: clear the reference on every scene pointing
/// at the character, then delete the character. Returns how many scenes were
/// cleared; none may be left dangling.
pub fn remove_pov_and_delete(
    characters: &mut Characters,
    scenes: &mut Scenes,
    character_id: &str,
) -> usize {
    if characters.get(character_id).is_none() {
        return 0;
    }
    let mut cleared = 0;
    for scene in &mut scenes.items {
        if scene.pov_id.as_deref() == Some(character_id) {
            scene.pov_id = None;
            cleared += 1;
        }
    }
    characters.remove(character_id);
    cleared
}

/// The "reassign POV" delete path: rewrite every reference to another
/// existing character, then delete. `None` when the destination is missing or
/// is the character being deleted.
pub fn reassign_pov_and_delete(
    characters: &mut Characters,
    scenes: &mut Scenes,
    character_id: &str,
    to_id: &str,
) -> Option<usize> {
    if to_id == character_id
        || characters.get(character_id).is_none()
        || characters.get(to_id).is_none()
    {
        return None;
    }
    let mut moved = 0;
    for scene in &mut scenes.items {
        if scene.pov_id.as_deref() == Some(character_id) {
            scene.pov_id = Some(to_id.to_string());
            moved += 1;
        }
    }
    characters.remove(character_id);
    Some(moved)
}

/// Resolve a scene's POV for display. Dangling references render as
/// "Unknown", absent ones as the free-text fallback or "Unassigned".
pub fn pov_display(scene: &Scene, characters: &Characters) -> String {
    match &scene.pov_id {
        Some(id) => match characters.get(id) {
            Some(ch) => ch.name.clone(),
            None => "Unknown".to_string(),
        },
        None if !scene.pov_name.trim().is_empty() => scene.pov_name.clone(),
        None => "Unassigned".to_string(),
    }
}

/// Resolve a character's owning board title for display.
pub fn board_display(character: &Character, boards: &Boards) -> String {
    match &character.board_id {
        Some(id) => match boards.board(id) {
            Some(board) => board.title.clone(),
            None => "Unknown".to_string(),
        },
        None => "Unassigned".to_string(),
    }
}
