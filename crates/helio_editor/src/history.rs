// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history: an append-only, cursor-addressed command list.
//!
//! The cursor always points just past the last applied entry. Executing a
//! new command truncates the abandoned redo tail; undo and redo move the
//! cursor without mutating the entries. Rapid same-target edits within
//! the coalescing window collapse into a single entry, so a continuous
//! drag undoes in one step.

use crate::commands::{Command, CommandError};
use crate::state::EditorState;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

/// Default coalescing window for updatable commands, matching the
/// editor's drag cadence.
const COALESCE_WINDOW: Duration = Duration::from_millis(500);

/// Default maximum history depth.
const MAX_HISTORY: usize = 100;

/// History (de)serialization errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Malformed history JSON
    #[error("invalid history data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One recorded command with its history metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Monotonic entry id, unique within this history
    pub id: u64,
    /// Display name captured at execute time
    pub name: String,
    /// The recorded command
    pub command: Command,
    /// Inert entries (dangling references after a load) move the cursor
    /// without touching the scene
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Serialize)]
struct HistoryData<'a> {
    entries: &'a [HistoryEntry],
    cursor: usize,
}

#[derive(Deserialize)]
struct HistoryDataOwned {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

/// The editor's undo/redo stack.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    id_counter: u64,
    max_depth: usize,
    coalesce_window: Duration,
    last_cmd_time: Option<Instant>,
}

impl History {
    /// Create a history with default settings.
    pub fn new() -> Self {
        Self::with_settings(COALESCE_WINDOW, MAX_HISTORY)
    }

    /// Create a history from editor settings.
    pub fn from_config(config: &crate::config::EditorConfig) -> Self {
        Self::with_settings(config.coalesce_window(), config.max_history)
    }

    /// Create a history with an explicit coalescing window and depth cap.
    /// A zero window disables coalescing.
    pub fn with_settings(coalesce_window: Duration, max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            id_counter: 0,
            max_depth: max_depth.max(1),
            coalesce_window,
            last_cmd_time: None,
        }
    }

    /// Execute a command and record it.
    ///
    /// Discards any entries past the cursor first. If the command is
    /// updatable and matches the logical edit of the previous entry
    /// within the coalescing window, it merges into that entry instead
    /// of appending. A failed command records nothing and leaves the
    /// cursor untouched.
    pub fn execute(
        &mut self,
        state: &mut EditorState,
        mut command: Command,
    ) -> Result<(), CommandError> {
        command.execute(state)?;

        let now = Instant::now();
        let within_window = self
            .last_cmd_time
            .is_some_and(|t| now.duration_since(t) < self.coalesce_window);
        self.last_cmd_time = Some(now);

        self.entries.truncate(self.cursor);

        let merge_key = command.merge_key();
        let coalesce = within_window
            && command.updatable()
            && merge_key.is_some()
            && self
                .entries
                .last()
                .is_some_and(|e| !e.disabled && e.command.merge_key() == merge_key);

        if coalesce {
            if let Some(entry) = self.entries.last_mut() {
                entry.command.update(&command);
            }
        } else {
            self.id_counter += 1;
            self.entries.push(HistoryEntry {
                id: self.id_counter,
                name: command.name(),
                command,
                disabled: false,
            });
        }
        self.cursor = self.entries.len();

        if self.entries.len() > self.max_depth {
            let overflow = self.entries.len() - self.max_depth;
            self.entries.drain(..overflow);
            self.cursor -= overflow;
        }

        Ok(())
    }

    /// Undo the entry before the cursor. A no-op at the bottom of the
    /// stack. Returns the undone entry's name.
    pub fn undo(&mut self, state: &mut EditorState) -> Result<Option<String>, CommandError> {
        if self.cursor == 0 {
            return Ok(None);
        }
        let entry = &mut self.entries[self.cursor - 1];
        if !entry.disabled {
            entry.command.undo(state)?;
        }
        self.cursor -= 1;
        Ok(Some(self.entries[self.cursor].name.clone()))
    }

    /// Re-apply the entry at the cursor. A no-op at the top of the
    /// stack. Returns the redone entry's name.
    pub fn redo(&mut self, state: &mut EditorState) -> Result<Option<String>, CommandError> {
        if self.cursor == self.entries.len() {
            return Ok(None);
        }
        let entry = &mut self.entries[self.cursor];
        if !entry.disabled {
            entry.command.execute(state)?;
        }
        self.cursor += 1;
        Ok(Some(self.entries[self.cursor - 1].name.clone()))
    }

    /// Undo or redo until the entry with the given id is the last applied
    /// one. Unknown ids are ignored.
    pub fn go_to_state(&mut self, state: &mut EditorState, id: u64) -> Result<(), CommandError> {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            warn!(id, "history entry not found, staying put");
            return Ok(());
        };
        let target = index + 1;
        while self.cursor > target {
            self.undo(state)?;
        }
        while self.cursor < target {
            self.redo(state)?;
        }
        Ok(())
    }

    /// Whether undo is available
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether redo is available
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Name of the entry undo would revert
    pub fn undo_name(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|e| e.name.as_str())
    }

    /// Name of the entry redo would re-apply
    pub fn redo_name(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|e| e.name.as_str())
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position, in `[0, len]`
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Recorded entries, oldest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.id_counter = 0;
        self.last_cmd_time = None;
    }

    /// Serialize as `{ entries, cursor }`.
    pub fn to_json(&self) -> Result<serde_json::Value, HistoryError> {
        Ok(serde_json::to_value(HistoryData {
            entries: &self.entries,
            cursor: self.cursor,
        })?)
    }

    /// Restore a history, re-resolving identity references against the
    /// live state. Entries whose references no longer resolve are marked
    /// disabled - they become inert no-ops instead of corrupting the
    /// stack.
    pub fn from_json(
        value: serde_json::Value,
        state: &EditorState,
    ) -> Result<Self, HistoryError> {
        let data: HistoryDataOwned = serde_json::from_value(value)?;
        let mut history = Self::new();
        for mut entry in data.entries {
            if !entry.disabled && !entry.command.resolve(state) {
                warn!(id = entry.id, name = %entry.name, "history entry references missing objects, disabling");
                entry.disabled = true;
            }
            history.id_counter = history.id_counter.max(entry.id);
            history.entries.push(entry);
        }
        history.cursor = data.cursor.min(history.entries.len());
        Ok(history)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ObjectId, ObjectKind, SceneObject};

    fn state_with_mesh() -> (EditorState, ObjectId) {
        let mut state = EditorState::new();
        let object = SceneObject::new("Box", ObjectKind::Mesh);
        let id = object.uuid;
        state.scene.add_object(object, None, None);
        (state, id)
    }

    fn no_coalesce() -> History {
        History::with_settings(Duration::ZERO, MAX_HISTORY)
    }

    fn position(state: &EditorState, id: ObjectId) -> [f32; 3] {
        state.scene.object_by_uuid(id).unwrap().transform.position
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let (mut state, id) = state_with_mesh();
        let mut history = no_coalesce();

        let cmd = Command::set_position(&state.scene, id, [1.0, 0.0, 0.0]).unwrap();
        history.execute(&mut state, cmd).unwrap();
        assert_eq!(position(&state, id), [1.0, 0.0, 0.0]);

        history.undo(&mut state).unwrap();
        assert_eq!(position(&state, id), [0.0, 0.0, 0.0]);

        history.redo(&mut state).unwrap();
        assert_eq!(position(&state, id), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let (mut state, _) = state_with_mesh();
        let mut history = no_coalesce();

        assert!(history.undo(&mut state).unwrap().is_none());
        assert!(history.redo(&mut state).unwrap().is_none());
        assert_eq!(history.len(), 0);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_execute_after_undo_truncates_tail() {
        let (mut state, id) = state_with_mesh();
        let mut history = no_coalesce();

        for x in [1.0, 2.0, 3.0] {
            let cmd = Command::set_position(&state.scene, id, [x, 0.0, 0.0]).unwrap();
            history.execute(&mut state, cmd).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 3);

        history.undo(&mut state).unwrap();
        let c4 = Command::set_scale(&state.scene, id, [2.0, 2.0, 2.0]).unwrap();
        history.execute(&mut state, c4).unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 3);
        assert_eq!(history.entries()[2].name, "Set Scale");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_drag_coalesces_to_single_entry() {
        let (mut state, id) = state_with_mesh();
        let mut history = History::new();

        // Three frames of one continuous drag
        for x in [1.0, 2.0, 3.0] {
            let cmd = Command::set_position(&state.scene, id, [x, 0.0, 0.0]).unwrap();
            history.execute(&mut state, cmd).unwrap();
        }
        assert_eq!(history.len(), 1);
        assert_eq!(position(&state, id), [3.0, 0.0, 0.0]);

        // One undo restores the pre-drag position, not the previous frame
        history.undo(&mut state).unwrap();
        assert_eq!(position(&state, id), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_different_targets_do_not_coalesce() {
        let mut state = EditorState::new();
        let a = SceneObject::new("A", ObjectKind::Mesh);
        let b = SceneObject::new("B", ObjectKind::Mesh);
        let (a_id, b_id) = (a.uuid, b.uuid);
        state.scene.add_object(a, None, None);
        state.scene.add_object(b, None, None);

        let mut history = History::new();
        let cmd = Command::set_position(&state.scene, a_id, [1.0, 0.0, 0.0]).unwrap();
        history.execute(&mut state, cmd).unwrap();
        let cmd = Command::set_position(&state.scene, b_id, [2.0, 0.0, 0.0]).unwrap();
        history.execute(&mut state, cmd).unwrap();

        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_failed_command_records_nothing() {
        let (mut state, _) = state_with_mesh();
        let mut history = no_coalesce();

        let missing = ObjectId::new();
        let cmd = Command::RemoveObject {
            object: missing,
            removed: None,
        };
        assert!(history.execute(&mut state, cmd).is_err());
        assert_eq!(history.len(), 0);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_go_to_state_walks_both_directions() {
        let (mut state, id) = state_with_mesh();
        let mut history = no_coalesce();

        for x in [1.0, 2.0, 3.0] {
            let cmd = Command::set_position(&state.scene, id, [x, 0.0, 0.0]).unwrap();
            history.execute(&mut state, cmd).unwrap();
        }
        let first_id = history.entries()[0].id;
        let last_id = history.entries()[2].id;

        history.go_to_state(&mut state, first_id).unwrap();
        assert_eq!(position(&state, id), [1.0, 0.0, 0.0]);
        assert_eq!(history.cursor(), 1);

        history.go_to_state(&mut state, last_id).unwrap();
        assert_eq!(position(&state, id), [3.0, 0.0, 0.0]);
        assert_eq!(history.cursor(), 3);
    }

    #[test]
    fn test_json_round_trip() {
        let (mut state, id) = state_with_mesh();
        let mut history = no_coalesce();
        for x in [1.0, 2.0] {
            let cmd = Command::set_position(&state.scene, id, [x, 0.0, 0.0]).unwrap();
            history.execute(&mut state, cmd).unwrap();
        }
        history.undo(&mut state).unwrap();

        let json = history.to_json().unwrap();
        let restored = History::from_json(json, &state).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.cursor(), 1);
        assert!(restored.entries().iter().all(|e| !e.disabled));
    }

    #[test]
    fn test_dangling_reference_becomes_inert_entry() {
        let (mut state, id) = state_with_mesh();
        let mut history = no_coalesce();
        let cmd = Command::set_position(&state.scene, id, [1.0, 0.0, 0.0]).unwrap();
        history.execute(&mut state, cmd).unwrap();
        let json = history.to_json().unwrap();

        // The object is gone by the time the history is loaded
        let mut bare = EditorState::new();
        let mut restored = History::from_json(json, &bare).unwrap();
        assert_eq!(restored.len(), 1);
        assert!(restored.entries()[0].disabled);

        // Inert entries move the cursor without touching the scene
        assert!(restored.undo(&mut bare).unwrap().is_some());
        assert_eq!(restored.cursor(), 0);
        assert!(restored.redo(&mut bare).unwrap().is_some());
        assert_eq!(restored.cursor(), 1);
    }

    #[test]
    fn test_depth_cap_drops_oldest_entries() {
        let (mut state, id) = state_with_mesh();
        let mut history = History::with_settings(Duration::ZERO, 5);

        for x in 0..8 {
            let cmd = Command::set_position(&state.scene, id, [x as f32, 0.0, 0.0]).unwrap();
            history.execute(&mut state, cmd).unwrap();
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.cursor(), 5);
    }

    #[test]
    fn test_cut_is_single_entry() {
        let (mut state, id) = state_with_mesh();
        let mut history = no_coalesce();

        history
            .execute(
                &mut state,
                Command::CutObject {
                    object: id,
                    copy: None,
                    remove: None,
                },
            )
            .unwrap();
        assert_eq!(history.len(), 1);
        assert!(!state.scene.contains(id));

        history.undo(&mut state).unwrap();
        assert!(state.scene.contains(id));
    }
}
