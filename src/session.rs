// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Editing session: working note, autosave state and status line

use crate::autosave::{AutosavePolicy, AutosaveState};
use crate::codec::LoadOutcome;
use crate::config::SessionState;
use crate::note::{clamp_body, Field, Metadata, NoteRecord};
use crate::store::{NoteStore, StoreError};
use anyhow::Result;
use std::time::Instant;

/// File name used when saving a note that was never named.
pub const UNTITLED: &str = "Untitled.txt";

/// Writes the session state somewhere durable (session.toml in the app).
pub type PersistFn = Box<dyn FnMut(&SessionState) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Save,
    /// Requires the user to have typed a name.
    SaveAs,
    Autosave,
}

/// The note being edited and everything that decides when it reaches disk.
pub struct Session {
    store: NoteStore,
    policy: AutosavePolicy,
    pub autosave: AutosaveState,
    /// Working copy. `file_name` holds whatever the user typed.
    pub note: NoteRecord,
    pub status: Option<String>,
    persist: PersistFn,
}

impl Session {
    /// Rebuild the working note from the last session. When the remembered
    /// file still exists its content replaces the remembered text.
    pub fn restore(
        store: NoteStore,
        policy: AutosavePolicy,
        state: SessionState,
        persist: PersistFn,
    ) -> Self {
        let note = NoteRecord::new(
            state.current_note_file_name,
            state.metadata,
            state.last_note_text,
        );
        let mut session = Self {
            store,
            policy,
            autosave: AutosaveState::new(),
            note,
            status: None,
            persist,
        };

        if session.store.exists(&session.note.file_name) {
            match session
                .store
                .load_with(&session.note.file_name, &session.note.metadata)
            {
                Ok(loaded) => {
                    let fell_back = loaded.outcome == LoadOutcome::Fallback;
                    session.note.metadata = loaded.record.metadata;
                    session.note.body = loaded.record.body;
                    if fell_back {
                        session.persist_state();
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not reopen last note");
                }
            }
        }
        session
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn policy(&self) -> AutosavePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: AutosavePolicy) {
        self.policy = policy;
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.dirty
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    fn state(&self) -> SessionState {
        SessionState {
            current_note_file_name: self.note.file_name.clone(),
            last_note_text: self.note.body.clone(),
            metadata: self.note.metadata.clone(),
        }
    }

    fn persist_state(&mut self) {
        let state = self.state();
        if let Err(e) = (self.persist)(&state) {
            tracing::warn!(error = %e, "failed to persist session state");
        }
    }

    /// Blank body and file name. Metadata carries over to the new note.
    pub fn new_note(&mut self) {
        self.note.file_name.clear();
        self.note.body.clear();
        self.autosave.reset();
        self.autosave.mark_dirty();
        self.set_status("New note created.");
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.note.file_name = name.into();
    }

    /// Edit one metadata field. Line breaks are dropped. Metadata is persisted
    /// on every change.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value: String = value
            .into()
            .chars()
            .filter(|c| !matches!(c, '\r' | '\n'))
            .collect();
        self.note.metadata.set(field, value);
        self.autosave.mark_dirty();
        self.persist_state();
    }

    /// Replace the body. Returns false if it had to be cut to the size limit.
    pub fn set_body(&mut self, body: impl Into<String>) -> bool {
        let mut body = body.into();
        let clamped = clamp_body(&mut body);
        self.note.body = body;
        self.autosave.mark_dirty();
        !clamped
    }

    /// Save the working note. On failure nothing in memory changes.
    pub fn save(&mut self, mode: SaveMode, now: Instant) -> bool {
        let saved = self.try_save(mode);
        // Every attempt restarts the autosave clock.
        self.autosave.record_attempt(now, saved);
        saved
    }

    fn try_save(&mut self, mode: SaveMode) -> bool {
        let result = if self.note.file_name.trim().is_empty() {
            if mode == SaveMode::SaveAs {
                self.set_status("Enter a file name before Save As.");
                return false;
            }
            let target = NoteRecord {
                file_name: UNTITLED.to_string(),
                ..self.note.clone()
            };
            self.store.save(&target)
        } else {
            self.store.save(&self.note)
        };

        match result {
            Ok(name) => {
                self.note.file_name = name;
                self.persist_state();
                let msg = match mode {
                    SaveMode::Save => format!("Saved {}.", self.note.file_name),
                    SaveMode::SaveAs => format!("Saved as {}.", self.note.file_name),
                    SaveMode::Autosave => format!("Autosaved {}.", self.note.file_name),
                };
                tracing::info!(file = %self.note.file_name, ?mode, "note saved");
                self.set_status(msg);
                true
            }
            Err(StoreError::InvalidName) => {
                self.set_status("Invalid file name.");
                false
            }
            Err(e) => {
                let shown = if self.note.file_name.trim().is_empty() {
                    UNTITLED.to_string()
                } else {
                    self.note.file_name.clone()
                };
                tracing::warn!(file = %shown, error = %e, "save failed");
                self.set_status(format!("Could not save {}: {}", shown, e));
                false
            }
        }
    }

    /// Per-tick autosave check. Returns true if a save was attempted.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.policy.should_autosave(&mut self.autosave, now) {
            return false;
        }
        tracing::debug!("autosave interval elapsed");
        self.save(SaveMode::Autosave, now);
        true
    }

    pub fn load(&mut self, file_name: &str) -> bool {
        let loaded = match self.store.load_with(file_name, &self.note.metadata) {
            Ok(l) => l,
            Err(StoreError::NotFound(_)) | Err(StoreError::NoSelection) | Err(StoreError::InvalidName) => {
                self.set_status("Note file not found.");
                return false;
            }
            Err(e) => {
                tracing::warn!(file = file_name, error = %e, "load failed");
                self.set_status(format!("Could not load {}: {}", file_name, e));
                return false;
            }
        };

        if loaded.outcome == LoadOutcome::Fallback {
            tracing::info!(file = %loaded.record.file_name, "opened as plain text");
        }
        self.note = loaded.record;
        self.autosave.reset();
        self.set_status(format!("Loaded {}.", self.note.file_name));
        self.persist_state();
        true
    }

    pub fn delete(&mut self) -> bool {
        match self.store.delete(&self.note.file_name) {
            Ok(()) => {
                self.note.file_name.clear();
                self.note.body.clear();
                self.autosave.dirty = false;
                self.set_status("Note deleted.");
                self.persist_state();
                true
            }
            Err(StoreError::NoSelection) | Err(StoreError::InvalidName) => {
                self.set_status("No file selected to delete.");
                false
            }
            Err(StoreError::NotFound(_)) => {
                self.set_status("File not found.");
                false
            }
            Err(e) => {
                tracing::warn!(file = %self.note.file_name, error = %e, "delete failed");
                self.set_status(format!("Could not delete {}: {}", self.note.file_name, e));
                false
            }
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.note.metadata
    }
}
