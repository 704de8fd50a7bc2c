use std::sync::Arc;

use crate::{config::AppConfig, notes::repo::NoteStore, users::repo::UserStore};

#[derive(Clone)]
pub struct NotesState {
    pub config: Arc<AppConfig>,
    pub notes: Arc<dyn NoteStore>,
}

impl NotesState {
    pub fn from_parts(config: Arc<AppConfig>, notes: Arc<dyn NoteStore>) -> Self {
        Self { config, notes }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::notes::repo::memory::MemoryNoteStore;

        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryNoteStore::default()),
        )
    }
}

#[derive(Clone)]
pub struct UsersState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
}

impl UsersState {
    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> Self {
        Self { config, users }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::users::repo::memory::MemoryUserStore;

        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryUserStore::default()),
        )
    }
}
