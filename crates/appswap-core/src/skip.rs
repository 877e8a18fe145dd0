use std::collections::BTreeSet;

/// Directory under the target that holds the pre-update snapshot.
pub const BACKUP_DIR_NAME: &str = "_update_backup_";

pub const DEFAULT_LOG_FILE: &str = "updater.log";

/// File names that are never copied, backed up or overwritten.
///
/// Matching is case-insensitive and applies at every depth of the tree. The
/// backup directory name is always a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipSet {
    names: BTreeSet<String>,
}

impl SkipSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            names: BTreeSet::new(),
        };
        set.insert(BACKUP_DIR_NAME);
        for name in names {
            set.insert(name.as_ref());
        }
        set
    }

    pub fn with(mut self, name: &str) -> Self {
        self.insert(name);
        self
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.names.contains(&fold(file_name))
    }

    pub fn is_backup_dir(dir_name: &str) -> bool {
        fold(dir_name) == fold(BACKUP_DIR_NAME)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn insert(&mut self, name: &str) {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            self.names.insert(fold(trimmed));
        }
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}
