use std::fmt::Display;

use clap::ValueEnum;

/// Every collection the application persists. The cycle engine only ever touches
/// [StorageKey::Period]; the others are carried along so backups stay complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum StorageKey {
    Moods,
    Journals,
    Period,
    Study,
    Budget,
    Notes,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::Moods,
        StorageKey::Journals,
        StorageKey::Period,
        StorageKey::Study,
        StorageKey::Budget,
        StorageKey::Notes,
    ];

    /// Name used inside export documents.
    pub fn name(self) -> &'static str {
        match self {
            StorageKey::Moods => "moods",
            StorageKey::Journals => "journals",
            StorageKey::Period => "period",
            StorageKey::Study => "study",
            StorageKey::Budget => "budget",
            StorageKey::Notes => "notes",
        }
    }

    /// Key the collection is stored under.
    pub fn storage_key(self) -> String {
        format!("bloomlog_{}", self.name())
    }

    pub fn from_name(name: &str) -> Option<StorageKey> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::StorageKey;

    #[test]
    fn test_names_are_unique_and_resolvable() {
        for key in StorageKey::ALL {
            assert_eq!(StorageKey::from_name(key.name()), Some(key));
        }
        assert_eq!(StorageKey::from_name("metadata"), None);
        assert_eq!(StorageKey::Period.storage_key(), "bloomlog_period");
    }
}
