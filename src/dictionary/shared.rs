// Single-writer handle for a dictionary shared between concurrent conversions

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::store::{CommandDictionary, DictionaryError};

/// Cloneable handle; every mutation reloads, modifies and saves under one lock
#[derive(Debug, Clone)]
pub struct SharedDictionary {
    inner: Arc<Mutex<CommandDictionary>>,
}

impl SharedDictionary {
    pub fn new(dictionary: CommandDictionary) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dictionary)),
        }
    }

    /// Upsert against the latest on-disk state so writers from other handles are not lost
    pub fn add(&self, command: &str, phrase: &str) -> Result<(), DictionaryError> {
        let mut dictionary = self.inner.lock();
        dictionary.load()?;
        dictionary.add(command, phrase)
    }

    pub fn remove(&self, command: &str) -> Result<bool, DictionaryError> {
        let mut dictionary = self.inner.lock();
        dictionary.load()?;
        dictionary.remove(command)
    }

    pub fn lookup(&self, command: &str) -> Option<String> {
        self.inner.lock().lookup(command).map(str::to_string)
    }

    pub fn search(&self, query: &str) -> BTreeMap<String, String> {
        self.inner.lock().search(query)
    }

    /// Point-in-time copy, e.g. for building a transformer
    pub fn snapshot(&self) -> CommandDictionary {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dict.json");
        let shared = SharedDictionary::new(CommandDictionary::new(&path));

        thread::scope(|scope| {
            for worker in 0..4 {
                let shared = shared.clone();
                scope.spawn(move || {
                    for i in 0..10 {
                        let command = format!(r"\cmd{}x{}", worker, i);
                        shared.add(&command, "phrase").unwrap();
                    }
                });
            }
        });

        let reloaded = CommandDictionary::open(&path).unwrap();
        assert_eq!(reloaded.len(), 40);
        assert_eq!(shared.snapshot().len(), 40);
    }

    #[test]
    fn test_lookup_and_remove_through_handle() {
        let temp_dir = TempDir::new().unwrap();
        let shared = SharedDictionary::new(CommandDictionary::new(temp_dir.path().join("d.json")));

        shared.add(r"\nabla", "del").unwrap();
        assert_eq!(shared.lookup(r"\nabla").as_deref(), Some("del"));
        assert_eq!(shared.search("DEL").len(), 1);
        assert!(shared.remove(r"\nabla").unwrap());
        assert_eq!(shared.lookup(r"\nabla"), None);
    }
}
