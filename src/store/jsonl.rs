//! JSON-lines file store

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::{StoredUser, UserStore};
use crate::enrollment::User;
use crate::error::{Error, Result};

/// One JSON object per line, appended on insert.
///
/// The file and its parent directories are created on the first insert; a
/// missing file reads as an empty store. The file is read once per handle to
/// learn the enrolled e-mails; later inserts only append.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    /// E-mails already in the file, loaded on the first insert
    known_emails: Mutex<Option<HashSet<String>>>,
}

impl JsonlStore {
    /// Open a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            known_emails: Mutex::new(None),
        }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<StoredUser>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let file = fs::File::open(&self.path).map_err(|e| Error::IoRead {
            path: self.path.clone(),
            source: e,
        })?;

        let mut users = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| Error::IoRead {
                path: self.path.clone(),
                source: e,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let user = serde_json::from_str(&line).map_err(|e| Error::StoreCorrupt {
                path: self.path.clone(),
                line: index + 1,
                message: e.to_string(),
            })?;
            users.push(user);
        }
        Ok(users)
    }

    fn append(&self, stored: &StoredUser) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
                info!(path = %parent.display(), "Created directory");
            }
        }

        let write_error = |e| Error::IoWrite {
            path: self.path.clone(),
            source: e,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_error)?;

        let mut line = String::new();
        if !ends_with_newline(&mut file).map_err(write_error)? {
            debug!(path = %self.path.display(), "Terminating last line");
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(stored)?);
        line.push('\n');

        file.write_all(line.as_bytes()).map_err(write_error)
    }
}

/// Whether `file` is empty or its last byte is a newline
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl UserStore for JsonlStore {
    fn insert_user(&self, user: &User) -> Result<StoredUser> {
        let mut guard = self.known_emails.lock();
        let loaded = match guard.take() {
            Some(known) => known,
            None => self.read_all()?.into_iter().map(|u| u.email).collect(),
        };
        let known = guard.insert(loaded);

        if known.contains(&user.email) {
            return Err(Error::DuplicateUser {
                email: user.email.clone(),
            });
        }

        let stored = StoredUser::from_user(user);
        self.append(&stored)?;
        known.insert(stored.email.clone());
        debug!(id = %stored.id, path = %self.path.display(), "User stored");
        Ok(stored)
    }

    fn list_users(&self) -> Result<Vec<StoredUser>> {
        self.read_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    fn user(email: &str) -> User {
        User {
            name: "Test".to_string(),
            email: email.to_string(),
            password: "password1".to_string(),
            initial_preferences: vec!["news".to_string()],
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("users.jsonl"));
        assert!(store.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_insert_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("users.jsonl");
        let store = JsonlStore::new(&path);

        let stored = store.insert_user(&user("a@example.com")).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());

        // A fresh handle sees the same data
        let reopened = JsonlStore::new(&path);
        assert_eq!(reopened.list_users().unwrap(), vec![stored]);
    }

    #[test]
    fn test_one_line_per_user_without_plain_passwords() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.jsonl");
        let store = JsonlStore::new(&path);
        store.insert_user(&user("a@example.com")).unwrap();
        store.insert_user(&user("b@example.com")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("password1"));
    }

    #[test]
    fn test_duplicate_email_across_handles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.jsonl");
        JsonlStore::new(&path).insert_user(&user("a@example.com")).unwrap();

        let err = JsonlStore::new(&path)
            .insert_user(&user("a@example.com"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateUser);
    }

    #[test]
    fn test_corrupt_line_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.jsonl");
        let store = JsonlStore::new(&path);
        store.insert_user(&user("a@example.com")).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{{not json").unwrap();

        match store.list_users().unwrap_err() {
            Error::StoreCorrupt { line, .. } => assert_eq!(line, 3),
            other => panic!("expected StoreCorrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_many_inserts_read_the_file_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.jsonl");
        let store = JsonlStore::new(&path);
        for i in 0..50 {
            store.insert_user(&user(&format!("user{}@example.com", i))).unwrap();
        }

        // Lines written behind the handle's back are not re-read
        fs::write(&path, "{not json\n").unwrap();
        let err = store.insert_user(&user("user7@example.com")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateUser);
        assert_eq!(store.known_emails.lock().as_ref().map(HashSet::len), Some(50));
    }

    #[test]
    fn test_append_after_unterminated_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.jsonl");
        let store = JsonlStore::new(&path);
        store.insert_user(&user("a@example.com")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, content.trim_end_matches('\n')).unwrap();

        let reopened = JsonlStore::new(&path);
        reopened.insert_user(&user("b@example.com")).unwrap();

        let emails: Vec<String> = reopened
            .list_users()
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
        assert!(fs::read_to_string(&path).unwrap().ends_with('\n'));
    }
}
