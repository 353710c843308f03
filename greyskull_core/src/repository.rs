//! User persistence with file locking.
//!
//! Each user lives in `<data_dir>/users/<lowercase username>.json`; the active
//! user's name is kept in `<data_dir>/current_user.txt`. Usernames are matched
//! case-insensitively but stored with their original casing.

use crate::{Error, Result, User};
use fs2::FileExt;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage operations the rest of the application needs for users
pub trait UserRepository {
    /// Store a new user. Fails with `UserAlreadyExists` on a case-insensitive clash.
    fn create(&self, user: &User) -> Result<()>;

    /// Load a user by name (case-insensitive)
    fn get(&self, username: &str) -> Result<User>;

    /// Overwrite an existing user
    fn update(&self, user: &User) -> Result<()>;

    /// All usernames in their original casing, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// Name of the active user
    fn get_current(&self) -> Result<String>;

    /// Make an existing user the active one
    fn set_current(&self, username: &str) -> Result<()>;
}

/// JSON-file repository with `fs2` locks and atomic replacement
#[derive(Clone, Debug)]
pub struct JsonUserRepository {
    users_dir: PathBuf,
    current_file: PathBuf,
}

impl JsonUserRepository {
    /// Open (and create if needed) a repository rooted at `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let users_dir = data_dir.join("users");
        std::fs::create_dir_all(&users_dir)?;

        Ok(Self {
            users_dir,
            current_file: data_dir.join("current_user.txt"),
        })
    }

    fn user_path(&self, username: &str) -> PathBuf {
        self.users_dir
            .join(format!("{}.json", username.trim().to_lowercase()))
    }

    fn require_existing(&self, username: &str) -> Result<PathBuf> {
        let path = self.user_path(username);
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::UserNotFound(username.to_string()))
        }
    }

    fn load_user(path: &Path) -> Result<User> {
        let contents = read_locked(path)?;
        let user = serde_json::from_str::<User>(&contents)?;
        tracing::debug!("Loaded user {} from {:?}", user.username, path);
        Ok(user)
    }

    fn save_user(user: &User, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(user)?;
        write_atomic(path, contents.as_bytes())?;
        tracing::debug!("Saved user {} to {:?}", user.username, path);
        Ok(())
    }
}

impl UserRepository for JsonUserRepository {
    fn create(&self, user: &User) -> Result<()> {
        let path = self.user_path(&user.username);
        if path.exists() {
            return Err(Error::UserAlreadyExists(user.username.clone()));
        }
        Self::save_user(user, &path)?;
        tracing::info!("Created user {}", user.username);
        Ok(())
    }

    fn get(&self, username: &str) -> Result<User> {
        let path = self.require_existing(username)?;
        Self::load_user(&path)
    }

    fn update(&self, user: &User) -> Result<()> {
        let path = self.require_existing(&user.username)?;
        Self::save_user(user, &path)
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.users_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut usernames = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match Self::load_user(&path) {
                Ok(user) => usernames.push(user.username),
                Err(e) => {
                    tracing::warn!("Skipping unreadable user file {:?}: {}", path, e);
                }
            }
        }

        usernames.sort_by_key(|name| name.to_lowercase());
        Ok(usernames)
    }

    fn get_current(&self) -> Result<String> {
        let contents = match read_locked(&self.current_file) {
            Ok(contents) => contents,
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NoCurrentUser)
            }
            Err(e) => return Err(e),
        };

        let username = contents.trim();
        if username.is_empty() {
            return Err(Error::NoCurrentUser);
        }

        // The pointer may outlive the user file
        if !self.user_path(username).exists() {
            tracing::warn!("Current user {} no longer exists", username);
            return Err(Error::NoCurrentUser);
        }

        Ok(username.to_string())
    }

    fn set_current(&self, username: &str) -> Result<()> {
        // Store the original casing, not what was typed
        let user = self.get(username)?;
        write_atomic(&self.current_file, user.username.as_bytes())?;
        tracing::info!("Current user set to {}", user.username);
        Ok(())
    }
}

/// Read a whole file under a shared lock
fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(contents)
}

/// Atomically replace `path` with `contents`
///
/// Writes a temp file in the same directory under an exclusive lock, syncs
/// it, then renames it over the target.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(ErrorKind::Other, "target path missing parent")
    })?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, JsonUserRepository) {
        let temp_dir = tempfile::tempdir().unwrap();
        let repo = JsonUserRepository::new(temp_dir.path()).unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_create_and_get_case_insensitive() {
        let (_temp_dir, repo) = setup();

        let user = User::new("Alice");
        repo.create(&user).unwrap();

        let loaded = repo.get("alice").unwrap();
        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded.username, "Alice");
        assert!(repo.get("ALICE").is_ok());
    }

    #[test]
    fn test_create_duplicate_fails() {
        let (_temp_dir, repo) = setup();

        repo.create(&User::new("bob")).unwrap();
        assert!(matches!(
            repo.create(&User::new("BOB")),
            Err(Error::UserAlreadyExists(_))
        ));
    }

    #[test]
    fn test_get_and_update_missing_user() {
        let (_temp_dir, repo) = setup();

        assert!(matches!(repo.get("ghost"), Err(Error::UserNotFound(_))));
        assert!(matches!(
            repo.update(&User::new("ghost")),
            Err(Error::UserNotFound(_))
        ));
    }

    #[test]
    fn test_update_persists() {
        let (_temp_dir, repo) = setup();

        let mut user = User::new("carol");
        repo.create(&user).unwrap();

        user.current_program = Some(uuid::Uuid::now_v7());
        repo.update(&user).unwrap();

        let loaded = repo.get("carol").unwrap();
        assert_eq!(loaded.current_program, user.current_program);
    }

    #[test]
    fn test_list_sorted_and_skips_corrupt_files() {
        let (temp_dir, repo) = setup();

        repo.create(&User::new("zed")).unwrap();
        repo.create(&User::new("Amy")).unwrap();
        std::fs::write(temp_dir.path().join("users/broken.json"), "{ not json").unwrap();
        std::fs::write(temp_dir.path().join("users/notes.txt"), "ignore me").unwrap();

        assert_eq!(repo.list().unwrap(), vec!["Amy".to_string(), "zed".to_string()]);
    }

    #[test]
    fn test_current_user_pointer() {
        let (_temp_dir, repo) = setup();

        assert!(matches!(repo.get_current(), Err(Error::NoCurrentUser)));
        assert!(matches!(repo.set_current("nobody"), Err(Error::UserNotFound(_))));

        repo.create(&User::new("Dana")).unwrap();
        repo.set_current("dana").unwrap();
        assert_eq!(repo.get_current().unwrap(), "Dana");
    }

    #[test]
    fn test_current_user_deleted() {
        let (temp_dir, repo) = setup();

        repo.create(&User::new("erin")).unwrap();
        repo.set_current("erin").unwrap();
        std::fs::remove_file(temp_dir.path().join("users/erin.json")).unwrap();

        assert!(matches!(repo.get_current(), Err(Error::NoCurrentUser)));
    }

    #[test]
    fn test_corrupted_user_is_error() {
        let (temp_dir, repo) = setup();

        std::fs::write(temp_dir.path().join("users/frank.json"), "{ invalid json }").unwrap();
        assert!(matches!(repo.get("frank"), Err(Error::Json(_))));
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let (temp_dir, repo) = setup();

        let user = User::new("gina");
        repo.create(&user).unwrap();
        repo.update(&user).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path().join("users"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "gina.json")
            .collect();
        assert!(extras.is_empty(), "Expected only gina.json, found extras: {:?}", extras);
    }
}
