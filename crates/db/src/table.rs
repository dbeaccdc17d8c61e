use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};

use super::{Error, Result};

const TEMP_SUFFIX: &str = ".tmp";

pub(crate) type Rows<T> = BTreeMap<String, T>;

/// One json file holding a whole mapping. The file is rewritten on every
/// mutation, while holding the table lock.
#[derive(Debug)]
pub(crate) struct Table<T> {
    path: PathBuf,
    rows: Mutex<Rows<T>>,
}

impl<T> Table<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub(crate) async fn open(dir: &Path, file: &str) -> Self {
        let path = dir.join(file);
        let rows = load(&path).await;
        log::debug!("loaded {} rows from {}", rows.len(), path.display());
        Self {
            path,
            rows: Mutex::new(rows),
        }
    }
    pub(crate) async fn get(&self, key: &str) -> Option<T> {
        self.rows.lock().await.get(key).cloned()
    }
    pub(crate) async fn contains(&self, key: &str) -> bool {
        self.rows.lock().await.contains_key(key)
    }
    pub(crate) async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
    /// Run `f` over the rows without writing anything
    pub(crate) async fn read<R>(&self, f: impl FnOnce(&Rows<T>) -> R) -> R {
        f(&*self.rows.lock().await)
    }
    /// Mutate rows and flush them to disk. `f` returns the value to hand back
    /// and whether anything changed; unchanged tables are not rewritten.
    ///
    /// If the flush fails, the in-memory rows are restored, so memory never
    /// holds a state that isn't on disk.
    pub(crate) async fn update<R>(&self, f: impl FnOnce(&mut Rows<T>) -> (R, bool)) -> Result<R> {
        let mut rows = self.rows.lock().await;
        let snapshot = rows.clone();

        let (res, changed) = f(&mut rows);
        if !changed {
            return Ok(res);
        }
        if let Err(e) = save(&self.path, &rows).await {
            *rows = snapshot;
            return Err(e);
        }
        Ok(res)
    }
}

/// Load mapping from `path`. Absent, unreadable or malformed files give an
/// empty mapping; malformed files are moved aside first.
pub(crate) async fn load<T: DeserializeOwned>(path: &Path) -> Rows<T> {
    let content = match fs::read_to_string(path).await {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Rows::new(),
        Err(e) => {
            log::warn!("failed to read {}, starting empty: {e}", path.display());
            return Rows::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(rows) => rows,
        Err(e) => {
            let aside = corrupt_path(path);
            log::warn!(
                "{} is not a valid mapping ({e}), moving it to {} and starting empty",
                path.display(),
                aside.display()
            );
            if let Err(e) = fs::rename(path, &aside).await {
                log::warn!("failed to move corrupt {}: {e}", path.display());
            }
            Rows::new()
        }
    }
}

/// Write the whole mapping next to `path`, then atomically replace it
pub(crate) async fn save<T: Serialize>(path: &Path, rows: &Rows<T>) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(rows).map_err(|e| Error::Json(path.to_path_buf(), e))?;

    let tmp = temp_path(path);
    fs::write(&tmp, bytes).await.map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).await.map_err(|e| Error::io(path, e))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}{TEMP_SUFFIX}", path.display()))
}

fn corrupt_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.corrupt-{}", path.display(), common::now().timestamp()))
}
