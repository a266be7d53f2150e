use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use shared::StoreStats;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::document::Database;
use super::legacy;
use super::{
    CreditRepository, MemberRepository, NotificationRepository, PaymentRepository,
    SettingRepository,
};
use crate::storage::traits::Connection;

/// Handle on one JSON store file.
///
/// The document is loaded once and kept in memory behind an async lock;
/// clones share that state. Every mutation rewrites the whole file. Two
/// handles opened separately on the same file do not see each other's writes.
#[derive(Clone)]
pub struct JsonConnection {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    admin_password: String,
    document: RwLock<Database>,
}

impl JsonConnection {
    /// Open the store at `path`, creating and seeding it when absent.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub async fn open<P: AsRef<Path>>(path: P, admin_password: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = match read_document(&path)? {
            Some(document) => {
                info!(
                    "Loaded store {} ({} members, {} credits)",
                    path.display(),
                    document.members.len(),
                    document.credits.len()
                );
                document
            }
            None => {
                info!("Store {} not found, creating seeded store", path.display());
                let document = Database::seeded(admin_password)?;
                write_document(&path, &document)?;
                document
            }
        };

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                admin_password: admin_password.to_string(),
                document: RwLock::new(document),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Re-read the file, replacing the in-memory document.
    pub async fn load(&self) -> Result<()> {
        let mut document = self.inner.document.write().await;
        *document = read_document(&self.inner.path)?
            .ok_or_else(|| anyhow!("Store file {} does not exist", self.inner.path.display()))?;
        Ok(())
    }

    /// Write the current in-memory document to disk.
    pub async fn save(&self) -> Result<()> {
        let document = self.inner.document.read().await;
        write_document(&self.inner.path, &document)
    }

    /// Run a read-only closure against the current document.
    pub async fn read<T>(&self, f: impl FnOnce(&Database) -> T) -> T {
        let document = self.inner.document.read().await;
        f(&document)
    }

    /// Apply a mutation and persist it.
    ///
    /// The write lock is held across mutate and save. If the closure or the
    /// save fails, the in-memory document is restored to its prior state.
    pub async fn mutate<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut document = self.inner.document.write().await;
        let before = document.clone();

        let outcome = match f(&mut document) {
            Ok(outcome) => outcome,
            Err(e) => {
                *document = before;
                return Err(e);
            }
        };

        if let Err(e) = write_document(&self.inner.path, &document) {
            warn!("Save failed, rolling back in-memory store: {}", e);
            *document = before;
            return Err(e);
        }
        Ok(outcome)
    }

    pub async fn snapshot(&self) -> Database {
        self.inner.document.read().await.clone()
    }

    /// Delete the file and start over from the seeded document.
    pub async fn reset(&self) -> Result<()> {
        let mut document = self.inner.document.write().await;
        if self.inner.path.exists() {
            fs::remove_file(&self.inner.path)
                .with_context(|| format!("Failed to delete {}", self.inner.path.display()))?;
        }
        let seeded = Database::seeded(&self.inner.admin_password)?;
        write_document(&self.inner.path, &seeded)?;
        *document = seeded;
        info!("Store {} reset to seeded state", self.inner.path.display());
        Ok(())
    }

    /// Empty every collection, without reseeding.
    pub async fn clear(&self) -> Result<()> {
        self.mutate(|document| {
            *document = Database::default();
            Ok(())
        })
        .await?;
        info!("Store {} cleared", self.inner.path.display());
        Ok(())
    }

    /// Write a copy of the document to `backup_<epoch_millis>.json` in `dir`.
    pub async fn backup<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create backup directory {}", dir.display()))?;
        let backup_path = dir.join(format!("backup_{}.json", Utc::now().timestamp_millis()));

        let document = self.inner.document.read().await;
        write_document(&backup_path, &document)?;
        info!("Backed up store to {}", backup_path.display());
        Ok(backup_path)
    }

    /// Write the current document to an arbitrary file.
    pub async fn export<P: AsRef<Path>>(&self, target: P) -> Result<()> {
        let document = self.inner.document.read().await;
        write_document(target.as_ref(), &document)?;
        info!("Exported store to {}", target.as_ref().display());
        Ok(())
    }

    /// Replace the document with the contents of `source` and persist it.
    ///
    /// Accepts the canonical layout and the three legacy layouts.
    pub async fn import<P: AsRef<Path>>(&self, source: P) -> Result<StoreStats> {
        let source = source.as_ref();
        let content = fs::read_to_string(source)
            .with_context(|| format!("Failed to read import file {}", source.display()))?;
        let mut imported = legacy::parse_document(&content)
            .with_context(|| format!("Failed to parse import file {}", source.display()))?;
        imported.ensure_seeded(&self.inner.admin_password)?;

        let stats = imported.stats();
        self.mutate(move |document| {
            *document = imported;
            Ok(())
        })
        .await?;
        info!(
            "Imported {} into store ({} members, {} credits, {} payments)",
            source.display(),
            stats.total_members,
            stats.total_credits,
            stats.total_payments
        );
        Ok(stats)
    }

    /// Restore from a backup written by [`JsonConnection::backup`].
    pub async fn restore<P: AsRef<Path>>(&self, backup_path: P) -> Result<StoreStats> {
        self.import(backup_path).await
    }

    pub async fn stats(&self) -> StoreStats {
        self.read(|document| document.stats()).await
    }
}

impl Connection for JsonConnection {
    type MemberRepository = MemberRepository;
    type CreditRepository = CreditRepository;
    type PaymentRepository = PaymentRepository;
    type NotificationRepository = NotificationRepository;
    type SettingRepository = SettingRepository;

    fn create_member_repository(&self) -> Self::MemberRepository {
        MemberRepository::new(self.clone())
    }

    fn create_credit_repository(&self) -> Self::CreditRepository {
        CreditRepository::new(self.clone())
    }

    fn create_payment_repository(&self) -> Self::PaymentRepository {
        PaymentRepository::new(self.clone())
    }

    fn create_notification_repository(&self) -> Self::NotificationRepository {
        NotificationRepository::new(self.clone())
    }

    fn create_setting_repository(&self) -> Self::SettingRepository {
        SettingRepository::new(self.clone())
    }
}

/// Read and parse the store file. `None` when the file does not exist.
fn read_document(path: &Path) -> Result<Option<Database>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read store file {}", path.display()))?;
    let document: Database = serde_json::from_str(&content)
        .with_context(|| format!("Store file {} is corrupt", path.display()))?;
    Ok(Some(document))
}

/// Serialize and replace the file atomically (temp file + rename).
fn write_document(path: &Path, document: &Database) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let content = serde_json::to_string_pretty(document)?;
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    debug!("Wrote store file {}", path.display());
    Ok(())
}
