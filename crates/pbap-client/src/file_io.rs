//! Local file collaborator.
//!
//! File call-outs from the session are processed in order by a single
//! worker task. Each open or write result is posted back to the session
//! mailbox as a call-in event.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use pbap_protocol::session::{FileCallout, FileHandle, SessionEvent};
use pbap_protocol::PbcStatus;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

/// Storage for downloaded phone book objects.
pub trait FileStore: Send + 'static {
    fn open(&mut self, name: &str) -> impl Future<Output = io::Result<FileHandle>> + Send;

    fn write(&mut self, fd: FileHandle, data: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Close `fd`, deleting the file when `remove` is set.
    fn close(&mut self, fd: FileHandle, remove: bool) -> impl Future<Output = io::Result<()>> + Send;
}

/// [`FileStore`] backed by `tokio::fs`.
#[derive(Debug, Default)]
pub struct FsFileStore {
    root: Option<PathBuf>,
    files: HashMap<FileHandle, (PathBuf, tokio::fs::File)>,
    next_fd: u32,
}

impl FsFileStore {
    /// Relative names are resolved under `root` when one is given.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            files: HashMap::new(),
            next_fd: 0,
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn open_count(&self) -> usize {
        self.files.len()
    }
}

fn unknown_handle(fd: FileHandle) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("unknown file handle {fd}"))
}

impl FileStore for FsFileStore {
    async fn open(&mut self, name: &str) -> io::Result<FileHandle> {
        let path = self.resolve(name);
        let file = tokio::fs::File::create(&path).await?;
        self.next_fd = self.next_fd.wrapping_add(1);
        let fd = FileHandle(self.next_fd);
        tracing::debug!(%fd, path = %path.display(), "file opened");
        self.files.insert(fd, (path, file));
        Ok(fd)
    }

    async fn write(&mut self, fd: FileHandle, data: &[u8]) -> io::Result<()> {
        let (_, file) = self.files.get_mut(&fd).ok_or_else(|| unknown_handle(fd))?;
        file.write_all(data).await
    }

    async fn close(&mut self, fd: FileHandle, remove: bool) -> io::Result<()> {
        let (path, mut file) = self.files.remove(&fd).ok_or_else(|| unknown_handle(fd))?;
        file.flush().await?;
        drop(file);
        if remove {
            tracing::debug!(%fd, path = %path.display(), "removing partial file");
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }
}

fn call_in_status(result: &io::Result<impl Sized>) -> PbcStatus {
    match result {
        Ok(_) => PbcStatus::Ok,
        Err(_) => PbcStatus::FileError,
    }
}

/// Run call-outs against `store` until either channel closes.
pub(crate) async fn run_file_worker<F: FileStore>(
    mut store: F,
    mut callouts: mpsc::Receiver<FileCallout>,
    mailbox: mpsc::WeakSender<SessionEvent>,
) {
    while let Some(callout) = callouts.recv().await {
        let call_in = match callout {
            FileCallout::Open { name } => {
                let result = store.open(&name).await;
                if let Err(e) = &result {
                    tracing::warn!(name = %name, "file open failed: {e}");
                }
                Some(SessionEvent::FileOpened {
                    status: call_in_status(&result),
                    fd: result.ok(),
                })
            }
            FileCallout::Write { fd, data } => {
                let result = store.write(fd, &data).await;
                if let Err(e) = &result {
                    tracing::warn!(%fd, len = data.len(), "file write failed: {e}");
                }
                Some(SessionEvent::FileWritten {
                    status: call_in_status(&result),
                    fd,
                })
            }
            FileCallout::Close { fd, remove } => {
                if let Err(e) = store.close(fd, remove).await {
                    tracing::warn!(%fd, remove, "file close failed: {e}");
                }
                None
            }
        };
        if let Some(event) = call_in {
            let Some(mailbox) = mailbox.upgrade() else {
                break;
            };
            if mailbox.send(event).await.is_err() {
                break;
            }
        }
    }
    tracing::debug!("file worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_keep() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsFileStore::new(Some(dir.path().to_path_buf()));

        let fd = store.open("pb.vcf").await.unwrap();
        store.write(fd, b"BEGIN:VCARD\r\n").await.unwrap();
        store.write(fd, b"END:VCARD\r\n").await.unwrap();
        store.close(fd, false).await.unwrap();

        let content = std::fs::read(dir.path().join("pb.vcf")).unwrap();
        assert_eq!(content, b"BEGIN:VCARD\r\nEND:VCARD\r\n");
        assert_eq!(store.open_count(), 0);
    }

    #[tokio::test]
    async fn close_with_remove_deletes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsFileStore::new(Some(dir.path().to_path_buf()));

        let fd = store.open("partial.vcf").await.unwrap();
        store.write(fd, b"BEGIN:VC").await.unwrap();
        store.close(fd, true).await.unwrap();
        assert!(!dir.path().join("partial.vcf").exists());
    }

    #[tokio::test]
    async fn absolute_names_ignore_root() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let target = other.path().join("abs.vcf");
        let mut store = FsFileStore::new(Some(root.path().to_path_buf()));

        let fd = store.open(target.to_str().unwrap()).await.unwrap();
        store.close(fd, false).await.unwrap();
        assert!(target.exists());
    }

    #[tokio::test]
    async fn unknown_handle_is_an_error() {
        let mut store = FsFileStore::default();
        assert!(store.write(FileHandle(42), b"x").await.is_err());
        assert!(store.close(FileHandle(42), false).await.is_err());
    }

    #[tokio::test]
    async fn worker_posts_call_ins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsFileStore::new(Some(dir.path().to_path_buf()));
        let (callout_tx, callout_rx) = mpsc::channel(8);
        let (mailbox_tx, mut mailbox_rx) = mpsc::channel(8);
        let worker = tokio::spawn(run_file_worker(store, callout_rx, mailbox_tx.downgrade()));

        callout_tx
            .send(FileCallout::Open {
                name: "out.vcf".into(),
            })
            .await
            .unwrap();
        let Some(SessionEvent::FileOpened {
            status: PbcStatus::Ok,
            fd: Some(fd),
        }) = mailbox_rx.recv().await
        else {
            panic!("expected successful open call-in");
        };

        callout_tx
            .send(FileCallout::Write {
                fd,
                data: b"data".to_vec(),
            })
            .await
            .unwrap();
        assert_eq!(
            mailbox_rx.recv().await,
            Some(SessionEvent::FileWritten {
                status: PbcStatus::Ok,
                fd
            })
        );

        callout_tx
            .send(FileCallout::Close { fd, remove: false })
            .await
            .unwrap();
        callout_tx
            .send(FileCallout::Open {
                name: "missing-dir/out.vcf".into(),
            })
            .await
            .unwrap();
        assert_eq!(
            mailbox_rx.recv().await,
            Some(SessionEvent::FileOpened {
                status: PbcStatus::FileError,
                fd: None
            })
        );
        assert_eq!(std::fs::read(dir.path().join("out.vcf")).unwrap(), b"data");

        drop(callout_tx);
        worker.await.unwrap();
    }
}
