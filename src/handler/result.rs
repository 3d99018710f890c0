//! Match consumer: logs found keys or exports them as keystore files.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;
use tracing::info;

use crate::config::MatchPolicy;
use crate::crypto::{Keypair, Keystore, KeystoreError, ScryptParams};
use crate::error::Result;
use crate::worker::{Cancel, MatchEvent};

/// A found key could not be durably recorded.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to encrypt key: {0}")]
    Encrypt(#[from] KeystoreError),

    #[error("failed to serialize keystore: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write keyfile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where and how matches are exported when a password is configured.
#[derive(Debug, Clone)]
pub struct KeystoreExport {
    pub password: String,
    pub dir: PathBuf,
    pub params: ScryptParams,
}

impl KeystoreExport {
    pub fn new(password: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            password: password.into(),
            dir: dir.into(),
            params: ScryptParams::LIGHT,
        }
    }

    /// Encrypts `keypair` and writes it to `<dir>/key_<address>.json`.
    pub fn write(&self, keypair: &Keypair) -> std::result::Result<PathBuf, PersistenceError> {
        let keystore = Keystore::encrypt(keypair, &self.password, self.params)?;
        let json = serde_json::to_vec(&keystore)?;

        let path = self.dir.join(Keystore::file_name(keypair));
        fs::create_dir_all(&self.dir)
            .and_then(|()| write_private(&path, &json))
            .map_err(|source| PersistenceError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

/// Writes `contents` to a file only the owner can read.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Consumes matches until the channel closes.
pub struct ResultHandler {
    export: Option<KeystoreExport>,
    policy: MatchPolicy,
    cancel: Cancel,
}

impl ResultHandler {
    pub fn new(export: Option<KeystoreExport>, policy: MatchPolicy, cancel: Cancel) -> Self {
        Self {
            export,
            policy,
            cancel,
        }
    }

    /// Handles every match received and returns how many were handled.
    ///
    /// Satisfying the policy cancels the workers, but matches they were
    /// already holding are still handled, so the count may exceed the
    /// target. A persistence failure cancels the search: the receiver is
    /// dropped on return and the workers are told to stop.
    pub fn run(self, rx: Receiver<MatchEvent>) -> Result<u64> {
        let mut handled = 0;
        let mut reached = false;

        for event in rx.iter() {
            if let Err(e) = self.handle(&event) {
                self.cancel.cancel();
                return Err(e.into());
            }
            handled += 1;

            if !reached && self.policy.is_satisfied(handled) {
                info!("Target reached! Found {} address(es)", handled);
                self.cancel.cancel();
                reached = true;
            }
        }

        Ok(handled)
    }

    fn handle(&self, event: &MatchEvent) -> std::result::Result<(), PersistenceError> {
        let keypair = &event.keypair;

        match &self.export {
            None => {
                info!(
                    worker = event.worker_id,
                    "Found key\nAddress    : {}\nPublic key : {}\nPrivate key: {}",
                    keypair.address(),
                    keypair.public_key_hex(),
                    keypair.private_key_hex(),
                );
            }
            Some(export) => {
                let path = export.write(keypair)?;
                info!(
                    worker = event.worker_id,
                    address = %keypair.address(),
                    path = %path.display(),
                    "saved encrypted keyfile"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyGenerator;
    use crate::error::Error;
    use crossbeam_channel::unbounded;

    fn event(worker_id: usize) -> MatchEvent {
        MatchEvent {
            keypair: KeyGenerator::new().unwrap().generate().unwrap(),
            worker_id,
        }
    }

    #[test]
    fn test_export_decrypts_to_original_key() {
        let dir = tempfile::tempdir().unwrap();
        let export = KeystoreExport::new("correct horse", dir.path());
        let handler = ResultHandler::new(Some(export), MatchPolicy::Continuous, Cancel::new());

        let found = event(1);
        let (tx, rx) = unbounded();
        tx.send(found.clone()).unwrap();
        drop(tx);

        assert_eq!(handler.run(rx).unwrap(), 1);

        let address = found.keypair.address().to_checksum();
        let path = dir.path().join(format!("key_{}.json", address));
        let keystore: Keystore =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(keystore.address, found.keypair.address().to_hex());
        assert_eq!(
            &keystore.decrypt("correct horse").unwrap(),
            found.keypair.private_key_bytes()
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_repeated_matches_not_deduplicated() {
        let handler = ResultHandler::new(None, MatchPolicy::Continuous, Cancel::new());
        let found = event(2);

        let (tx, rx) = unbounded();
        for _ in 0..3 {
            tx.send(found.clone()).unwrap();
        }
        drop(tx);

        assert_eq!(handler.run(rx).unwrap(), 3);
    }

    #[test]
    fn test_stop_after_policy_cancels() {
        let cancel = Cancel::new();
        let handler = ResultHandler::new(None, MatchPolicy::StopAfter(2), cancel.clone());

        let (tx, rx) = unbounded();
        for id in 1..=3 {
            tx.send(event(id)).unwrap();
        }
        drop(tx);

        // Matches in flight when the target is reached are not dropped
        assert_eq!(handler.run(rx).unwrap(), 3);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_matches_after_target_are_exported() {
        let dir = tempfile::tempdir().unwrap();
        let export = KeystoreExport::new("pw", dir.path());
        let cancel = Cancel::new();
        let handler = ResultHandler::new(Some(export), MatchPolicy::StopAfter(1), cancel.clone());

        let first = event(1);
        let late = event(2);
        let (tx, rx) = unbounded();
        let consumer = std::thread::spawn(move || handler.run(rx));

        tx.send(first.clone()).unwrap();
        while !cancel.is_cancelled() {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        // Sent by a worker that was already holding a match
        tx.send(late.clone()).unwrap();
        drop(tx);

        assert_eq!(consumer.join().unwrap().unwrap(), 2);
        for found in [first, late] {
            let path = dir.path().join(Keystore::file_name(&found.keypair));
            let keystore: Keystore = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
            assert_eq!(
                &keystore.decrypt("pw").unwrap(),
                found.keypair.private_key_bytes()
            );
        }
    }

    #[test]
    fn test_write_failure_is_fatal() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let export = KeystoreExport::new("pw", blocker.path().join("keys"));
        let cancel = Cancel::new();
        let handler = ResultHandler::new(Some(export), MatchPolicy::Continuous, cancel.clone());

        let (tx, rx) = unbounded();
        tx.send(event(1)).unwrap();
        drop(tx);

        assert!(matches!(
            handler.run(rx),
            Err(Error::Persistence(PersistenceError::Io { .. }))
        ));
        assert!(cancel.is_cancelled());
    }
}
