//! Shared fakes for integration tests: an in-memory content store, a
//! recording minter, and a scriptable event source.
#![allow(dead_code)]

use alloy::primitives::{Address, U256};
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use certmint::chain::{ChainError, ChainResult, CredentialMinter, EventSource, IssuedEvent};
use certmint::storage::{ContentStore, StorageError, StorageResult, UploadReceipt};

/// Content-addressed in-memory blob store.
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    blobs: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob under a fixed cid.
    pub fn put(&self, cid: &str, bytes: Vec<u8>) {
        self.blobs.insert(cid.to_string(), bytes);
    }

    pub fn get(&self, cid: &str) -> Option<Vec<u8>> {
        self.blobs.get(cid).map(|e| e.value().clone())
    }

    fn cid_for(bytes: &[u8]) -> String {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        format!("Qm{:016x}", hasher.finish())
    }
}

impl ContentStore for MemoryContentStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        _filename: &str,
        _mime_type: &str,
    ) -> StorageResult<UploadReceipt> {
        let cid = Self::cid_for(&bytes);
        let size = bytes.len() as u64;
        self.blobs.insert(cid.clone(), bytes);
        Ok(UploadReceipt { cid, size })
    }

    async fn fetch(&self, cid: &str) -> StorageResult<Vec<u8>> {
        self.get(cid).ok_or_else(|| StorageError::Fetch {
            cid: cid.to_string(),
            reason: "not pinned".to_string(),
        })
    }
}

/// Store whose uploads always fail; fetches delegate to the inner store.
#[derive(Clone)]
pub struct UploadFailsStore(pub MemoryContentStore);

impl ContentStore for UploadFailsStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _filename: &str,
        _mime_type: &str,
    ) -> StorageResult<UploadReceipt> {
        Err(StorageError::Upload("injected failure".to_string()))
    }

    async fn fetch(&self, cid: &str) -> StorageResult<Vec<u8>> {
        self.0.fetch(cid).await
    }
}

/// Minter that records calls and returns synthetic transaction hashes.
#[derive(Clone, Default)]
pub struct RecordingMinter {
    mints: Arc<Mutex<Vec<(Address, String)>>>,
}

impl RecordingMinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mints(&self) -> Vec<(Address, String)> {
        self.mints.lock().unwrap().clone()
    }
}

impl CredentialMinter for RecordingMinter {
    async fn mint(&self, recipient: Address, token_uri: &str) -> ChainResult<String> {
        let mut mints = self.mints.lock().unwrap();
        mints.push((recipient, token_uri.to_string()));
        Ok(format!("0x{:064x}", mints.len()))
    }
}

/// Event source driven by the test: a settable height and a scripted event
/// list filtered by block range.
#[derive(Clone, Default)]
pub struct ScriptedEventSource {
    height: Arc<AtomicU64>,
    events: Arc<Mutex<Vec<IssuedEvent>>>,
    fail_next: Arc<AtomicBool>,
}

impl ScriptedEventSource {
    pub fn new(height: u64) -> Self {
        let source = Self::default();
        source.set_height(height);
        source
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn push_event(&self, token_id: u64, recipient: Address, tx_hash: &str, block: u64) {
        self.events.lock().unwrap().push(IssuedEvent {
            token_id: U256::from(token_id),
            recipient,
            token_uri: format!("cid://meta-{token_id}"),
            tx_hash: tx_hash.to_string(),
            block_number: block,
        });
    }

    /// Make the next RPC interaction fail once.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl EventSource for ScriptedEventSource {
    async fn latest_block(&self) -> ChainResult<u64> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ChainError::Rpc("injected node outage".to_string()));
        }
        Ok(self.height.load(Ordering::SeqCst))
    }

    async fn issuance_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> ChainResult<Vec<IssuedEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.block_number >= from_block && e.block_number <= to_block)
            .cloned()
            .collect())
    }
}
