//! Per-mailbox header index: epoch-tagged caching and windowed pagination.
//!
//! IMAP addresses messages by session-relative sequence numbers, renumbered
//! whenever the mailbox is expunged. The index therefore treats the remote
//! message space as a versioned interval: every cache rebuild is tagged with
//! the message count that produced it, and an observed count change
//! invalidates the whole entry rather than attempting a diff (which would
//! need UID tracking this client deliberately does not do).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::display::DisplayHeader;
use crate::record::HeaderRecord;

/// Messages fetched per population/pagination step.
pub const WINDOW_SIZE: u32 = 25;

/// The index's view of a retrieval session.
///
/// Both operations absorb their own failures: a failed selection reports a
/// count of 0 and a failed fetch an empty record.
#[allow(async_fn_in_trait)]
pub trait MailboxBackend {
    /// Selects the mailbox and returns its total message count.
    async fn remote_count(&mut self, mailbox: &str) -> u32;

    /// Fetches the header subset for one message of the selected mailbox.
    async fn header(&mut self, sequence: u32) -> HeaderRecord;
}

/// Cooperative busy flag, observable by the UI layer.
///
/// This is a mutual-exclusion *signal*, not a lock: operations against one
/// session connection are triggered from serialized user actions, and the
/// flag exists so those controls can be disabled while a batch runs.
#[derive(Debug, Clone, Default)]
pub struct BusySignal(Arc<AtomicBool>);

impl BusySignal {
    /// True while a fetch batch is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Claims the flag; `None` if a batch is already running.
    fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }
}

/// Clears the busy flag when the batch ends, however it ends.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One row of the message list: the sequence-number label plus the
/// display projection of its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    /// Remote sequence number (valid for the current epoch only).
    pub sequence: u32,
    /// Render-ready header fields.
    pub header: DisplayHeader,
}

/// Outcome of a refresh or fetch-more operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUpdate {
    /// A batch is already running; nothing was done.
    Busy,
    /// The mailbox is empty; the cache entry was cleared.
    NoMail,
    /// The cache was stale and rebuilt; these are the new rows.
    Rebuilt(Vec<PageRow>),
    /// The cache was still valid; rows replayed without network I/O.
    Replayed(Vec<PageRow>),
    /// Older rows appended by fetch-more (empty when nothing is left).
    Appended(Vec<PageRow>),
}

/// Cache entry for one mailbox.
///
/// `records` is a contiguous newest-first suffix of the remote interval
/// `[1, total]`, starting at `total`; `total` is the epoch marker.
struct MailboxEntry {
    total: u32,
    records: Vec<HeaderRecord>,
}

impl MailboxEntry {
    fn cached(&self) -> u32 {
        u32::try_from(self.records.len()).unwrap_or(u32::MAX)
    }
}

/// Per-mailbox header cache with windowed pagination.
pub struct MailboxIndex {
    window: u32,
    entries: HashMap<String, MailboxEntry>,
    busy: BusySignal,
}

impl Default for MailboxIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MailboxIndex {
    /// Creates an index with the standard window size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(WINDOW_SIZE)
    }

    /// Creates an index with a custom window size (minimum 1).
    #[must_use]
    pub fn with_window(window: u32) -> Self {
        Self {
            window: window.max(1),
            entries: HashMap::new(),
            busy: BusySignal::default(),
        }
    }

    /// Returns a handle to the busy signal for the UI layer to observe.
    #[must_use]
    pub fn busy_signal(&self) -> BusySignal {
        self.busy.clone()
    }

    /// Number of records currently cached for a mailbox.
    #[must_use]
    pub fn cached_count(&self, mailbox: &str) -> usize {
        self.entries.get(mailbox).map_or(0, |e| e.records.len())
    }

    /// Looks up the cached record for a sequence number of the current
    /// epoch (used when a listed message is opened).
    #[must_use]
    pub fn record_at(&self, mailbox: &str, sequence: u32) -> Option<&HeaderRecord> {
        let entry = self.entries.get(mailbox)?;
        let offset = entry.total.checked_sub(sequence)?;
        entry.records.get(offset as usize)
    }

    /// Handles a mailbox (re)selection.
    ///
    /// Selects the mailbox to learn the authoritative remote count, then
    /// either rebuilds the cache (count changed: the old epoch's sequence
    /// numbers can no longer be trusted), replays it (count unchanged), or
    /// reports an empty mailbox.
    pub async fn refresh<B: MailboxBackend>(&mut self, backend: &mut B, mailbox: &str) -> PageUpdate {
        let Some(_guard) = self.busy.try_acquire() else {
            return PageUpdate::Busy;
        };

        let remote_count = backend.remote_count(mailbox).await;
        if remote_count == 0 {
            self.entries.remove(mailbox);
            return PageUpdate::NoMail;
        }

        let cached_total = self.entries.get(mailbox).map_or(0, |e| e.total);
        if cached_total == remote_count {
            debug!(mailbox, remote_count, "cache valid, replaying");
            let Some(entry) = self.entries.get(mailbox) else {
                return PageUpdate::Replayed(Vec::new());
            };

            let mut rows = Vec::with_capacity(entry.records.len());
            let mut sequence = remote_count;
            for record in &entry.records {
                rows.push(PageRow {
                    sequence,
                    header: DisplayHeader::from_record(record),
                });
                sequence = sequence.saturating_sub(1);
            }
            return PageUpdate::Replayed(rows);
        }

        debug!(
            mailbox,
            cached_total, remote_count, "count changed, rebuilding cache"
        );
        let mut entry = MailboxEntry {
            total: remote_count,
            records: Vec::new(),
        };
        let stop = remote_count.saturating_sub(self.window - 1).max(1);
        let rows = fill_down(backend, &mut entry, remote_count, stop).await;
        self.entries.insert(mailbox.to_string(), entry);

        PageUpdate::Rebuilt(rows)
    }

    /// Fetches the next window of older messages.
    ///
    /// A no-op (empty `Appended`) once everything down to sequence number 1
    /// is cached, or when the mailbox has no entry yet.
    pub async fn fetch_more<B: MailboxBackend>(
        &mut self,
        backend: &mut B,
        mailbox: &str,
    ) -> PageUpdate {
        let Some(_guard) = self.busy.try_acquire() else {
            return PageUpdate::Busy;
        };

        let Some(entry) = self.entries.get_mut(mailbox) else {
            warn!(mailbox, "fetch-more requested before any selection");
            return PageUpdate::Appended(Vec::new());
        };

        let start = entry.total.saturating_sub(entry.cached());
        if start == 0 {
            return PageUpdate::Appended(Vec::new());
        }

        let stop = start.saturating_sub(self.window - 1).max(1);
        let rows = fill_down(backend, entry, start, stop).await;
        PageUpdate::Appended(rows)
    }
}

/// Fetches sequence numbers `start` down to `stop` (inclusive), appending
/// each record to the entry and collecting display rows.
///
/// An empty record aborts the batch: the records fetched so far stay (they
/// remain a contiguous suffix), and the next refresh reconciles through the
/// count comparison while fetch-more continues from the abort point.
async fn fill_down<B: MailboxBackend>(
    backend: &mut B,
    entry: &mut MailboxEntry,
    start: u32,
    stop: u32,
) -> Vec<PageRow> {
    let mut rows = Vec::new();
    let mut sequence = start;

    while sequence >= stop {
        let record = backend.header(sequence).await;
        if record.is_empty() {
            warn!(sequence, "header fetch returned no data, aborting batch");
            break;
        }

        rows.push(PageRow {
            sequence,
            header: DisplayHeader::from_record(&record),
        });
        entry.records.push(record);

        if sequence == 1 {
            break;
        }
        sequence -= 1;
    }

    rows
}
