//! Directory scan pipeline turning source documents into knowledge entries.
//!
//! The watched directory is polled on a fixed interval. Each document is
//! parsed, split into segments, filtered, and committed to the knowledge
//! base, then renamed to the processed marker extension. The rename is the
//! sole durable record of "already ingested": it happens whether or not
//! parsing succeeded, so one malformed document can never wedge the scan.

use mnemo_core::document::{DocumentParser, DocumentSegment, DocumentSplitter};
use mnemo_core::error::IngestError;
use mnemo_memory::LongTermMemory;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Extension a document is renamed to once handled, replacing the watched
/// extension.
const PROCESSED_EXTENSION: &str = "processed";

/// Segments shorter than this after trimming never become knowledge
/// entries.
pub const MIN_SEGMENT_CHARS: usize = 50;

/// Scans a directory for ingestible documents and feeds the knowledge base.
pub struct IngestPipeline {
    memory: LongTermMemory,
    parser: Arc<dyn DocumentParser>,
    splitter: Arc<dyn DocumentSplitter>,
    watch_dir: PathBuf,
    extension: String,
    /// Claim set guarding against a file being picked up twice when a slow
    /// scan overruns the timer interval.
    in_flight: Mutex<HashSet<PathBuf>>,
}

impl IngestPipeline {
    pub fn new(
        memory: LongTermMemory,
        parser: Arc<dyn DocumentParser>,
        splitter: Arc<dyn DocumentSplitter>,
        watch_dir: impl Into<PathBuf>,
        extension: &str,
    ) -> Self {
        Self {
            memory,
            parser,
            splitter,
            watch_dir: watch_dir.into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Sweep the watched directory once, processing every unclaimed
    /// document with the watched extension. A missing directory yields an
    /// empty report, not an error.
    pub async fn scan(&self) -> ScanReport {
        let mut dir = match tokio::fs::read_dir(&self.watch_dir).await {
            Ok(dir) => dir,
            Err(_) => return ScanReport::default(),
        };

        let mut report = ScanReport::default();
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %self.watch_dir.display(), "Failed to read watch directory: {e}");
                    break;
                }
            };
            if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.path();
            if !self.watched(&path) {
                continue;
            }
            if !self.claim(&path).await {
                debug!(path = %path.display(), "Document already claimed by an overlapping scan");
                continue;
            }
            let file = self.process_file(&path).await;
            self.release(&path).await;
            report.files.push(file);
        }
        report
    }

    /// Start the background scan loop.
    ///
    /// Returns a channel receiver that emits one report per sweep (the
    /// caller decides what to surface) and the join handle for the loop
    /// task. The loop stops once the receiver is dropped.
    pub fn start(
        self: Arc<Self>,
        every: Duration,
    ) -> (mpsc::Receiver<ScanReport>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<ScanReport>(16);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let report = self.scan().await;
                if tx.send(report).await.is_err() {
                    debug!("Scan report receiver dropped, stopping ingest loop");
                    return;
                }
            }
        });

        (rx, handle)
    }

    fn watched(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }

    async fn claim(&self, path: &Path) -> bool {
        self.in_flight.lock().await.insert(path.to_path_buf())
    }

    async fn release(&self, path: &Path) {
        self.in_flight.lock().await.remove(path);
    }

    async fn process_file(&self, path: &Path) -> FileReport {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!(path = %path.display(), "Processing document");

        let report = match self.ingest_document(path, &name).await {
            Ok((stored, total)) => {
                info!("Processed {name} - {stored} segments stored out of {total} total");
                FileReport {
                    name,
                    stored,
                    total,
                    marked: false,
                }
            }
            Err(e) => {
                warn!(document = %name, "Marking unparseable document processed: {e}");
                FileReport {
                    name,
                    stored: 0,
                    total: 0,
                    marked: false,
                }
            }
        };

        // Unconditional, so a malformed document is never revisited.
        let marked = self.mark_processed(path).await;
        FileReport { marked, ..report }
    }

    async fn ingest_document(
        &self,
        path: &Path,
        name: &str,
    ) -> std::result::Result<(usize, usize), IngestError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| IngestError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let text = self.parser.parse(&bytes)?;
        let segments = self.splitter.split(&text);
        let total = segments.len();

        let mut stored = 0usize;
        for (position, raw) in segments.iter().enumerate() {
            let trimmed = raw.trim();
            if trimmed.chars().count() < MIN_SEGMENT_CHARS {
                debug!(document = %name, section = position + 1, "Discarding short segment");
                continue;
            }
            let segment = DocumentSegment {
                text: trimmed.to_string(),
                index: position + 1,
                total,
                source: name.to_string(),
            };
            // Failures are logged by the store; a bad write skips one
            // segment, never the rest of the document.
            if self.memory.store_knowledge(&segment.with_header()).await {
                stored += 1;
            }
        }
        Ok((stored, total))
    }

    async fn mark_processed(&self, path: &Path) -> bool {
        let marked = path.with_extension(PROCESSED_EXTENSION);
        match tokio::fs::rename(path, &marked).await {
            Ok(()) => {
                debug!(from = %path.display(), to = %marked.display(), "Applied processed marker");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to apply processed marker: {e}");
                false
            }
        }
    }
}

/// Outcome of one directory sweep.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub files: Vec<FileReport>,
}

impl ScanReport {
    /// True when the sweep found nothing to process.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Entries committed across all documents in this sweep.
    pub fn stored(&self) -> usize {
        self.files.iter().map(|f| f.stored).sum()
    }
}

/// Outcome of one processed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Source file name without its directory.
    pub name: String,
    /// Segments committed to the knowledge base.
    pub stored: usize,
    /// Segments the document split into, before filtering.
    pub total: usize,
    /// Whether the processed marker rename succeeded.
    pub marked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParagraphSplitter, PlainTextParser};
    use mnemo_backends::InMemoryBackend;
    use mnemo_core::backend::{MemoryBackend, SearchFilter};
    use mnemo_core::entry::MemoryEntry;
    use mnemo_core::error::MemoryError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tokio::sync::Notify;

    const LONG_A: &str =
        "Our standard shipping option delivers within three to five business days across the region.";
    const LONG_B: &str =
        "Returns are accepted within thirty days of delivery as long as the item is unused and boxed.";
    const SHORT: &str = "Contact support for help.";

    fn pipeline_for(dir: &Path, backend: Arc<dyn MemoryBackend>) -> Arc<IngestPipeline> {
        Arc::new(IngestPipeline::new(
            LongTermMemory::new(backend),
            Arc::new(PlainTextParser),
            Arc::new(ParagraphSplitter::default()),
            dir,
            "txt",
        ))
    }

    #[tokio::test]
    async fn stores_long_segments_and_marks_processed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("returns.txt");
        std::fs::write(&path, format!("{LONG_A}\n\n{SHORT}\n\n{LONG_B}")).unwrap();

        let backend = Arc::new(InMemoryBackend::new());
        let pipeline = pipeline_for(dir.path(), backend.clone());
        let report = pipeline.scan().await;

        assert_eq!(
            report.files,
            vec![FileReport {
                name: "returns.txt".into(),
                stored: 2,
                total: 3,
                marked: true,
            }]
        );
        let entries = backend.entries().await;
        assert_eq!(entries.len(), 2);
        assert!(
            entries[0]
                .text
                .starts_with("[Document: returns.txt | Section 1 of 3]")
        );
        assert!(
            entries[1]
                .text
                .starts_with("[Document: returns.txt | Section 3 of 3]")
        );
        assert!(!path.exists());
        assert!(dir.path().join("returns.processed").exists());
    }

    #[tokio::test]
    async fn second_scan_is_a_noop_once_marked() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("faq.txt"), LONG_A).unwrap();

        let backend = Arc::new(InMemoryBackend::new());
        let pipeline = pipeline_for(dir.path(), backend.clone());

        assert_eq!(pipeline.scan().await.stored(), 1);
        let second = pipeline.scan().await;
        assert!(second.is_empty());
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn missing_watch_directory_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("never-created");
        let pipeline = pipeline_for(&gone, Arc::new(InMemoryBackend::new()));
        assert!(pipeline.scan().await.is_empty());
    }

    #[tokio::test]
    async fn unparseable_document_is_marked_without_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("junk.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let backend = Arc::new(InMemoryBackend::new());
        let pipeline = pipeline_for(dir.path(), backend.clone());
        let report = pipeline.scan().await;

        assert_eq!(
            report.files,
            vec![FileReport {
                name: "junk.txt".into(),
                stored: 0,
                total: 0,
                marked: true,
            }]
        );
        assert!(backend.is_empty().await);
        assert!(dir.path().join("junk.processed").exists());
    }

    #[tokio::test]
    async fn blank_document_is_marked_without_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("empty.txt"), "  \n\n \t\n").unwrap();

        let backend = Arc::new(InMemoryBackend::new());
        let pipeline = pipeline_for(dir.path(), backend.clone());
        pipeline.scan().await;

        assert!(backend.is_empty().await);
        assert!(dir.path().join("empty.processed").exists());
    }

    #[tokio::test]
    async fn short_segments_are_filtered_not_stored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tiny.txt"), format!("{SHORT}\n\nAlso short.")).unwrap();

        let backend = Arc::new(InMemoryBackend::new());
        let pipeline = pipeline_for(dir.path(), backend.clone());
        let report = pipeline.scan().await;

        assert_eq!(report.files[0].stored, 0);
        assert_eq!(report.files[0].total, 2);
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn extension_match_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("NOTES.TXT"), LONG_A).unwrap();
        std::fs::write(dir.path().join("skip.md"), LONG_B).unwrap();

        let backend = Arc::new(InMemoryBackend::new());
        let pipeline = pipeline_for(dir.path(), backend.clone());
        let report = pipeline.scan().await;

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].name, "NOTES.TXT");
        assert!(dir.path().join("NOTES.processed").exists());
        assert!(dir.path().join("skip.md").exists());
    }

    /// Fails the first create, then recovers.
    struct FlakyBackend {
        inner: InMemoryBackend,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MemoryBackend for FlakyBackend {
        async fn create(
            &self,
            entries: Vec<MemoryEntry>,
        ) -> std::result::Result<(), MemoryError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(MemoryError::Transport("connection reset".into()));
            }
            self.inner.create(entries).await
        }

        async fn search(
            &self,
            filter: SearchFilter,
        ) -> std::result::Result<Vec<String>, MemoryError> {
            self.inner.search(filter).await
        }
    }

    #[tokio::test]
    async fn storage_failure_skips_one_segment_not_the_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("policy.txt"), format!("{LONG_A}\n\n{LONG_B}")).unwrap();

        let backend = Arc::new(FlakyBackend {
            inner: InMemoryBackend::new(),
            calls: AtomicUsize::new(0),
        });
        let pipeline = pipeline_for(dir.path(), backend.clone());
        let report = pipeline.scan().await;

        assert_eq!(report.files[0].stored, 1);
        assert_eq!(report.files[0].total, 2);
        assert!(report.files[0].marked);
        let entries = backend.inner.entries().await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].text.contains("Section 2 of 2"));
    }

    /// Parks every create until released, to keep a scan in flight.
    struct ParkedBackend {
        inner: InMemoryBackend,
        entered: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl MemoryBackend for ParkedBackend {
        async fn create(
            &self,
            entries: Vec<MemoryEntry>,
        ) -> std::result::Result<(), MemoryError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.create(entries).await
        }

        async fn search(
            &self,
            filter: SearchFilter,
        ) -> std::result::Result<Vec<String>, MemoryError> {
            self.inner.search(filter).await
        }
    }

    #[tokio::test]
    async fn overlapping_scan_skips_claimed_documents() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("claimed.txt"), LONG_A).unwrap();

        let backend = Arc::new(ParkedBackend {
            inner: InMemoryBackend::new(),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let pipeline = pipeline_for(dir.path(), backend.clone());

        let first = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.scan().await }
        });
        // Wait until the first scan holds the claim and is parked in the
        // store call.
        backend.entered.notified().await;

        let second = pipeline.scan().await;
        assert!(second.is_empty());

        backend.release.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first.stored(), 1);
        assert!(first.files[0].marked);
        assert_eq!(backend.inner.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn background_loop_emits_reports_until_receiver_drops() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("doc.txt"), LONG_B).unwrap();

        let backend = Arc::new(InMemoryBackend::new());
        let pipeline = pipeline_for(dir.path(), backend.clone());
        let (mut reports, handle) = pipeline.clone().start(Duration::from_secs(5));

        let first = reports.recv().await.unwrap();
        assert_eq!(first.stored(), 1);

        let second = reports.recv().await.unwrap();
        assert!(second.is_empty());

        drop(reports);
        handle.await.unwrap();
    }
}
