/*!
 * Page Fault Probe
 *
 * Step 1 touches a fresh anonymous buffer: every first touch is a minor
 * fault served from zeroed memory. Step 2 touches a private read-only
 * mapping of a freshly written file: faults are served from the file
 * (page cache or disk), the major-fault path when the cache is cold.
 */

use super::Probe;
use crate::core::config::{require_nonzero, ProbeConfig};
use crate::core::limits::{BACKING_FILE_NAME, FILE_WRITE_CHUNK, MAJOR_FAULT_FILE_MB, MINOR_FAULT_BUFFER_MB};
use crate::core::types::{mib, pages_in, ProbeResult, Size};
use crate::memory::{
    expected_checksum, fault_counters_or_zero, AnonRegion, BackingFile, FaultCounters,
    ProcStatusReader, SnapshotProvider,
};
use crate::report::{LabeledSnapshot, Reporter};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Page fault probe settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFaultSettings {
    pub anon_bytes: Size,
    pub file_bytes: Size,
    /// Backing file location; defaults to the temp dir
    pub file_path: Option<PathBuf>,
}

impl Default for PageFaultSettings {
    fn default() -> Self {
        Self {
            anon_bytes: mib(MINOR_FAULT_BUFFER_MB),
            file_bytes: mib(MAJOR_FAULT_FILE_MB),
            file_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonFaultReport {
    pub bytes: Size,
    pub pages_touched: usize,
    pub faults: FaultCounters,
    pub before: LabeledSnapshot,
    pub after: LabeledSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFaultReport {
    pub path: PathBuf,
    pub bytes: Size,
    pub pages_touched: usize,
    pub checksum: u8,
    pub expected_checksum: u8,
    pub faults: FaultCounters,
    pub before: LabeledSnapshot,
    pub after: LabeledSnapshot,
    /// Backing file no longer exists once the step finished
    pub backing_file_removed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFaultReport {
    pub anonymous: AnonFaultReport,
    pub file_backed: FileFaultReport,
}

pub struct PageFaultProbe<P: SnapshotProvider = ProcStatusReader> {
    config: ProbeConfig,
    settings: PageFaultSettings,
    provider: P,
}

impl PageFaultProbe<ProcStatusReader> {
    pub fn new(config: ProbeConfig, settings: PageFaultSettings) -> Self {
        Self::with_provider(config, settings, ProcStatusReader::new())
    }
}

impl<P: SnapshotProvider> PageFaultProbe<P> {
    pub fn with_provider(config: ProbeConfig, settings: PageFaultSettings, provider: P) -> Self {
        Self {
            config,
            settings,
            provider,
        }
    }

    /// Where the backing file will be created
    pub fn backing_path(&self) -> PathBuf {
        self.settings
            .file_path
            .clone()
            .unwrap_or_else(|| self.config.temp_dir.join(BACKING_FILE_NAME))
    }

    fn measure<W: Write>(&self, reporter: &mut Reporter<W>, label: &str) -> ProbeResult<LabeledSnapshot> {
        let labeled = LabeledSnapshot::new(label, self.provider.snapshot_or_zero());
        reporter.snapshot(&labeled)?;
        Ok(labeled)
    }

    fn anonymous_step<W: Write>(&self, reporter: &mut Reporter<W>) -> ProbeResult<AnonFaultReport> {
        reporter.line("1. Generating minor page faults with anonymous memory...")?;
        let before = self.measure(reporter, "Before anonymous access")?;
        let counters_before = fault_counters_or_zero();

        let mut region = AnonRegion::allocate(self.settings.anon_bytes)?;
        let pages_touched = region.touch_pages(self.config.page_size, 1);

        let faults = fault_counters_or_zero().since(&counters_before);
        let after = self.measure(reporter, "After anonymous access")?;
        drop(region);

        reporter.line(format!(
            "Minor faults: allocation + access completed ({} pages, {} minor, {} major)",
            pages_touched, faults.minor, faults.major
        ))?;

        Ok(AnonFaultReport {
            bytes: self.settings.anon_bytes,
            pages_touched,
            faults,
            before,
            after,
        })
    }

    fn file_step<W: Write>(&self, reporter: &mut Reporter<W>) -> ProbeResult<FileFaultReport> {
        reporter.line("2. Generating major page faults with a file mapping...")?;
        let path = self.backing_path();

        let (pages_touched, checksum, faults, before, after) = {
            let backing = BackingFile::create(
                &path,
                self.settings.file_bytes,
                self.config.fill_byte,
                FILE_WRITE_CHUNK,
            )?;

            let before = self.measure(reporter, "Before mapped access")?;
            let counters_before = fault_counters_or_zero();

            let mapping = backing.map_read_only()?;
            let checksum = mapping.touch_checksum(self.config.page_size);

            let faults = fault_counters_or_zero().since(&counters_before);
            let after = self.measure(reporter, "After mapped access")?;
            let pages_touched = pages_in(mapping.len(), self.config.page_size);

            (pages_touched, checksum, faults, before, after)
        };

        let backing_file_removed = !path.exists();
        debug!(path = %path.display(), removed = backing_file_removed, "file step finished");

        reporter.line(format!(
            "Major faults: mmap file access completed (checksum: {}, {} minor, {} major)",
            checksum, faults.minor, faults.major
        ))?;

        Ok(FileFaultReport {
            path,
            bytes: self.settings.file_bytes,
            pages_touched,
            checksum,
            expected_checksum: expected_checksum(self.config.fill_byte, pages_touched),
            faults,
            before,
            after,
            backing_file_removed,
        })
    }
}

impl<P: SnapshotProvider> Probe for PageFaultProbe<P> {
    type Report = PageFaultReport;

    fn name(&self) -> &'static str {
        "page-faults"
    }

    fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> ProbeResult<PageFaultReport> {
        self.config.validate()?;
        require_nonzero("anonymous buffer size", self.settings.anon_bytes)?;
        require_nonzero("file size", self.settings.file_bytes)?;

        reporter.line("Page Faults Demonstration")?;
        reporter.blank()?;

        let anonymous = self.anonymous_step(reporter)?;
        let file_backed = self.file_step(reporter)?;

        Ok(PageFaultReport {
            anonymous,
            file_backed,
        })
    }
}
