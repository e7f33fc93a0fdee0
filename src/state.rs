use std::path::Path;

use crate::data::export::{export_file_name, export_to_path};
use crate::data::filter::{pasture_options, sex_options, FilterState, FilteredView};
use crate::data::gain::calculate_gains;
use crate::data::loader::{load_bytes, load_file, SourceFormat};
use crate::data::model::{AnimalGainSummary, RawRecord};
use crate::error::{ExportError, IngestError};

// ---------------------------------------------------------------------------
// Loaded dataset
// ---------------------------------------------------------------------------

/// Result of one upload. Replaced wholesale by the next successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub source_name: String,
    pub row_count: usize,
    pub summaries: Vec<AnimalGainSummary>,
    pub pasture_options: Vec<String>,
    pub sex_options: Vec<String>,
}

impl Dataset {
    pub fn from_records(source_name: &str, records: &[RawRecord]) -> Self {
        let summaries = calculate_gains(records);
        Self {
            source_name: source_name.to_string(),
            row_count: records.len(),
            pasture_options: pasture_options(&summaries),
            sex_options: sex_options(&summaries),
            summaries,
        }
    }
}

/// A line for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// Current pasture / age band / sex selection.
    pub filters: FilterState,

    /// Status / error message shown in the UI.
    pub message: Option<Message>,
}

impl AppState {
    /// Load a file picked from disk.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.ingest(&name, load_file(path));
    }

    /// Load file content that arrived without a readable path (drag and drop).
    pub fn load_dropped(&mut self, name: &str, bytes: &[u8]) {
        let result =
            SourceFormat::from_path(Path::new(name)).and_then(|format| load_bytes(bytes, format));
        self.ingest(name, result);
    }

    fn ingest(&mut self, name: &str, result: Result<Vec<RawRecord>, IngestError>) {
        match result {
            Ok(records) => {
                let dataset = Dataset::from_records(name, &records);
                log::info!(
                    "Loaded {name}: {} rows, {} animals with a computed gain",
                    dataset.row_count,
                    dataset.summaries.len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e:#}");
                self.message = Some(Message::Error(format!("Error processing file: {e}")));
            }
        }
    }

    /// Replace the current dataset and reset the filters.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.filters = FilterState::default();
        self.message = None;
        self.dataset = Some(dataset);
    }

    /// Summaries passing the current filters, recomputed on every call.
    pub fn view(&self) -> FilteredView<'_> {
        let summaries = self
            .dataset
            .as_ref()
            .map(|ds| ds.summaries.as_slice())
            .unwrap_or(&[]);
        FilteredView::new(summaries, &self.filters)
    }

    /// Default file name for an export of the current view.
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.filters)
    }

    /// Export the current view to `path`, reporting the outcome in `message`.
    pub fn export_to(&mut self, path: &Path) {
        let result = export_to_path(&self.view(), path);
        self.message = Some(match result {
            Ok(()) => Message::Info(format!("Exported to {}", path.display())),
            Err(ExportError::Empty) => Message::Info("No data to export".to_string()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                Message::Error(format!("Export failed: {e}"))
            }
        });
    }
}
