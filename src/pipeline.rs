use std::path::{Path, PathBuf};

use crate::analysis::analyze;
use crate::chart::{self, ChartArtifact};
use crate::data::loader::load_csv;
use crate::error::{LoadError, PipelineError};
use crate::narrative::NarrativeClient;
use crate::report::write_report;

// ---------------------------------------------------------------------------
// One run: load → analyze → chart → narrate → report
// ---------------------------------------------------------------------------

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: usize,
    pub columns: usize,
    pub charts: Vec<ChartArtifact>,
    pub report: PathBuf,
}

/// Run the whole pipeline for `input`, writing charts and `README.md`
/// into `out_dir`.
///
/// A missing file, an unparsable file or a table without data rows stops
/// the run before anything is written. A failed narrative request does not:
/// the error text becomes the story.
pub fn run(
    input: &Path,
    out_dir: &Path,
    client: &NarrativeClient,
) -> Result<RunSummary, PipelineError> {
    if !input.is_file() {
        return Err(PipelineError::NotFound(input.to_path_buf()));
    }

    let dataset = match load_csv(input) {
        Ok(ds) => ds,
        Err(LoadError::Empty) => return Err(PipelineError::EmptyDataset),
        Err(LoadError::NotFound(path)) => return Err(PipelineError::NotFound(path)),
        Err(e) => return Err(e.into()),
    };

    let analysis = analyze(&dataset);
    let charts = chart::visualize(&dataset, out_dir)?;
    let narrative = client.narrate(&analysis, &charts);
    let report = write_report(out_dir, &narrative, &charts)?;

    Ok(RunSummary {
        rows: dataset.len(),
        columns: dataset.column_count(),
        charts,
        report,
    })
}
