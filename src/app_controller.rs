use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::document::{BaselineSelector, Document, RectifyReport};
use crate::eaf;
use crate::export::CsvExporter;
use crate::file_utils::FileManager;
use crate::validation::{IntegrityChecker, IntegrityReport};

// @module: Application controller for annotation document processing

/// Outcome counts of a multi-file run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Where edited documents are written
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Directory for output files; next to the input when unset
    pub output_dir: Option<PathBuf>,
    /// Overwrite the input file instead of writing `<stem>.<suffix>.eaf`
    pub in_place: bool,
    /// Replace existing output files
    pub force_overwrite: bool,
}

/// A tier edit applied to every input document
#[derive(Debug, Clone)]
pub enum TierEdit {
    Copy {
        source: String,
        target: String,
        parent: Option<String>,
        linguistic_type: Option<String>,
        after: Option<String>,
    },
    Rename {
        tier: String,
        new_id: String,
    },
    Reparent {
        tier: String,
        parent: Option<String>,
        linguistic_type: Option<String>,
    },
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Document holding the template types, loaded once
    template: Option<Document>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let template = match config.template.as_deref() {
            Some(path) => Some(
                eaf::read_template(path).with_context(|| format!("Failed to load template {}", path))?,
            ),
            None => None,
        };

        Ok(Self { config, template })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load a document with the configured chain depth and template types
    pub fn load(&self, path: &Path) -> Result<Document> {
        let mut document = eaf::read_document(path, self.config.max_chain_depth)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        if let Some(template) = &self.template {
            document.import_types(template);
        }
        Ok(document)
    }

    /// The documents an input path stands for: the file itself or every `.eaf` below a folder
    pub fn inputs(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if input.is_file() {
            return Ok(vec![input.to_path_buf()]);
        }
        if input.is_dir() {
            let documents = FileManager::find_documents(input)?;
            if documents.is_empty() {
                return Err(anyhow!("No .eaf files found in directory: {:?}", input));
            }
            return Ok(documents);
        }
        Err(anyhow!("Input path does not exist: {:?}", input))
    }

    /// Run `action` on every input document, logging and counting per-file failures.
    ///
    /// Folder inputs get a progress bar. `action` returns false to mark a file
    /// as skipped.
    pub fn for_each_document<F>(&self, input: &Path, mut action: F) -> Result<RunSummary>
    where
        F: FnMut(&Path) -> Result<bool>,
    {
        let files = self.inputs(input)?;
        let mut summary = RunSummary::default();

        if files.len() == 1 {
            match action(&files[0])? {
                true => summary.processed += 1,
                false => summary.skipped += 1,
            }
            return Ok(summary);
        }

        let start_time = std::time::Instant::now();
        let folder_pb = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match action(file) {
                Ok(true) => summary.processed += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    folder_pb.suspend(|| error!("Error processing file {}: {:#}", file_name, e));
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {:.1}s: {} processed, {} skipped, {} errors",
            start_time.elapsed().as_secs_f64(),
            summary.processed,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    /// One line per tier: id, type, parent, participant and annotation count
    pub fn tier_listing(&self, document: &Document) -> Vec<String> {
        document
            .tiers()
            .iter()
            .map(|tier| {
                format!(
                    "{}\t{}\t{}\t{}\t{}",
                    tier.id,
                    tier.linguistic_type,
                    tier.parent.as_deref().unwrap_or("-"),
                    tier.participant.as_deref().unwrap_or("-"),
                    tier.annotations.len()
                )
            })
            .collect()
    }

    /// Coverage of the configured fields against the configured baseline
    pub fn status(&self, document: &Document) -> BTreeMap<String, f64> {
        let fields = self.config.field_filter();
        let baseline = BaselineSelector::from_field(self.config.baseline_field.as_deref());
        document.coverage(fields.as_deref(), &baseline)
    }

    /// Export every input document into the configured CSV file
    pub fn export(&self, input: &Path) -> Result<(RunSummary, usize)> {
        let csv_file = PathBuf::from(&self.config.csv_file);
        let mut exporter = CsvExporter::create(&csv_file, self.config.csv_append)
            .with_context(|| format!("Failed to open {}", csv_file.display()))?;
        let fields = self.config.field_filter();

        let summary = self.for_each_document(input, |path| {
            let document = self.load(path)?;
            let rows = document.export_rows(fields.as_deref());
            let written = exporter.write_rows(&rows)?;
            debug!("Exported {} rows from {}", written, document.name());
            Ok(true)
        })?;

        let rows = exporter.finish()?;
        info!("Exported {} rows to {}", rows, csv_file.display());
        Ok((summary, rows))
    }

    /// Run the integrity checker on every input document
    pub fn check(&self, input: &Path) -> Result<Vec<IntegrityReport>> {
        let checker = IntegrityChecker::new();
        let mut reports = Vec::new();
        self.for_each_document(input, |path| {
            let document = self.load(path)?;
            reports.push(checker.check(&document));
            Ok(true)
        })?;
        Ok(reports)
    }

    /// Apply a tier edit to one loaded document
    pub fn apply_edit(&self, document: &mut Document, edit: &TierEdit) -> Result<Option<RectifyReport>> {
        match edit {
            TierEdit::Copy {
                source,
                target,
                parent,
                linguistic_type,
                after,
            } => {
                let copy = document.copy_tier(source, target, parent.as_deref(), linguistic_type.as_deref())?;
                document.insert_tier(copy, after.as_deref().or(Some(source.as_str())))?;
                Ok(None)
            }
            TierEdit::Rename { tier, new_id } => {
                document.rename_tier(tier, new_id)?;
                Ok(None)
            }
            TierEdit::Reparent {
                tier,
                parent,
                linguistic_type,
            } => {
                let report = document.change_parent(tier, parent.as_deref(), linguistic_type.as_deref())?;
                if !report.is_complete() {
                    for skipped in &report.skipped {
                        warn!("{}: {}", document.name(), skipped);
                    }
                }
                Ok(Some(report))
            }
        }
    }

    /// Apply a tier edit to every input document and write the results
    pub fn edit(&self, input: &Path, edit: &TierEdit, output: &OutputOptions) -> Result<RunSummary> {
        self.for_each_document(input, |path| {
            let output_path = self.output_path(path, output);
            if output_path.exists() && !output.force_overwrite && !output.in_place {
                warn!(
                    "Skipping {}, output already exists (use -f to force overwrite)",
                    output_path.display()
                );
                return Ok(false);
            }

            let mut document = self.load(path)?;
            self.apply_edit(&mut document, edit)?;
            if let Some(parent) = output_path.parent() {
                FileManager::ensure_dir(parent)?;
            }
            document.write_to_path(&output_path)?;
            Ok(true)
        })
    }

    /// Output file for an edited input
    pub fn output_path(&self, input_file: &Path, output: &OutputOptions) -> PathBuf {
        if output.in_place {
            return input_file.to_path_buf();
        }
        let output_dir = match &output.output_dir {
            Some(dir) => dir.clone(),
            None => input_file.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        FileManager::generate_output_path(input_file, output_dir, &self.config.output_suffix)
    }
}
