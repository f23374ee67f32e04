//! Labelled dataset layout: `{input}/{label}` frames -> `{output}/{label}/*.png`.

use cardset_core::CardLabel;
use cardset_extract::{
    CardExtractor, CardStore, FrameSampler, ImageSequenceSource, SamplerParams, SamplingReport,
    StoreError,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("cannot clear dataset root {path}: {source}")]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome for one label.
#[derive(Clone, Debug, Serialize)]
pub struct LabelSummary {
    pub label: CardLabel,
    pub output_dir: PathBuf,
    /// Cards written for this label.
    pub cards: usize,
    /// Sampling counters; absent when the frame source could not be opened.
    pub report: Option<SamplingReport>,
    /// Why the label was skipped.
    pub error: Option<String>,
}

/// Per-label outcomes of a dataset build, in processing order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DatasetSummary {
    pub labels: Vec<LabelSummary>,
    pub cancelled: bool,
}

impl DatasetSummary {
    pub fn total_cards(&self) -> usize {
        self.labels.iter().map(|l| l.cards).sum()
    }

    /// Labels whose frame source was unavailable.
    pub fn failed(&self) -> impl Iterator<Item = &LabelSummary> {
        self.labels.iter().filter(|l| l.error.is_some())
    }
}

/// Runs the extraction pipeline once per label.
#[derive(Debug)]
pub struct DatasetBuilder<'a> {
    extractor: &'a CardExtractor,
    sampler: SamplerParams,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(extractor: &'a CardExtractor, sampler: SamplerParams) -> Self {
        Self {
            extractor,
            sampler,
            cancel: None,
        }
    }

    /// Shared stop flag, checked between frames and between labels.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    /// Build the dataset under `output`, which is cleared first.
    ///
    /// A label whose frame directory is missing is logged and recorded in the
    /// summary; output directory failures abort the build.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, labels), fields(labels = labels.len())))]
    pub fn run(
        &self,
        input: &Path,
        output: &Path,
        labels: &[CardLabel],
    ) -> Result<DatasetSummary, DatasetError> {
        if output.exists() {
            std::fs::remove_dir_all(output).map_err(|source| DatasetError::OutputRoot {
                path: output.to_path_buf(),
                source,
            })?;
        }

        let mut summary = DatasetSummary::default();
        for &label in labels {
            if self.cancelled() {
                summary.cancelled = true;
                break;
            }
            let name = label.to_string();
            let output_dir = output.join(&name);
            let store = CardStore::prepare(&output_dir)?;

            let mut source = match ImageSequenceSource::open(input.join(&name)) {
                Ok(source) => source,
                Err(e) => {
                    log::error!("{e}");
                    summary.labels.push(LabelSummary {
                        label,
                        output_dir,
                        cards: 0,
                        report: None,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            let mut sampler = FrameSampler::new(self.extractor, self.sampler).with_store(store);
            if let Some(flag) = &self.cancel {
                sampler = sampler.with_cancel(flag.clone());
            }
            let out = sampler.run(&mut source);
            log::info!("Extracted images for {name}: {}", out.paths.len());

            summary.cancelled |= out.report.cancelled;
            summary.labels.push(LabelSummary {
                label,
                output_dir,
                cards: out.paths.len(),
                report: Some(out.report),
                error: None,
            });
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardset_core::{Rank, Suit};

    #[test]
    fn missing_label_sources_are_recorded_not_raised() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("frames");
        let output = tmp.path().join("cards");
        std::fs::create_dir_all(input.join("As")).unwrap();
        std::fs::create_dir_all(output.join("old")).unwrap();

        let extractor = CardExtractor::default();
        let labels = CardLabel::product(&[Suit::Spades], &[Rank::Ace, Rank::King]);
        let summary = DatasetBuilder::new(&extractor, SamplerParams::default())
            .run(&input, &output, &labels)
            .unwrap();

        assert!(!output.join("old").exists());
        assert_eq!(summary.labels.len(), 2);
        assert_eq!(summary.total_cards(), 0);

        let ace = &summary.labels[0];
        assert_eq!(ace.label.to_string(), "As");
        assert!(ace.error.is_none());
        assert_eq!(ace.report.as_ref().map(|r| r.frames_read), Some(0));
        assert!(ace.output_dir.is_dir());

        let failed: Vec<_> = summary.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].label.to_string(), "Ks");
        assert!(failed[0].report.is_none());
    }

    #[test]
    fn cancelled_build_stops_before_first_label() {
        let tmp = tempfile::tempdir().unwrap();
        let extractor = CardExtractor::default();
        let summary = DatasetBuilder::new(&extractor, SamplerParams::default())
            .with_cancel(Arc::new(AtomicBool::new(true)))
            .run(tmp.path(), &tmp.path().join("out"), &CardLabel::all())
            .unwrap();
        assert!(summary.cancelled);
        assert!(summary.labels.is_empty());
    }
}
