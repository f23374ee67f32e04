//! Strided frame sampling over a frame source.

use crate::extractor::{CardExtractor, RectifiedCard};
use crate::source::FrameSource;
use crate::store::CardStore;
use crate::{RejectionKind, SamplerParams};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Counters of one sampling session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SamplingReport {
    pub frames_read: usize,
    /// Frame positions the source could not decode; they still count toward
    /// the stride.
    pub frames_unreadable: usize,
    /// Frames handed to the extractor (one per stride).
    pub frames_sampled: usize,
    pub accepted: usize,
    pub rejected: BTreeMap<RejectionKind, usize>,
    pub write_failures: usize,
    pub cancelled: bool,
}

impl SamplingReport {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Result of a sampling session.
#[derive(Clone, Debug, Default)]
pub struct SamplingOutcome {
    pub cards: Vec<RectifiedCard>,
    /// Files written for `cards`, when a store was attached.
    pub paths: Vec<PathBuf>,
    pub report: SamplingReport,
}

/// Feeds one frame out of `stride` to a [`CardExtractor`].
#[derive(Debug)]
pub struct FrameSampler<'a> {
    extractor: &'a CardExtractor,
    stride: usize,
    store: Option<CardStore>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> FrameSampler<'a> {
    /// A stride of 0 is treated as 1.
    pub fn new(extractor: &'a CardExtractor, params: SamplerParams) -> Self {
        Self {
            extractor,
            stride: params.stride.max(1),
            store: None,
            cancel: None,
        }
    }

    /// Persist every accepted card into `store`.
    pub fn with_store(mut self, store: CardStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Stop before the next frame once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    /// Drain `source`, extracting from frames `0, stride, 2 * stride, ...`.
    ///
    /// Positions are those of the source, so a frame the source skips as
    /// unreadable does not shift the stride of the frames after it. Rejected
    /// frames and unwritable outputs are counted and skipped.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(stride = self.stride)))]
    pub fn run(&self, source: &mut dyn FrameSource) -> SamplingOutcome {
        let mut out = SamplingOutcome::default();
        let skipped_before = source.skipped();

        loop {
            if self.cancelled() {
                log::info!("sampling cancelled after {} frames", out.report.frames_read);
                out.report.cancelled = true;
                break;
            }
            let Some(frame) = source.next_frame() else {
                break;
            };
            let index = out.report.frames_read + source.skipped().saturating_sub(skipped_before);
            out.report.frames_read += 1;
            if index % self.stride != 0 {
                continue;
            }
            out.report.frames_sampled += 1;

            let card = match self.extractor.extract(&frame) {
                Ok(card) => card,
                Err(rejection) => {
                    log::debug!("frame {index}: rejected ({rejection:?})");
                    *out.report.rejected.entry(rejection.kind()).or_default() += 1;
                    continue;
                }
            };

            if let Some(store) = &self.store {
                match store.write(&card.image) {
                    Ok(path) => out.paths.push(path),
                    Err(e) => {
                        log::error!("{e}");
                        out.report.write_failures += 1;
                        continue;
                    }
                }
            }
            out.report.accepted += 1;
            out.cards.push(card);
        }
        out.report.frames_unreadable = source.skipped().saturating_sub(skipped_before);

        log::info!(
            "sampled {} of {} frames: {} accepted, {} rejected",
            out.report.frames_sampled,
            out.report.frames_read,
            out.report.accepted,
            out.report.rejected_total()
        );
        out
    }
}
