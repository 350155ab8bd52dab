use polars::prelude::*;
use tracing::{info, warn};

use crate::config::{MissingSourcePolicy, SourceSpec, SourcesConfig};
use crate::error::{PipelineError, Result};
use crate::models::{CanonicalRecord, IngestStats};
use crate::processor::{PriceSanitizer, SchemaNormalizer};
use crate::reader::SourceReader;
use crate::storage::CanonicalDataset;

/// Reads every configured source, stacks the normalized frames in
/// configuration order and reduces them to the canonical dataset.
pub struct Aggregator<'a> {
    config: &'a SourcesConfig,
    reader: SourceReader,
    normalizer: SchemaNormalizer,
    sanitizer: PriceSanitizer,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a SourcesConfig) -> Self {
        Self {
            config,
            reader: SourceReader::new(&config.na_values),
            normalizer: SchemaNormalizer::new(),
            sanitizer: PriceSanitizer,
        }
    }

    pub fn build(&self) -> Result<CanonicalDataset> {
        let mut frames = Vec::with_capacity(self.config.sources.len());
        let mut stats = Vec::with_capacity(self.config.sources.len());

        for spec in &self.config.sources {
            let (frame, source_stats) = self.ingest_source(spec)?;
            frames.push(frame);
            stats.push(source_stats);
        }

        let mut combined = self.stack_frames(frames)?;
        normalize_product_names(&mut combined)?;
        let unparseable = self.sanitizer.sanitize_column(&mut combined, "price")?;

        let keep = usable_rows(&combined)?;
        tally_kept_rows(&mut stats, &keep);

        let mask: BooleanChunked = keep.iter().copied().collect();
        let canonical = combined.filter(&mask)?;
        let records = frame_to_records(&canonical)?;

        info!(
            "Canonical dataset built: {} of {} rows kept ({} unparseable prices)",
            records.len(),
            keep.len(),
            unparseable
        );

        Ok(CanonicalDataset::new(records, stats))
    }

    fn ingest_source(&self, spec: &SourceSpec) -> Result<(DataFrame, IngestStats)> {
        let path = self.config.resolve_path(spec);
        let mut stats = IngestStats {
            file: spec.file.clone(),
            source: spec.source.clone(),
            category: spec.category.clone(),
            ..Default::default()
        };

        let table = match self.reader.read_path(&path) {
            Ok(table) => table,
            Err(err @ PipelineError::SourceUnavailable { .. })
                if self.config.on_missing_source == MissingSourcePolicy::Skip =>
            {
                warn!("Skipping source {} ({}): {}", spec.source, spec.category, err);
                stats.missing = true;
                return Ok((self.normalizer.empty_frame()?, stats));
            }
            Err(err) => return Err(err),
        };

        stats.rows_read = table.rows.len();
        stats.malformed_rows_skipped = table.skipped_rows;

        let frame = self.normalizer.normalize(&table.rows, spec)?;
        Ok((frame, stats))
    }

    fn stack_frames(&self, frames: Vec<DataFrame>) -> Result<DataFrame> {
        let mut iter = frames.into_iter();
        let Some(mut combined) = iter.next() else {
            return self.normalizer.empty_frame();
        };

        for frame in iter {
            combined = combined.vstack(&frame)?;
        }

        Ok(combined)
    }
}

/// Lowercase and trim names; a name that is empty afterwards counts as missing.
fn normalize_product_names(df: &mut DataFrame) -> Result<()> {
    let names: Vec<Option<String>> = df
        .column("product_name")?
        .str()?
        .into_iter()
        .map(|name| {
            name.map(|s| s.to_lowercase().trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .collect();

    df.with_column(Series::new("product_name".into(), names))?;
    Ok(())
}

fn usable_rows(df: &DataFrame) -> Result<Vec<bool>> {
    let names = df.column("product_name")?.str()?;
    let prices = df.column("price")?.f64()?;

    Ok(names
        .into_iter()
        .zip(prices.into_iter())
        .map(|(name, price)| name.is_some() && price.is_some())
        .collect())
}

/// Rows are stacked in source order, so each source owns a contiguous slice.
fn tally_kept_rows(stats: &mut [IngestStats], keep: &[bool]) {
    let mut offset = 0;
    for source_stats in stats.iter_mut() {
        let end = offset + source_stats.rows_read;
        let kept = keep[offset..end].iter().filter(|k| **k).count();
        source_stats.rows_kept = kept;
        source_stats.rows_dropped = source_stats.rows_read - kept;
        offset = end;
    }
}

fn frame_to_records(df: &DataFrame) -> Result<Vec<CanonicalRecord>> {
    let names = df.column("product_name")?.str()?;
    let brands = df.column("brand")?.str()?;
    let categories = df.column("category")?.str()?;
    let prices = df.column("price")?.f64()?;
    let sources = df.column("source")?.str()?;

    let records = names
        .into_iter()
        .zip(brands.into_iter())
        .zip(categories.into_iter())
        .zip(prices.into_iter())
        .zip(sources.into_iter())
        .filter_map(|((((name, brand), category), price), source)| {
            Some(CanonicalRecord {
                product_name: name?.to_string(),
                brand: brand.map(str::to_string),
                category: category?.to_string(),
                price: price?,
                source: source?.to_string(),
            })
        })
        .collect();

    Ok(records)
}
