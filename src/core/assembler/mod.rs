//! # Database Assembler
//!
//! Orchestrates indexing, matching, attribute resolution and merging for
//! one set at a time.
//!
//! ## Stages
//! 1. **Index** - fingerprint every candidate, one index per pack plus a
//!    combined index for loose images and one for the promo pool
//! 2. **Match** - fingerprint local images (in parallel) and match each
//!    against its pool's index
//! 3. **Resolve** - derive record attributes for every match
//! 4. **Merge** - collapse duplicates and sort by card number
//!
//! Per-image problems are logged, counted in the [`RunSummary`] and
//! skipped. Configuration problems abort the set being assembled and
//! nothing else.

mod merge;
mod summary;

pub use merge::{merge_records, sort_records, MergeOutcome, ResolvedCard};
pub use summary::RunSummary;

use crate::core::catalog::{Catalog, SetConfig};
use crate::core::hasher::{HashAlgorithm, HashAlgorithmKind, HasherConfig, DEFAULT_HASH_SIZE};
use crate::core::index::CandidateIndex;
use crate::core::listing::{CandidatePool, CandidatePools, SetListing};
use crate::core::matcher::{LocalImage, MatchFailure, Matcher, DEFAULT_MATCH_THRESHOLD};
use crate::core::resolver::{AttributeResolver, CardRecord, PoolKind, SetContext};
use crate::core::scanner::{ScanConfig, SetImageScanner, SetImages};
use crate::error::{CardDbError, ConfigError, ResolveError};
use crate::events::{
    null_sender, AssemblyEvent, AssemblyPhase, Event, EventSender, IndexEvent, MatchEvent,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Records assembled for one set.
#[derive(Debug, Clone, Serialize)]
pub struct SetDatabase {
    pub set_name: String,
    pub regular: Vec<CardRecord>,
    pub promo: Vec<CardRecord>,
    pub summary: RunSummary,
}

/// Where one set's inputs live on disk.
#[derive(Debug, Clone)]
pub struct SetSources {
    pub set_name: String,
    pub listing: PathBuf,
    pub images_dir: PathBuf,
}

/// Records of a multi-set run, concatenated in catalog order.
#[derive(Debug, Default)]
pub struct FullDatabase {
    pub sets: Vec<SetDatabase>,
    /// Sets that were abandoned, with the reason
    pub aborted: Vec<(String, String)>,
}

impl FullDatabase {
    pub fn regular(&self) -> impl Iterator<Item = &CardRecord> {
        self.sets.iter().flat_map(|s| s.regular.iter())
    }

    /// Promo records of every set, one per `(card_number, expansion_id)`.
    ///
    /// The same promo card found in several sets' folders keeps the record
    /// of the first set, in run order.
    pub fn promo(&self) -> Vec<CardRecord> {
        let mut seen = HashSet::new();
        self.sets
            .iter()
            .flat_map(|s| s.promo.iter())
            .filter(|r| seen.insert((r.card_number.as_str(), r.expansion_id.as_str())))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        let mut total = RunSummary::new("all sets");
        for set in &self.sets {
            total.absorb(&set.summary);
        }
        total
    }
}

#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub threshold: u32,
    pub algorithm: HashAlgorithmKind,
    pub hash_size: u32,
    pub scan_config: ScanConfig,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            algorithm: HashAlgorithmKind::Average,
            hash_size: DEFAULT_HASH_SIZE,
            scan_config: ScanConfig::default(),
        }
    }
}

pub struct AssemblerBuilder<'a> {
    catalog: &'a Catalog,
    config: AssemblerConfig,
}

impl<'a> AssemblerBuilder<'a> {
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    pub fn hash_size(mut self, hash_size: u32) -> Self {
        self.config.hash_size = hash_size;
        self
    }

    pub fn scan_config(mut self, scan_config: ScanConfig) -> Self {
        self.config.scan_config = scan_config;
        self
    }

    pub fn build(self) -> Result<DatabaseAssembler<'a>, CardDbError> {
        let hasher = HasherConfig::new()
            .algorithm(self.config.algorithm)
            .hash_size(self.config.hash_size)
            .build()?;

        // A threshold can never exceed the fingerprint's bit count
        let max = self.config.hash_size.saturating_mul(self.config.hash_size);
        if self.config.threshold > max {
            return Err(ConfigError::InvalidThreshold {
                value: self.config.threshold,
                max,
            }
            .into());
        }

        Ok(DatabaseAssembler {
            catalog: self.catalog,
            hasher,
            matcher: Matcher::with_threshold(self.config.threshold),
            scanner: SetImageScanner::new(self.config.scan_config.clone()),
            config: self.config,
        })
    }
}

pub struct DatabaseAssembler<'a> {
    catalog: &'a Catalog,
    hasher: Box<dyn HashAlgorithm>,
    matcher: Matcher,
    scanner: SetImageScanner,
    config: AssemblerConfig,
}

/// Indices for one set, keyed by pool.
struct SetIndices {
    packs: BTreeMap<String, CandidateIndex>,
    combined: CandidateIndex,
    promo: CandidateIndex,
}

impl<'a> DatabaseAssembler<'a> {
    pub fn builder(catalog: &'a Catalog) -> AssemblerBuilder<'a> {
        AssemblerBuilder {
            catalog,
            config: AssemblerConfig::default(),
        }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn assemble(
        &self,
        set_name: &str,
        candidates: CandidatePools,
        images: &SetImages,
    ) -> Result<SetDatabase, ConfigError> {
        self.assemble_with_events(set_name, candidates, images, &null_sender())
    }

    /// Build the record collections of one set.
    ///
    /// Fails only on configuration errors: an unknown set, an exclusive
    /// card whose pack has no suffix, or an exclusive/shared number
    /// collision.
    pub fn assemble_with_events(
        &self,
        set_name: &str,
        candidates: CandidatePools,
        images: &SetImages,
        events: &EventSender,
    ) -> Result<SetDatabase, ConfigError> {
        self.assemble_scanned(set_name, candidates, images, 0, events)
    }

    fn assemble_scanned(
        &self,
        set_name: &str,
        candidates: CandidatePools,
        images: &SetImages,
        scan_errors: usize,
        events: &EventSender,
    ) -> Result<SetDatabase, ConfigError> {
        let start = Instant::now();
        let set = self.catalog.set(set_name)?;
        let mut summary = RunSummary::new(set_name);
        summary.images_total = images.len();
        summary.listing_rejected = candidates.rejected.len();
        summary.scan_errors = scan_errors;

        events.send(Event::Assembly(AssemblyEvent::SetStarted {
            set_name: set_name.to_string(),
        }));
        info!(
            set = set_name,
            images = images.len(),
            algorithm = %self.hasher.kind(),
            rule = %self.matcher.description(),
            "Assembling set"
        );

        events.send(Event::Assembly(AssemblyEvent::PhaseChanged {
            phase: AssemblyPhase::Indexing,
        }));
        let indices = self.build_indices(candidates, &mut summary, events);

        events.send(Event::Assembly(AssemblyEvent::PhaseChanged {
            phase: AssemblyPhase::Matching,
        }));
        let mut regular = Vec::new();
        for (pack, paths) in &images.packs {
            let index = match indices.packs.get(pack) {
                Some(index) => index,
                None => {
                    warn!(set = set_name, pack = %pack, "Image directory has no listed pack; matching against the whole set");
                    &indices.combined
                }
            };
            regular.extend(self.match_pool(pack, paths, index, SetContext::main(set), &mut summary, events)?);
        }
        regular.extend(self.match_pool(
            "loose",
            &images.loose,
            &indices.combined,
            SetContext::main(set),
            &mut summary,
            events,
        )?);
        let promo = self.match_pool(
            "promo",
            &images.promo,
            &indices.promo,
            SetContext::promo(set),
            &mut summary,
            events,
        )?;

        events.send(Event::Assembly(AssemblyEvent::PhaseChanged {
            phase: AssemblyPhase::Merging,
        }));
        let regular = merge_records(set_name, regular)?;
        let promo = merge_records(set_name, promo)?;

        summary.duplicates_collapsed = regular.duplicates + promo.duplicates;
        summary.records = regular.records.len();
        summary.promo_records = promo.records.len();
        summary.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            set = set_name,
            records = summary.records,
            promo = summary.promo_records,
            skipped = summary.skipped(),
            "Set assembled"
        );
        events.send(Event::Assembly(AssemblyEvent::SetCompleted {
            summary: summary.clone(),
        }));

        Ok(SetDatabase {
            set_name: set_name.to_string(),
            regular: regular.records,
            promo: promo.records,
            summary,
        })
    }

    fn build_indices(&self, candidates: CandidatePools, summary: &mut RunSummary, events: &EventSender) -> SetIndices {
        let mut packs = BTreeMap::new();
        for CandidatePool { pack, candidates } in candidates.packs {
            let index = CandidateIndex::build(candidates, self.hasher.as_ref());
            self.report_index(&pack, &index, summary, events);
            packs.insert(pack, index);
        }

        let mut seen = HashSet::new();
        let combined = CandidateIndex::from_fingerprints(
            packs
                .values()
                .flat_map(|index| index.entries())
                .filter(|entry| seen.insert(entry.card.number.clone()))
                .map(|entry| (entry.card.clone(), entry.fingerprint.clone()))
                .collect::<Vec<_>>(),
        );

        let promo = CandidateIndex::build(candidates.promo, self.hasher.as_ref());
        self.report_index("promo", &promo, summary, events);

        SetIndices { packs, combined, promo }
    }

    fn report_index(&self, pool: &str, index: &CandidateIndex, summary: &mut RunSummary, events: &EventSender) {
        summary.candidates_unavailable += index.unavailable().len();
        events.send(Event::Index(IndexEvent::Built {
            pool: pool.to_string(),
            candidates: index.len(),
            unavailable: index.unavailable().len(),
        }));
    }

    /// Match and resolve every image of one pool.
    ///
    /// Hashing runs in parallel; matching and resolution run in path order
    /// so logs and events are reproducible.
    fn match_pool(
        &self,
        pool: &str,
        paths: &[PathBuf],
        index: &CandidateIndex,
        context: SetContext<'_>,
        summary: &mut RunSummary,
        events: &EventSender,
    ) -> Result<Vec<ResolvedCard>, ConfigError> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        events.send(Event::Match(MatchEvent::Started {
            pool: pool.to_string(),
            total_images: paths.len(),
        }));

        let hasher = self.hasher.as_ref();
        let images: Vec<Result<LocalImage, MatchFailure>> =
            paths.par_iter().map(|path| LocalImage::load(path, hasher)).collect();

        let resolver = AttributeResolver::new(&self.catalog.rarities);
        let mut resolved = Vec::new();

        for image in images {
            let outcome = image.and_then(|image| self.matcher.match_image(&image, index));

            let card_match = match outcome {
                Ok(card_match) => card_match,
                Err(failure) => {
                    record_failure(&failure, summary);
                    events.send(Event::Match(MatchEvent::Skipped {
                        path: failure.path().to_path_buf(),
                        reason: failure.to_string(),
                    }));
                    continue;
                }
            };

            match resolver.resolve(&card_match.candidate, context) {
                Ok(record) => {
                    summary.matched += 1;
                    events.send(Event::Match(MatchEvent::Matched {
                        path: card_match.path.clone(),
                        number: record.card_number.clone(),
                        distance: card_match.distance,
                    }));
                    debug!(
                        path = %card_match.path.display(),
                        number = %record.card_number,
                        distance = card_match.distance,
                        kind = %card_match.match_type,
                        "Matched"
                    );
                    resolved.push(ResolvedCard {
                        exclusive: card_match.candidate.pack_affinity.is_some()
                            && context.pool == PoolKind::Main,
                        record,
                        source: card_match.path,
                    });
                }
                Err(ResolveError::UnknownRarityCode { number, code }) => {
                    summary.unknown_rarity += 1;
                    warn!(path = %card_match.path.display(), %number, %code, "Unknown rarity code; card skipped");
                    events.send(Event::Match(MatchEvent::Skipped {
                        path: card_match.path,
                        reason: format!("unknown rarity code {:?} for card {}", code, number),
                    }));
                }
                Err(ResolveError::Config(e)) => return Err(e),
            }
        }

        Ok(resolved)
    }

    /// Assemble one set from its listing manifest and image directory.
    pub fn run_set(&self, sources: &SetSources, events: &EventSender) -> Result<SetDatabase, CardDbError> {
        let set: &SetConfig = self.catalog.set(&sources.set_name)?;
        let listing = SetListing::load(&sources.listing)?;
        if listing.set_name != set.name {
            warn!(
                listing = %sources.listing.display(),
                listed = %listing.set_name,
                expected = %set.name,
                "Listing names a different set"
            );
        }

        let scan = self.scanner.scan_with_events(&sources.images_dir, events)?;
        let database = self.assemble_scanned(
            &set.name,
            listing.into_pools(set),
            &scan.images,
            scan.errors.len(),
            events,
        )?;
        Ok(database)
    }

    /// Assemble several sets; a failing set is logged and skipped.
    pub fn run_all(&self, sources: &[SetSources], events: &EventSender) -> FullDatabase {
        let mut full = FullDatabase::default();
        for source in sources {
            match self.run_set(source, events) {
                Ok(database) => full.sets.push(database),
                Err(e) => {
                    warn!(set = %source.set_name, error = %e, "Set aborted");
                    events.send(Event::Assembly(AssemblyEvent::SetAborted {
                        set_name: source.set_name.clone(),
                        reason: e.to_string(),
                    }));
                    full.aborted.push((source.set_name.clone(), e.to_string()));
                }
            }
        }
        full
    }
}

fn record_failure(failure: &MatchFailure, summary: &mut RunSummary) {
    match failure {
        MatchFailure::DecodeFailure { path, reason } => {
            summary.decode_failures += 1;
            warn!(path = %path.display(), %reason, "Local image could not be decoded; skipped");
        }
        MatchFailure::NoCandidateWithinThreshold { path, nearest, .. } => {
            summary.no_match += 1;
            summary.manual_review.push(path.clone());
            warn!(path = %path.display(), ?nearest, "No close match; flagged for manual review");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::listing::CandidateCard;
    use image::{ImageBuffer, Rgb};
    use std::path::Path;
    use tempfile::TempDir;

    /// Card-like image whose bright cells are the bits of `seed`.
    fn card_image(path: &Path, seed: u64, width: u32, height: u32) {
        ImageBuffer::from_fn(width, height, |x, y| {
            let cell = (y * 8 / height) * 8 + x * 8 / width;
            if seed >> cell & 1 == 1 {
                Rgb([235u8, 225, 215])
            } else {
                Rgb([20u8, 25, 30])
            }
        })
        .save(path)
        .unwrap();
    }

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self { dir: TempDir::new().unwrap() }
        }

        fn reference(&self, number: &str, seed: u64) -> PathBuf {
            let path = self.dir.path().join(format!("ref-{}.png", number));
            card_image(&path, seed, 64, 88);
            path
        }

        fn scan(&self, name: &str, seed: u64) -> PathBuf {
            let path = self.dir.path().join(name);
            card_image(&path, seed, 160, 220);
            path
        }
    }

    const BULBASAUR: u64 = 0x0F0F_0F0F_F0F0_F0F0;
    const PIKACHU_EX: u64 = 0x00FF_00FF_00FF_00FF;
    const MEWTWO_EX: u64 = 0xFFFF_0000_FFFF_0000;
    const POTION: u64 = 0x3C3C_3C3C_C3C3_C3C3;

    fn pools(fx: &Fixture) -> CandidatePools {
        let bulbasaur = CandidateCard::new("005", "Bulbasaur", "C", fx.reference("005", BULBASAUR));
        let pikachu = CandidateCard::new("094", "Pikachu EX", "RR", fx.reference("094", PIKACHU_EX))
            .exclusive_to("pikachu-pack");
        let mewtwo = CandidateCard::new("129", "Mewtwo EX", "RR", fx.reference("129", MEWTWO_EX))
            .exclusive_to("mewtwo-pack");

        CandidatePools {
            packs: vec![
                CandidatePool {
                    pack: "mewtwo-pack".to_string(),
                    candidates: vec![bulbasaur.clone(), mewtwo],
                },
                CandidatePool {
                    pack: "pikachu-pack".to_string(),
                    candidates: vec![bulbasaur, pikachu],
                },
            ],
            promo: vec![CandidateCard::new("001", "Potion", "C", fx.reference("p001", POTION))],
            rejected: Vec::new(),
        }
    }

    fn images(fx: &Fixture) -> SetImages {
        let mut images = SetImages::default();
        images.packs.insert(
            "pikachu-pack".to_string(),
            vec![fx.scan("p-bulbasaur.png", BULBASAUR), fx.scan("p-pikachu.png", PIKACHU_EX)],
        );
        images.packs.insert(
            "mewtwo-pack".to_string(),
            vec![fx.scan("m-bulbasaur.png", BULBASAUR), fx.scan("m-mewtwo.png", MEWTWO_EX)],
        );
        images.promo.push(fx.scan("potion.png", POTION));
        images
    }

    #[test]
    fn assembles_multi_pack_set() {
        let fx = Fixture::new();
        let catalog = Catalog::pocket();
        let assembler = DatabaseAssembler::builder(&catalog).build().unwrap();

        let database = assembler.assemble("Genetic Apex", pools(&fx), &images(&fx)).unwrap();

        let keys: Vec<_> = database.regular.iter().map(CardRecord::key).collect();
        assert_eq!(keys, vec!["GA_005", "GAP_094", "GAM_129"]);
        assert_eq!(database.summary.duplicates_collapsed, 1);
        assert_eq!(database.summary.matched, 5);

        assert_eq!(database.promo.len(), 1);
        assert_eq!(database.promo[0].expansion_id, "Promo-a");
    }

    #[test]
    fn reassembly_is_identical() {
        let fx = Fixture::new();
        let catalog = Catalog::pocket();
        let assembler = DatabaseAssembler::builder(&catalog).build().unwrap();

        let first = assembler.assemble("Genetic Apex", pools(&fx), &images(&fx)).unwrap();
        let second = assembler.assemble("Genetic Apex", pools(&fx), &images(&fx)).unwrap();
        assert_eq!(first.regular, second.regular);
        assert_eq!(first.promo, second.promo);
    }

    #[test]
    fn unmatched_and_corrupt_images_are_skipped() {
        let fx = Fixture::new();
        let catalog = Catalog::pocket();
        let assembler = DatabaseAssembler::builder(&catalog).build().unwrap();

        let corrupt = fx.dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not an image").unwrap();
        let stranger = fx.scan("stranger.png", 0xAAAA_AAAA_AAAA_AAAA);

        let mut images = SetImages::default();
        images.loose = vec![corrupt, stranger.clone(), fx.scan("bulba.png", BULBASAUR)];

        let database = assembler.assemble("Genetic Apex", pools(&fx), &images).unwrap();
        assert_eq!(database.regular.len(), 1);
        assert_eq!(database.summary.decode_failures, 1);
        assert_eq!(database.summary.no_match, 1);
        assert_eq!(database.summary.manual_review, vec![stranger]);
    }

    #[test]
    fn unknown_rarity_skips_only_that_card() {
        let fx = Fixture::new();
        let catalog = Catalog::pocket();
        let assembler = DatabaseAssembler::builder(&catalog).build().unwrap();

        let mut candidates = pools(&fx);
        candidates.packs[1].candidates[1].rarity = "??".to_string();

        let database = assembler.assemble("Genetic Apex", candidates, &images(&fx)).unwrap();
        assert_eq!(database.summary.unknown_rarity, 1);
        assert!(database.regular.iter().all(|r| r.card_number != "094"));
        assert!(database.regular.iter().any(|r| r.card_number == "129"));
    }

    #[test]
    fn unknown_set_aborts() {
        let fx = Fixture::new();
        let catalog = Catalog::pocket();
        let assembler = DatabaseAssembler::builder(&catalog).build().unwrap();

        let err = assembler.assemble("Nowhere", pools(&fx), &images(&fx)).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSet { .. }));
    }

    #[test]
    fn exclusive_and_shared_number_aborts_the_set() {
        let fx = Fixture::new();
        let catalog = Catalog::pocket();
        let assembler = DatabaseAssembler::builder(&catalog).build().unwrap();

        let bulbasaur = CandidateCard::new("005", "Bulbasaur", "C", fx.reference("005", BULBASAUR));
        let candidates = CandidatePools {
            packs: vec![
                CandidatePool {
                    pack: "mewtwo-pack".to_string(),
                    candidates: vec![bulbasaur.clone().exclusive_to("mewtwo-pack")],
                },
                CandidatePool {
                    pack: "pikachu-pack".to_string(),
                    candidates: vec![bulbasaur],
                },
            ],
            ..Default::default()
        };
        let mut images = SetImages::default();
        images
            .packs
            .insert("mewtwo-pack".to_string(), vec![fx.scan("m-bulbasaur.png", BULBASAUR)]);
        images
            .packs
            .insert("pikachu-pack".to_string(), vec![fx.scan("p-bulbasaur.png", BULBASAUR)]);

        let err = assembler.assemble("Genetic Apex", candidates, &images).unwrap_err();
        match err {
            ConfigError::NumberCollision { number, card_set, .. } => {
                assert_eq!(number, "005");
                assert_eq!(card_set, "GAM");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn combined_promo_keeps_one_record_per_card() {
        let fx = Fixture::new();
        let catalog = Catalog::pocket();
        let assembler = DatabaseAssembler::builder(&catalog).build().unwrap();

        let mut genetic = assembler.assemble("Genetic Apex", pools(&fx), &images(&fx)).unwrap();
        let mut mythical = genetic.clone();
        mythical.set_name = "Mythical Island".to_string();
        for record in &mut mythical.promo {
            record.card_set = "MI".to_string();
        }

        let full = FullDatabase {
            sets: vec![genetic, mythical],
            aborted: Vec::new(),
        };
        let promo = full.promo();

        assert_eq!(promo.len(), 1);
        assert_eq!(promo[0].card_set, "GA");
        assert_eq!(full.regular().count(), 6);
    }

    #[test]
    fn threshold_above_fingerprint_size_is_rejected() {
        let catalog = Catalog::pocket();
        assert!(DatabaseAssembler::builder(&catalog).threshold(65).build().is_err());
    }
}
