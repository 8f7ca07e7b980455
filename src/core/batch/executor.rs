//! Batch execution implementation.

use crate::core::hasher::{
    FastDecoder, HashAlgorithm, HashAlgorithmKind, HasherConfig, ImageDecoder, PerceptualHash,
    DEFAULT_HASH_SIZE,
};
use crate::core::rename::{RenameExecutor, RenameOperation, RenameOutcome};
use crate::core::template::{derive_name, Template};
use crate::error::ImageHashError;
use crate::events::{
    null_sender, BatchEvent, BatchSummary, Event, EventSender, HashEvent, HashProgress,
    RenameEvent,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// What to do when a file can't be decoded or renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing file and return its error
    #[default]
    Abort,
    /// Record the failure and carry on with the next file
    Continue,
}

/// A successfully processed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Path as given
    pub path: PathBuf,
    /// Hex hash of the image
    pub hash: String,
    /// New path, when renaming was requested (also set in dry runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

/// A file that failed under [`FailurePolicy::Continue`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    /// The unreadable image, or the destination a rename could not reach
    pub path: PathBuf,
    pub message: String,
}

/// Result of batch execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// One entry per successful file, in input order
    pub outcomes: Vec<FileOutcome>,
    /// Failures, in input order (always empty under [`FailurePolicy::Abort`])
    pub failures: Vec<FileFailure>,
    pub algorithm: HashAlgorithmKind,
    pub hash_size: u32,
    pub rename: bool,
    pub dry_run: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl BatchResult {
    /// True when every input file was processed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The ordered `(path, hash)` pairs
    pub fn hashes(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes
            .iter()
            .map(|o| (o.path.as_path(), o.hash.as_str()))
    }
}

/// Configuration for a batch
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Files to process, in order
    pub paths: Vec<PathBuf>,
    /// Hash algorithm, the same for every file
    pub algorithm: HashAlgorithmKind,
    /// Hash size (bits per side)
    pub hash_size: u32,
    /// Rename files to embed their hash
    pub rename: bool,
    /// Announce renames without performing them
    pub dry_run: bool,
    /// Naming template; `None` means `{path}/{hash}{ext}`
    pub template: Option<Template>,
    pub failure_policy: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            algorithm: HashAlgorithmKind::Average,
            hash_size: DEFAULT_HASH_SIZE,
            rename: false,
            dry_run: false,
            template: None,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

/// Builder for batch configuration
pub struct BatchBuilder {
    config: BatchConfig,
    algorithm_name: Option<String>,
    decoder: Option<Box<dyn ImageDecoder>>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self {
            config: BatchConfig::default(),
            algorithm_name: None,
            decoder: None,
        }
    }

    /// Files to process
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.config.algorithm = algorithm;
        self.algorithm_name = None;
        self
    }

    /// Set the hash algorithm by its identifier, checked in [`build`](Self::build)
    pub fn algorithm_name(mut self, name: impl Into<String>) -> Self {
        self.algorithm_name = Some(name.into());
        self
    }

    pub fn hash_size(mut self, hash_size: u32) -> Self {
        self.config.hash_size = hash_size;
        self
    }

    pub fn rename(mut self, rename: bool) -> Self {
        self.config.rename = rename;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    pub fn template(mut self, template: Option<Template>) -> Self {
        self.config.template = template;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Replace the image decoder
    pub fn decoder(mut self, decoder: Box<dyn ImageDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Validate the settings and build the processor. No file is touched.
    pub fn build(mut self) -> Result<BatchProcessor, ImageHashError> {
        if let Some(name) = self.algorithm_name.take() {
            self.config.algorithm = name.parse()?;
        }

        let hasher = HasherConfig::new()
            .algorithm(self.config.algorithm)
            .hash_size(self.config.hash_size)
            .build()?;

        Ok(BatchProcessor {
            config: self.config,
            hasher,
            decoder: self.decoder.unwrap_or_else(|| Box::new(FastDecoder)),
        })
    }
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hashes, and optionally renames, a list of files in order
pub struct BatchProcessor {
    config: BatchConfig,
    hasher: Box<dyn HashAlgorithm>,
    decoder: Box<dyn ImageDecoder>,
}

impl BatchProcessor {
    pub fn builder() -> BatchBuilder {
        BatchBuilder::new()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run the batch without events
    pub fn run(&self) -> Result<BatchResult, ImageHashError> {
        self.run_with_events(&null_sender())
    }

    /// Run the batch with event reporting.
    ///
    /// Under [`FailurePolicy::Abort`] the first failing file ends the run
    /// and its error is returned; files after it are never opened.
    pub fn run_with_events(&self, events: &EventSender) -> Result<BatchResult, ImageHashError> {
        let start_time = Instant::now();
        let total = self.config.paths.len();

        events.send(Event::Batch(BatchEvent::Started {
            total_files: total,
            algorithm: self.config.algorithm,
        }));

        let mut outcomes = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (index, path) in self.config.paths.iter().enumerate() {
            events.send(Event::Hash(HashEvent::Progress(HashProgress {
                completed: index,
                total,
                current_path: path.clone(),
            })));

            match self.process_file(path, events) {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => {
                    let failed_path = error.path().cloned().unwrap_or_else(|| path.clone());

                    if self.config.failure_policy == FailurePolicy::Abort {
                        events.send(Event::Batch(BatchEvent::Aborted {
                            path: failed_path,
                            message: error.to_string(),
                        }));
                        return Err(error);
                    }

                    warn!(path = %failed_path.display(), error = %error, "skipping file");
                    failures.push(FileFailure {
                        path: failed_path,
                        message: error.to_string(),
                    });
                }
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;

        let renamed = if self.config.rename && !self.config.dry_run {
            outcomes.iter().filter(|o| o.destination.is_some()).count()
        } else {
            0
        };

        events.send(Event::Batch(BatchEvent::Completed {
            summary: BatchSummary {
                hashed: outcomes.len(),
                renamed,
                failed: failures.len(),
                duration_ms,
            },
        }));

        Ok(BatchResult {
            outcomes,
            failures,
            algorithm: self.config.algorithm,
            hash_size: self.config.hash_size,
            rename: self.config.rename,
            dry_run: self.config.dry_run,
            duration_ms,
        })
    }

    /// Decode -> hash -> (rename) for one file
    fn process_file(
        &self,
        path: &Path,
        events: &EventSender,
    ) -> Result<FileOutcome, ImageHashError> {
        debug!(path = %path.display(), algorithm = %self.config.algorithm, "hashing");

        let hash = self
            .decoder
            .decode(path)
            .and_then(|image| self.hasher.hash_image(&image))
            .map_err(|source| {
                events.send(Event::Hash(HashEvent::Error {
                    path: path.to_path_buf(),
                    message: source.to_string(),
                }));
                ImageHashError::FileError {
                    path: path.to_path_buf(),
                    source,
                }
            })?
            .to_hex();

        events.send(Event::Hash(HashEvent::FileHashed {
            path: path.to_path_buf(),
            hash: hash.clone(),
        }));

        let destination = if self.config.rename {
            Some(self.rename_file(path, &hash, events)?)
        } else {
            None
        };

        Ok(FileOutcome {
            path: path.to_path_buf(),
            hash,
            destination,
        })
    }

    fn rename_file(
        &self,
        path: &Path,
        hash: &str,
        events: &EventSender,
    ) -> Result<PathBuf, ImageHashError> {
        let original = path.to_string_lossy();
        let destination = PathBuf::from(derive_name(
            &original,
            hash,
            self.config.template.as_ref(),
        ));
        let op = RenameOperation::new(path, destination, self.config.dry_run);

        // Announced before the attempt, dry run or not
        events.send(Event::Rename(RenameEvent::Planned(op.clone())));

        match RenameExecutor::execute(&op) {
            Ok(RenameOutcome::Renamed) => {
                events.send(Event::Rename(RenameEvent::Renamed {
                    source: op.source,
                    destination: op.destination.clone(),
                }));
            }
            Ok(RenameOutcome::Skipped) => {}
            Err(error) => {
                events.send(Event::Rename(RenameEvent::Error {
                    destination: op.destination,
                    message: error.to_string(),
                }));
                return Err(error);
            }
        }

        Ok(op.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HashError;
    use crate::events::EventChannel;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Decoder that records every path it is asked to open
    struct RecordingDecoder {
        opened: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ImageDecoder for RecordingDecoder {
        fn decode(&self, path: &Path) -> Result<DynamicImage, HashError> {
            self.opened.lock().unwrap().push(path.to_path_buf());
            FastDecoder.decode(path)
        }
    }

    fn recording_decoder() -> (Box<dyn ImageDecoder>, Arc<Mutex<Vec<PathBuf>>>) {
        let opened = Arc::new(Mutex::new(Vec::new()));
        (
            Box::new(RecordingDecoder {
                opened: Arc::clone(&opened),
            }),
            opened,
        )
    }

    fn create_test_png(dir: &TempDir, name: &str, seed: u8) -> PathBuf {
        let path = dir.path().join(name);
        let img = RgbImage::from_fn(64, 48, |x, y| {
            let v = (x as u8).wrapping_mul(seed).wrapping_add((y as u8).wrapping_mul(3));
            Rgb([v, seed, 255 - v])
        });
        img.save(&path).unwrap();
        path
    }

    fn create_corrupt_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"this is not a valid image file").unwrap();
        path
    }

    #[test]
    fn outcome_hash_is_lowercase_hex_sized_by_hash_size() {
        let temp = TempDir::new().unwrap();
        let photo = create_test_png(&temp, "photo.png", 7);

        for (hash_size, hex_len) in [(8, 16), (16, 64)] {
            let result = BatchProcessor::builder()
                .paths([&photo])
                .hash_size(hash_size)
                .build()
                .unwrap()
                .run()
                .unwrap();

            let hash = &result.outcomes[0].hash;
            assert_eq!(hash.len(), hex_len);
            assert!(hash
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn builder_defaults() {
        let processor = BatchProcessor::builder().build().unwrap();
        let config = processor.config();

        assert_eq!(config.algorithm, HashAlgorithmKind::Average);
        assert_eq!(config.hash_size, DEFAULT_HASH_SIZE);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(!config.rename);
        assert!(!config.dry_run);
        assert!(config.template.is_none());
    }

    #[test]
    fn unknown_algorithm_fails_before_any_file_is_opened() {
        let temp = TempDir::new().unwrap();
        let path = create_test_png(&temp, "a.png", 3);
        let (decoder, opened) = recording_decoder();

        let result = BatchProcessor::builder()
            .paths([&path])
            .algorithm_name("FOOBAR")
            .decoder(decoder)
            .build();

        assert!(matches!(result, Err(ImageHashError::UnknownAlgorithm { .. })));
        assert!(opened.lock().unwrap().is_empty());
    }

    #[test]
    fn algorithm_name_is_parsed() {
        let processor = BatchProcessor::builder()
            .algorithm_name("wavelet")
            .build()
            .unwrap();
        assert_eq!(processor.config().algorithm, HashAlgorithmKind::Wavelet);
    }

    #[test]
    fn results_follow_input_order() {
        let temp = TempDir::new().unwrap();
        let paths = vec![
            create_test_png(&temp, "c.png", 5),
            create_test_png(&temp, "a.png", 7),
            create_test_png(&temp, "b.png", 11),
        ];

        let result = BatchProcessor::builder()
            .paths(paths.clone())
            .build()
            .unwrap()
            .run()
            .unwrap();

        let got: Vec<&Path> = result.hashes().map(|(p, _)| p).collect();
        let expected: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
        assert_eq!(got, expected);
        assert!(result.is_complete());
    }

    #[test]
    fn every_algorithm_is_deterministic_across_runs() {
        let temp = TempDir::new().unwrap();
        let path = create_test_png(&temp, "a.png", 9);

        for kind in HashAlgorithmKind::ALL {
            let processor = BatchProcessor::builder()
                .paths([&path])
                .algorithm(kind)
                .build()
                .unwrap();
            let first = processor.run().unwrap();
            let second = processor.run().unwrap();
            assert_eq!(first.outcomes, second.outcomes, "{}", kind);
        }
    }

    // Abort is the default failure policy.
    #[test]
    fn abort_policy_stops_at_first_bad_file() {
        let temp = TempDir::new().unwrap();
        let good = create_test_png(&temp, "good.png", 3);
        let bad = create_corrupt_file(&temp, "bad.png");
        let never = create_test_png(&temp, "never.png", 4);
        let (decoder, opened) = recording_decoder();

        let err = BatchProcessor::builder()
            .paths([&good, &bad, &never])
            .rename(true)
            .decoder(decoder)
            .build()
            .unwrap()
            .run()
            .unwrap_err();

        match err {
            ImageHashError::FileError { path, .. } => assert_eq!(path, bad),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*opened.lock().unwrap(), vec![good.clone(), bad.clone()]);
        assert!(!good.exists(), "file before the failure was renamed");
        assert!(bad.exists());
        assert!(never.exists(), "file after the failure must be untouched");
    }

    #[test]
    fn continue_policy_collects_failures() {
        let temp = TempDir::new().unwrap();
        let first = create_test_png(&temp, "first.png", 3);
        let bad = create_corrupt_file(&temp, "bad.png");
        let last = create_test_png(&temp, "last.png", 4);
        let (decoder, opened) = recording_decoder();

        let result = BatchProcessor::builder()
            .paths([&first, &bad, &last])
            .failure_policy(FailurePolicy::Continue)
            .decoder(decoder)
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(opened.lock().unwrap().len(), 3);
        assert_eq!(result.outcomes.len(), 2);
        assert_eq!(result.outcomes[0].path, first);
        assert_eq!(result.outcomes[1].path, last);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].path, bad);
        assert!(!result.is_complete());
    }

    #[test]
    fn rename_moves_file_to_hash_name() {
        let temp = TempDir::new().unwrap();
        let path = create_test_png(&temp, "photo.png", 3);

        let result = BatchProcessor::builder()
            .paths([&path])
            .rename(true)
            .build()
            .unwrap()
            .run()
            .unwrap();

        let outcome = &result.outcomes[0];
        let expected = temp.path().join(format!("{}.png", outcome.hash));
        assert_eq!(outcome.destination.as_deref(), Some(expected.as_path()));
        assert!(!path.exists());
        assert!(expected.exists());
    }

    #[test]
    fn dry_run_leaves_filesystem_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = create_test_png(&temp, "photo.png", 3);

        for kind in HashAlgorithmKind::ALL {
            let result = BatchProcessor::builder()
                .paths([&path])
                .algorithm(kind)
                .rename(true)
                .dry_run(true)
                .template(Some(Template::new("{path}/{name}-{hash}{ext}")))
                .build()
                .unwrap()
                .run()
                .unwrap();

            let destination = result.outcomes[0].destination.clone().unwrap();
            assert!(path.exists());
            assert!(!destination.exists());
        }
    }

    #[test]
    fn rename_into_missing_directory_fails_and_keeps_source() {
        let temp = TempDir::new().unwrap();
        let path = create_test_png(&temp, "photo.png", 3);
        let template = format!("{}/missing/{{hash}}{{ext}}", temp.path().display());

        let err = BatchProcessor::builder()
            .paths([&path])
            .rename(true)
            .template(Some(Template::new(template)))
            .build()
            .unwrap()
            .run()
            .unwrap_err();

        match err {
            ImageHashError::RenameFailed { destination, .. } => {
                assert!(destination.starts_with(temp.path().join("missing")));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(path.exists());
    }

    #[test]
    fn planned_renames_are_announced_even_in_dry_run() {
        let temp = TempDir::new().unwrap();
        let a = create_test_png(&temp, "a.png", 3);
        let b = create_test_png(&temp, "b.png", 5);
        let (sender, receiver) = EventChannel::new();

        BatchProcessor::builder()
            .paths([&a, &b])
            .rename(true)
            .dry_run(true)
            .build()
            .unwrap()
            .run_with_events(&sender)
            .unwrap();
        drop(sender);

        let planned: Vec<PathBuf> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Rename(RenameEvent::Planned(op)) => {
                    assert!(op.dry_run);
                    Some(op.source)
                }
                Event::Rename(RenameEvent::Renamed { .. }) => panic!("dry run renamed a file"),
                _ => None,
            })
            .collect();

        assert_eq!(planned, vec![a, b]);
    }

    #[test]
    fn abort_emits_aborted_event() {
        let temp = TempDir::new().unwrap();
        let bad = create_corrupt_file(&temp, "bad.jpg");
        let (sender, receiver) = EventChannel::new();

        let processor = BatchProcessor::builder().paths([&bad]).build().unwrap();
        assert!(processor.run_with_events(&sender).is_err());
        drop(sender);

        let aborted = receiver
            .iter()
            .any(|event| matches!(event, Event::Batch(BatchEvent::Aborted { ref path, .. }) if *path == bad));
        assert!(aborted);
    }

    #[test]
    fn empty_batch_is_complete() {
        let result = BatchProcessor::builder().build().unwrap().run().unwrap();
        assert!(result.outcomes.is_empty());
        assert!(result.is_complete());
    }
}
