//! Vision/OCR Layer
//!
//! Owns the recognizer boundary: the raw result type, the backend trait, the
//! shared handle that keeps one engine alive for the whole process, and the
//! conversion of raw results into filtered detections.

pub mod detection;
pub mod ocr;

pub use detection::{filter_detections, TextDetection, DEFAULT_MIN_CONFIDENCE};
pub use ocr::{load_ocr_results, JsonFileRecognizer, OcrResult, TextRecognizer};

use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{Result, ShelfError};

type EngineFactory<R> = Box<dyn Fn() -> Result<R> + Send>;

struct RecognizerState<R> {
    engine: Option<R>,
    factory: EngineFactory<R>,
}

/// Process-wide handle to a text recognizer.
///
/// The engine is created on first use and then reused. Calls are serialized
/// through a mutex so at most one recognition runs at a time no matter how
/// many clones of the handle exist.
pub struct RecognizerHandle<R: TextRecognizer> {
    inner: Arc<Mutex<RecognizerState<R>>>,
}

impl<R: TextRecognizer> Clone for RecognizerHandle<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: TextRecognizer> RecognizerHandle<R> {
    /// Create a handle that builds the engine on the first recognition
    pub fn lazy<F>(factory: F) -> Self
    where
        F: Fn() -> Result<R> + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(RecognizerState {
                engine: None,
                factory: Box::new(factory),
            })),
        }
    }

    /// Wrap an engine that is already initialized
    pub fn from_engine(engine: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecognizerState {
                engine: Some(engine),
                factory: Box::new(|| -> Result<R> {
                    Err(ShelfError::Recognizer(
                        "engine was provided pre-initialized".to_string(),
                    ))
                }),
            })),
        }
    }

    /// Whether the engine has been created yet
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().engine.is_some()
    }

    /// Run recognition, initializing the engine first if needed.
    ///
    /// A failed initialization leaves the handle uninitialized so the next
    /// call tries again.
    pub fn recognize(&self, image: &Path) -> Result<Vec<OcrResult>> {
        let mut state = self.inner.lock();

        if state.engine.is_none() {
            info!("Initializing text recognizer");
            let start = Instant::now();
            let engine = (state.factory)()?;
            state.engine = Some(engine);
            info!("Text recognizer ready in {:?}", start.elapsed());
        }

        let engine = state
            .engine
            .as_mut()
            .ok_or_else(|| ShelfError::Recognizer("recognizer unavailable".to_string()))?;

        let start = Instant::now();
        let results = engine.recognize(image)?;
        debug!(
            "Recognition of {:?} produced {} results in {:?}",
            image,
            results.len(),
            start.elapsed()
        );

        Ok(results)
    }
}
