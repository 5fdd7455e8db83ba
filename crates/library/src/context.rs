use crate::batch::Observers;
use crate::naming::DEFAULT_MAX_ATTEMPTS;
use crate::template::PathGenerator;
use shoebox_checkpoint::CheckpointStore;
use shoebox_metadata::{DateDictionary, MetadataExtractor, MetadataWriter};
use shoebox_storage::BackendHandle;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tunables shared by every use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub page_size: usize,
    /// Upper bound on items (or pages) in flight at once.
    pub max_concurrency: usize,
    /// How many numbered names [`find_unique_path`](crate::naming::find_unique_path) tries.
    pub max_attempts: usize,
    /// Write the resolved capture date into files that lack one.
    pub apply_dates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { page_size: 200, max_concurrency: 8, max_attempts: DEFAULT_MAX_ATTEMPTS, apply_dates: false }
    }
}

/// Everything a use case needs to run against one library.
pub struct Context {
    pub backend: BackendHandle,
    pub store: Arc<dyn CheckpointStore>,
    pub extractor: Arc<dyn MetadataExtractor>,
    pub writer: Arc<dyn MetadataWriter>,
    pub dictionary: DateDictionary,
    pub template: PathGenerator,
    pub settings: Settings,
    pub observers: Observers,
    /// Held while a free destination is chosen and claimed, so two items in
    /// the same wave never pick the same name.
    placement: Mutex<()>,
}

impl Context {
    /// A context with an empty dictionary, the default template and default
    /// settings.
    pub fn new(
        backend: BackendHandle,
        store: Arc<dyn CheckpointStore>,
        extractor: Arc<dyn MetadataExtractor>,
        writer: Arc<dyn MetadataWriter>,
    ) -> Self {
        Self {
            backend,
            store,
            extractor,
            writer,
            dictionary: DateDictionary::default(),
            template: PathGenerator::default(),
            settings: Settings::default(),
            observers: Observers::default(),
            placement: Mutex::new(()),
        }
    }

    pub fn with_dictionary(mut self, dictionary: DateDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_template(mut self, template: PathGenerator) -> Self {
        self.template = template;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_observers(mut self, observers: Observers) -> Self {
        self.observers = observers;
        self
    }

    pub(crate) async fn placement(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.placement.lock().await
    }
}
