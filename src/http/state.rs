use crate::config::LanguageDefaults;
use crate::gateway::{Transcriber, Translator};
use crate::store::SessionStore;
use crate::stream::StreamingCoordinator;
use std::sync::Arc;

/// Shared application state for HTTP handlers
///
/// The store and both gateways are injected once at process start; handlers
/// and the streaming coordinator only see the trait objects.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub transcriber: Arc<dyn Transcriber>,
    pub translator: Arc<dyn Translator>,
    pub coordinator: Arc<StreamingCoordinator>,
    pub defaults: LanguageDefaults,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        defaults: LanguageDefaults,
    ) -> Self {
        let coordinator = Arc::new(StreamingCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&transcriber),
            Arc::clone(&translator),
            defaults.clone(),
        ));

        Self {
            store,
            transcriber,
            translator,
            coordinator,
            defaults,
        }
    }
}
