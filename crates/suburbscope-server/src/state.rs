use std::sync::Arc;

use suburbscope_core::{CompositeResolver, FixtureStore, MicroburbsClient, Settings};
use tracing::info;

use crate::error::ServerError;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    resolver: Arc<CompositeResolver>,
}

impl AppState {
    pub fn new(resolver: CompositeResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Loads the fixture directory and wires the live client.
    ///
    /// In mock-data mode no live client is constructed at all.
    pub fn from_settings(settings: &Settings) -> Result<Self, ServerError> {
        let fixtures = FixtureStore::load_dir(&settings.data_dir)?;
        let mut builder = CompositeResolver::builder(Arc::new(fixtures)).with_settings(settings);
        if !settings.use_mock_data {
            builder = builder.with_live_source(Arc::new(MicroburbsClient::new(&settings.live)));
        }

        info!(
            mock_data = settings.use_mock_data,
            base_url = %settings.live.base_url,
            timeout_secs = settings.live.timeout.as_secs(),
            live_regions = ?settings.live_regions,
            "resolver configured"
        );
        Ok(Self::new(builder.build()))
    }

    pub fn resolver(&self) -> &CompositeResolver {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn settings_for(dir: &Path, use_mock_data: bool) -> Settings {
        Settings {
            use_mock_data,
            data_dir: dir.to_path_buf(),
            ..Settings::default()
        }
    }

    #[test]
    fn mock_mode_builds_no_live_client() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("schools.json"),
            r#"{"melbourne-3000": {"schools": [], "total": 0}}"#,
        )
        .expect("write fixture");

        let state = AppState::from_settings(&settings_for(dir.path(), true)).expect("state");

        assert!(!state.resolver().has_live_source());
        assert!(state.resolver().fallback_override());
    }

    #[test]
    fn live_mode_wires_the_provider_client() {
        let dir = tempfile::tempdir().expect("temp dir");

        let state = AppState::from_settings(&settings_for(dir.path(), false)).expect("state");

        assert!(state.resolver().has_live_source());
        assert!(!state.resolver().fallback_override());
    }

    #[test]
    fn corrupt_fixture_file_fails_startup() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("market_trends.json"), "{ not json").expect("write fixture");

        let error = AppState::from_settings(&settings_for(dir.path(), true))
            .err()
            .expect("startup fails");

        assert!(matches!(error, ServerError::Core(_)));
        assert_eq!(error.exit_code(), 5);
    }
}
