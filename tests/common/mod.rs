//! Shared helpers for integration scenarios
//!
//! Provides fixture-backed runtimes and fault-injecting client wrappers.

use async_trait::async_trait;
use deedtrace::collect::{
    ClientError, ClientResult, DirectoryClient, DirectoryListing, PeopleSearchClient, PersonMatch,
};
use deedtrace::{FixtureSources, MemorySink, ResearchApi, ResearchConfig, SourceClients};
use std::sync::Arc;

/// A runtime over the bundled fixtures with a memory sink.
pub fn fixture_api() -> (ResearchApi, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let api = ResearchApi::standard(
        &FixtureSources::clients(),
        ResearchConfig::default(),
        sink.clone(),
    )
    .expect("standard graph must build");
    (api, sink)
}

/// Directory client that always fails, for fault-injection scenarios.
pub struct FailingDirectory;

#[async_trait]
impl DirectoryClient for FailingDirectory {
    async fn property_listing(&self, _address: &str) -> ClientResult<Option<DirectoryListing>> {
        Err(ClientError::Unavailable("connection reset".into()))
    }
}

/// People-search client that always fails.
pub struct FailingPeopleSearch;

#[async_trait]
impl PeopleSearchClient for FailingPeopleSearch {
    async fn search(&self, _name: &str, _address: &str) -> ClientResult<Vec<PersonMatch>> {
        Err(ClientError::Unavailable("blocked by provider".into()))
    }
}

/// Fixture clients with the directory source replaced by a failing one.
pub fn clients_with_failing_directory() -> SourceClients {
    let mut clients = FixtureSources::clients();
    clients.directory = Arc::new(FailingDirectory);
    clients
}

/// Fixture clients with both people-search providers failing.
pub fn clients_with_failing_people_search() -> SourceClients {
    let mut clients = FixtureSources::clients();
    clients.people_primary = Arc::new(FailingPeopleSearch);
    clients.people_secondary = Arc::new(FailingPeopleSearch);
    clients
}
