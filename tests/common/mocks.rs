//! Mock implementations for test fixtures.
//!
//! Re-exports the mocks from `lanefeed::adapters::mock` and adds
//! ready-made item source setups.

pub use lanefeed::adapters::mock::{ChannelExitDetector, MockBatch, MockItemSource};
pub use lanefeed::error::SourceError;

use lanefeed::models::Item;

/// A source that answers the bootstrap request with `seed` and then runs
/// `script` in order.
pub fn scripted_source(seed: Vec<Item>, script: Vec<MockBatch>) -> MockItemSource {
    let source = MockItemSource::new();
    source.push_items(seed);
    for batch in script {
        match batch {
            MockBatch::Items(items) => source.push_items(items),
            MockBatch::Failure(err) => source.push_failure(err),
        }
    }
    source
}

/// A source whose every request fails after a successful bootstrap.
pub fn flaky_source(seed: Vec<Item>) -> MockItemSource {
    let source = MockItemSource::new();
    source.push_items(seed);
    source.set_offline(Some(connection_refused()));
    source
}

pub fn connection_refused() -> SourceError {
    SourceError::ConnectionFailed {
        url: "http://localhost:5000/api/dogs".to_string(),
        message: "Connection refused".to_string(),
    }
}
