//! Mock implementations of the collaborator traits, for tests.

mod mock_acquirer;
mod mock_delivery;
mod mock_history;
mod mock_settings;
mod mock_thumbnail;
mod mock_tool_runner;

pub use mock_acquirer::MockAcquirer;
pub use mock_delivery::MockDeliveryClient;
pub use mock_history::MockHistoryStore;
pub use mock_settings::MockSettingsStore;
pub use mock_thumbnail::MockThumbnailProcessor;
pub use mock_tool_runner::MockToolRunner;
