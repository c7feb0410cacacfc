pub mod acquirer;
pub mod config;
pub mod delivery;
pub mod error;
pub mod extractor;
pub mod history;
pub mod media;
pub mod queue;
pub mod settings;
pub mod supervisor;
pub mod testing;
pub mod thumbnail;
pub mod workflow;

pub use acquirer::{Acquirer, AcquirerConfig, Acquisition, AcquireError, YtdlpAcquirer};
pub use config::{load_config, load_config_from_str, Config, ConfigError};
pub use delivery::{DeliveryClient, DeliveryError, TelegramDelivery};
pub use error::ErrorCategory;
pub use extractor::{ExtractorError, IdExtractor};
pub use history::{HistoryError, HistoryRecord, HistoryStore, SqliteHistoryStore};
pub use media::{SourceUrl, ValidationError, VideoId};
pub use queue::{DownloadQueue, Job, JobEvent, JobStatus, QueueError};
pub use settings::{BotSettings, FileSettingsStore, SettingsError, SettingsStore};
pub use supervisor::{SupervisorError, ToolOutput, ToolRunner, YtdlpRunner, YtdlpRunnerConfig};
pub use thumbnail::{ImageThumbnailProcessor, ThumbnailError, ThumbnailProcessor};
pub use workflow::{
    WorkflowError, WorkflowExecutor, WorkflowNotice, WorkflowRequest,
};
