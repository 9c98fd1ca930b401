pub mod client;
pub mod config;
pub mod delivery;
pub mod endpoints;
pub mod error;
pub mod logging;
pub mod message;
pub mod models;
pub mod pipeline;
pub mod ranks;

pub use client::{GraphQlFetcher, StratzClient};
pub use config::{ApiConfig, ConfigProvider, FileConfigProvider, ServiceConfig, StaticConfigProvider};
pub use delivery::{DeliveryChannel, TabChannel, TabMessage};
pub use error::StratzError;
pub use message::RuntimeMessage;
pub use models::record::AggregatedPlayerRecord;
pub use pipeline::{AggregationPipeline, PipelineSettings};
