pub mod additional;
pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod gateway;
pub mod metrics;
pub mod naming;
pub mod queue;
pub mod resolver;
pub mod search;
pub mod size;
pub mod testing;
pub mod trackers;

pub use additional::{AdditionalSourceError, AdditionalSources};
pub use aggregator::{
    AggregatorSettings, ResultAggregator, StreamDescriptor, StreamRequest, StreamRequestError,
    StreamsResponse,
};
pub use catalog::{CatalogError, CatalogLookup, CinemetaClient, MediaInfo};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use gateway::{Gateway, GatewayClient, GatewayError, MediaType, RawResult, SearchQuery};
pub use queue::{HttpReferenceFetcher, ReferenceFetcher};
pub use resolver::{resolve_magnet, resolve_torrent, ResolveError, ResolvedReference};
pub use trackers::{TrackerService, TrackerSet};
