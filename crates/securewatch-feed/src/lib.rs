//! securewatch-feed — Live alert feed for the SOC overview page.
//! Provides:
//!   - Synthetic alert generation with an injectable RNG
//!   - A bounded newest-first alert buffer
//!   - Severity / source filtering
//!   - "NEW" badge freshness tracking
//!   - Auto-scroll view state
//!   - A randomized scheduler that stops when its handle goes away

pub mod alert;
pub mod buffer;
pub mod config;
pub mod filter;
pub mod freshness;
pub mod generator;
pub mod live;
pub mod scheduler;
pub mod view;

pub use alert::{AlertId, AlertRecord};
pub use buffer::AlertBuffer;
pub use config::FeedConfig;
pub use filter::{FeedFilter, SeverityFilter, SourceToggles};
pub use freshness::FreshnessPolicy;
pub use generator::AlertGenerator;
pub use live::{FeedSnapshot, LiveFeed};
pub use scheduler::{FeedHandle, FeedScheduler, FeedUpdate, UpdateKind};
pub use view::FeedView;
