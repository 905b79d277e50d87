//! securewatch-intel — Simulated analytics behind the dashboard pages.
//! Everything here is mock data: fixed tables, or random draws from an
//! injected RNG with the distributions the pages expect.

pub mod connection;
pub mod correlation;
pub mod events;
pub mod executive;
pub mod hunting;
pub mod integrations;
pub mod kpi;
pub mod timeline;

pub use connection::{ConnectionMonitor, ConnectionStatus};
pub use correlation::{CorrelationCell, HeatBand};
pub use events::{EventSortKey, EventsTable, SecurityEvent, SortConfig, SortDirection};
pub use hunting::{HuntConfig, HuntingDesk};
pub use integrations::{IntegrationBoard, IntegrationStatus, ProbeConfig};
pub use kpi::KpiCard;
pub use timeline::{TimeRange, TimelinePoint};
