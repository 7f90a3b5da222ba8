//! Interaction-geometry synchronization engine.
//!
//! Turns a log of timestamped, directed interactions between agents into a
//! 4-D geometric signature per relationship, classifies that geometry against
//! a lattice taxonomy, and scores how synchronized each pair is. Network-wide
//! passes extract clusters of synchronized agents.
//!
//! Zero I/O: callers hand in validated records and get structured results.

pub mod agent;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod engagement;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod geometry;
pub mod network;
pub mod pair;
pub mod scenario;
pub mod session;
pub mod time;
pub mod vector;
pub mod wire;

pub use agent::{Agent, AgentProfile, AgentSummary};
pub use classifier::{Category, Classification, Classifier, Measurements, TAXONOMY};
pub use config::{BiasConfig, ClassifierConfig, NetworkConfig, SyncConfig, TimeConfig};
pub use engagement::{annotate_engagement, engagement_score};
pub use error::{Result, SyncError};
pub use event::{Event, EventKey};
pub use fingerprint::pair_fingerprint;
pub use geometry::{Geometry, synthesize};
pub use network::{
    Admission, AnalysisRecord, Cluster, Compatibility, IngestReport, MotifGroup, MotifPair,
    NetworkGraph, NetworkMetrics, NetworkReport, find_clusters,
};
pub use pair::{
    DirectionalMetrics, PairKey, PairSynchronizer, SubjectiveTime, SyncResult, SyncState,
};
pub use scenario::Scenario;
pub use session::{Session, group_sessions};
pub use vector::Vector4;
pub use wire::{EventRecord, export_events, export_report, parse_events};
