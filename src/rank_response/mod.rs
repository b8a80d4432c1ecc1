pub mod curve;
pub mod metadata;
pub mod orchestrator;

pub use curve::{RankObservation, build_curve, observations_from_table};
pub use metadata::{metadata_from_table, parse_metadata};
pub use orchestrator::{assemble, fetch_metadata, fetch_replicate_curve, regulator_rank_response};
