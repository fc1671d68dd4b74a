pub mod distance;
pub mod fields;
pub mod pool;
pub mod resolver;

pub use fields::{
    parse_duration, parse_int, parse_kda, parse_score, reconcile_free_text, sanitize_name,
    FieldParser, Kda, DEFAULT_MAP_DISTANCE, DEFAULT_REGION_DISTANCE,
};
pub use pool::CandidatePool;
pub use resolver::{
    NameResolver, Reconciliation, Recovery, UnmatchedRow, DEFAULT_NAME_DISTANCE,
};
