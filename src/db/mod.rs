pub mod convert;
pub mod extras;
pub mod initialize;
pub mod interventions;
pub mod job_sites;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod stats;
pub mod weedings;
