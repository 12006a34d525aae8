pub mod backup;
pub mod config;
pub mod extras;
pub mod geocode;
pub mod interventions;
pub mod log;
pub mod sites;
pub mod timer;
pub mod urgency;
pub mod views;
pub mod weedings;
