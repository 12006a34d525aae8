pub mod client_type;
pub mod coordinates;
pub mod extra;
pub mod intervention;
pub mod intervention_type;
pub mod job_site;
pub mod planned_weeding;
