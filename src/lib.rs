#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate lazy_static;

pub mod cluster_report;
pub mod config;
pub mod export_data;
pub mod geo_utils;
pub mod gps_processor;
pub mod import_data;
pub mod location_clusterer;
pub mod logs;
pub mod pipeline;
pub mod trip_builder;
pub mod utils;
