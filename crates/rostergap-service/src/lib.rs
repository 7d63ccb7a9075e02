//! # Rostergap Service
//!
//! The service layer between the REST surface and the warehouse executor.
//! Its centerpiece is the [`cache::QueryCache`]: a process-wide,
//! request-deduplicating cache guaranteeing at most one in-flight
//! warehouse computation per query key.

pub mod cache;
pub mod report_service;

pub use cache::QueryCache;
pub use report_service::{UnenrolledReportService, UnenrolledReportServiceImpl};
