pub mod activity_service;
pub mod admission_service;
pub mod discovery_service;
pub mod ledger_service;
pub mod notifier;
pub mod query_service;
