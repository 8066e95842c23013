pub mod reconcile;
pub mod report;
pub mod statutory;
pub mod validation;
