pub mod customer;
pub mod dashboard;
pub mod document;
