pub mod aggregate;
pub mod analyzer;
pub mod donor;
pub mod error;
pub mod parser;
pub mod record;
