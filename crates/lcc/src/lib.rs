pub mod cli;
pub mod profile;
pub mod scan;
pub mod survey;
