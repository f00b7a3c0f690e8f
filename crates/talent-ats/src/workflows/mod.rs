pub mod intake;
pub mod jobs;
pub mod report;
