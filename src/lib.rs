pub mod generate;
pub mod output;
pub mod requester;
pub mod telemetry;
