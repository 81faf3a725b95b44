pub mod season;
pub mod target_date;
