pub mod prelude;

pub mod result_records;
pub mod search_records;
