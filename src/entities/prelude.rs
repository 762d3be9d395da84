pub use super::result_records::Entity as ResultRecords;
pub use super::search_records::Entity as SearchRecords;
