mod forget;
mod search;

pub use forget::cmd_forget;
pub use search::cmd_search;
