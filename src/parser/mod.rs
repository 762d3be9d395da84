pub mod handle;

pub use handle::extract_handle;
