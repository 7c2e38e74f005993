mod credentials;
pub mod operations;
pub mod sync;
