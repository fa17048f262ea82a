pub mod crypto;
pub mod extract;
pub mod pagination;
pub mod time;
