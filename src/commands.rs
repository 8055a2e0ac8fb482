pub mod canonicalize;
pub mod inventory;
pub mod parse;
