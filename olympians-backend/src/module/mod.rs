pub mod olympedia;
pub mod resolve;
pub mod state;
pub mod table;
