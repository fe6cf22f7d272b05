pub mod complex;
pub mod confidence;
pub mod table;
