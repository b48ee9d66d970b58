pub mod price_table;
pub mod roster;
