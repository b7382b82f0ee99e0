pub mod db;
pub mod fact_tables;

#[cfg(test)]
pub mod fixtures;
