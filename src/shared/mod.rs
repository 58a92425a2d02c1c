pub mod query;
pub mod types;

#[cfg(test)]
pub mod test_helpers;
