pub mod constants;
pub mod sql;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
