pub mod notify;
#[cfg(test)]
pub mod test_utils;
pub mod url;
