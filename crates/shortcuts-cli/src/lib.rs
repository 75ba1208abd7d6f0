pub mod cmd;
pub mod context;
pub mod output;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;
