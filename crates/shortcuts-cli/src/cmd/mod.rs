pub mod actions;
pub mod mcp;
pub mod run;
pub mod shortcuts;
