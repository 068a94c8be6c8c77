pub mod env;
pub mod graph;
pub mod list;
pub mod plan;
pub mod run;
pub mod schema;
