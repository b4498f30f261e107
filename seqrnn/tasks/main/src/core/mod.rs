pub mod checkpoint;
pub mod config;
pub mod encoding;
pub mod linalg;
pub mod nn;
pub mod run;
pub mod symbols;
pub mod task;
pub mod training;
