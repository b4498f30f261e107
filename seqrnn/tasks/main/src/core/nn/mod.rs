pub mod activations;
pub mod elman;
pub mod init;
pub mod linear;
pub mod summary;
