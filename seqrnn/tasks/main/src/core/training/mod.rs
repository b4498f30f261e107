pub mod forward;
pub mod grad_clip;
pub mod history;
pub mod loss;
pub mod metrics;
pub mod trainer;
