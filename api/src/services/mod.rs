pub mod airports;
pub mod delay;
pub mod fare;
pub mod flights;
pub mod model;
pub mod pipeline;
pub mod preprocess;
