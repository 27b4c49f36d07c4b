pub mod claude;
pub mod figma;
pub mod gitlab;
