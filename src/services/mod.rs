pub mod dashboard;
pub mod history;
pub mod practice;
pub mod scoring;
pub mod vocabulary;
