pub mod answer;
pub mod response;
