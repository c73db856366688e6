pub mod docs;
pub mod survey;
pub mod system;
