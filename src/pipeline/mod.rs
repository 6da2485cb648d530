pub mod diagnostic;
pub mod extract;
pub mod llm;
pub mod normalize;
