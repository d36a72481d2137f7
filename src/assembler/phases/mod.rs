pub mod types;

pub mod emit;
pub mod generate;
pub mod parse;
pub mod preprocess;
pub mod resolve;

pub use emit::emit;
pub use generate::generate;
pub use resolve::resolve;
