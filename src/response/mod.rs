pub mod merge;
pub mod parser;

pub use merge::merge;
pub use parser::{ parse_generated_payload, strip_code_fences, ParseError };
