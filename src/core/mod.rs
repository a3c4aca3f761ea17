pub mod archive;
pub mod cleaner;
pub mod corpus;
pub mod filler;
pub mod frame;
pub mod grammar;
pub mod nlp;
pub mod pipeline;
