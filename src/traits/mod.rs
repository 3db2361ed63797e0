pub mod io;
pub mod processor;
pub mod shape;

pub use io::{ProcessorInput, ProcessorOutput};
pub use processor::{CustomDependencies, Processor};
pub use shape::{InputField, InputKind, InputShape, OutputField, OutputShape};
