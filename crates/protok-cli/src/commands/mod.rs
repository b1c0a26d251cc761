pub mod stream;
pub mod tokenize;
