pub mod binarize;
pub mod source;
pub mod typeface;
