//! Text extraction from uploaded documents

mod ocr;
mod parser;

pub use ocr::OcrEngine;
pub use parser::FileTextExtractor;
