//! Format specific plain text generators.

pub mod html2txt;
pub mod md2txt;
