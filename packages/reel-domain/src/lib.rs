pub mod stopwords;
pub mod text;
