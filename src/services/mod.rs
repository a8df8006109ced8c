pub mod backend;
pub mod chapterizer;
pub mod llm;
pub mod presentation;
pub mod session;
pub mod validator;
