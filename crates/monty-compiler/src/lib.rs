//! Monty language front end.

pub mod lexer;
