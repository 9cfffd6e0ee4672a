#![allow(unused_imports)]

pub mod entities;

pub use entities::{Article, ArticleLike, Author, Comment, Reply, SharedArticle};
