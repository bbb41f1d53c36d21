pub mod auth;
pub mod catalog;
pub mod model;
pub mod post;
pub mod questao;
