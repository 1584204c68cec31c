pub mod follow;
pub mod place;
pub mod post;
pub mod user;
