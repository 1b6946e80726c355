pub mod bid;
pub mod deck;
pub mod hand;
pub mod score;
