pub mod hackathon;
pub mod hash;
pub mod jwt;
