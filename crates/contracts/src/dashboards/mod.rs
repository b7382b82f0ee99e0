pub mod d410_rankings;
