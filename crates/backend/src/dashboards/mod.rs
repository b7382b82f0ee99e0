pub mod d410_laboratory_ranking;
pub mod d411_product_ranking;
pub mod d412_pharmacy_ranking;
pub mod d413_supplier_analysis;
pub mod d414_generic_groups;
pub mod d415_category_ranking;
pub mod d416_regional_stats;
