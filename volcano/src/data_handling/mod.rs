pub mod expression_table;
