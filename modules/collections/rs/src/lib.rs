pub mod rle_vec;
pub mod track;
