pub mod tajweed;
pub mod timing;
