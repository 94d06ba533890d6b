pub mod average;
pub mod extremum;
pub mod option;
pub mod sum;
pub mod weighted;
