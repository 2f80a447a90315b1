pub mod box3;
pub mod line_segment3;
pub mod triangle3;
