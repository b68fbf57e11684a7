pub mod claim;
pub mod coupon;
