pub mod claims;
pub mod coupons;
