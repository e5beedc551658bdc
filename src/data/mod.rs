pub mod export;
pub mod registry;
pub mod tracks;
pub mod validate;
