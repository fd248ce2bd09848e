pub mod token;

pub use token::HmacTokenCodec;
