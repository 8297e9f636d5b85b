//! Sina finance (`hq.sinajs.cn`) A-share quotes. Used as a fallback feed;
//! its HK records use a different layout and are not requested.

pub mod client;
pub mod parser;

pub use client::SinaQuoteSource;
