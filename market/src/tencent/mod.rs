//! Tencent finance (`qt.gtimg.cn`) batch quotes for A-shares and HK.

pub mod client;
pub mod parser;

pub use client::TencentQuoteSource;
