pub mod aes;
pub mod common;
pub mod compression;
pub mod external;
pub mod lzhs;
pub mod lzop;
