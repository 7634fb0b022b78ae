pub mod http_oracle;

pub use http_oracle::*;
